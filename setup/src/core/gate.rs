//! Eligibility rule gating steps on the Homebrew prerequisite.

use std::collections::BTreeSet;

use crate::core::catalog::{BREW_ID, Step};
use crate::core::types::StepStatus;

/// True once the prerequisite has completed successfully this session.
pub fn brew_ready(brew_status: StepStatus) -> bool {
    brew_status == StepStatus::Ok
}

/// A step may be selected or planned if it has no prerequisite, the
/// prerequisite is part of the same selection, or the prerequisite already
/// completed.
pub fn eligible(step: &Step, selection: &BTreeSet<String>, brew_status: StepStatus) -> bool {
    !step.requires_brew || selection.contains(BREW_ID) || brew_ready(brew_status)
}
