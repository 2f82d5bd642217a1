//! Copy-on-write selection operations.
//!
//! Every operation leaves its input untouched and returns a fresh set, so the
//! gating invariant can be checked against a single owned value: a
//! `requires_brew` id is only ever a member while the prerequisite is also
//! selected or already done.

use std::collections::BTreeSet;

use crate::core::catalog::{BREW_ID, Catalog};
use crate::core::completion::Completed;
use crate::core::gate::eligible;
use crate::core::types::StepStatus;

/// User-controlled subset of catalog ids, in deterministic order.
pub type Selection = BTreeSet<String>;

/// Selection at startup and after `clear`: just the prerequisite.
pub fn initial() -> Selection {
    BTreeSet::from([BREW_ID.to_string()])
}

/// Why a toggle was refused. No state changes on rejection; the caller
/// surfaces [`ToggleRejection::message`] as a warning log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleRejection {
    /// Gated step while the prerequisite is neither selected nor done.
    RequiresBrew { label: String },
    /// Step already completed in a previous run this session.
    AlreadyCompleted { label: String },
    /// Id not present in the catalog.
    UnknownId { id: String },
}

impl ToggleRejection {
    pub fn message(&self) -> String {
        match self {
            Self::RequiresBrew { label } => {
                format!("{label} requires Homebrew; select Homebrew first")
            }
            Self::AlreadyCompleted { label } => {
                format!("{label} already completed this session")
            }
            Self::UnknownId { id } => format!("unknown step '{id}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Applied(Selection),
    Rejected(ToggleRejection),
}

/// Flip membership of `id`.
///
/// Rejected when the step is gated ineligible (and is not the prerequisite)
/// or already completed. Removing the prerequisite cascade-removes every
/// gated id in the same operation.
pub fn toggle(
    catalog: &Catalog,
    completed: &Completed,
    selection: &Selection,
    id: &str,
) -> ToggleOutcome {
    let Some(step) = catalog.get(id) else {
        return ToggleOutcome::Rejected(ToggleRejection::UnknownId { id: id.to_string() });
    };
    if completed.contains(id) {
        return ToggleOutcome::Rejected(ToggleRejection::AlreadyCompleted {
            label: step.label.clone(),
        });
    }
    if id != BREW_ID && !eligible(step, selection, catalog.brew_status()) {
        return ToggleOutcome::Rejected(ToggleRejection::RequiresBrew {
            label: step.label.clone(),
        });
    }

    let mut next = selection.clone();
    let removed = next.remove(id);
    if !removed {
        next.insert(id.to_string());
    }
    if removed && id == BREW_ID {
        drop_gated(catalog, &mut next);
    }
    ToggleOutcome::Applied(next)
}

/// Select every step that is currently eligible and not already completed.
pub fn select_all(catalog: &Catalog, completed: &Completed, selection: &Selection) -> Selection {
    let brew_status = catalog.brew_status();
    catalog
        .steps()
        .iter()
        .filter(|step| !completed.contains(&step.id))
        .filter(|step| eligible(step, selection, brew_status))
        .map(|step| step.id.clone())
        .collect()
}

/// Reset to the singleton prerequisite selection.
pub fn clear() -> Selection {
    initial()
}

/// Select the failed steps for a retry, falling back to the prerequisite
/// when nothing failed (or nothing failed retryably).
pub fn select_failed(catalog: &Catalog, completed: &Completed, selection: &Selection) -> Selection {
    let brew_status = catalog.brew_status();
    let failed: Selection = catalog
        .steps()
        .iter()
        .filter(|step| step.status == StepStatus::Fail)
        .filter(|step| !completed.contains(&step.id))
        .filter(|step| eligible(step, selection, brew_status))
        .map(|step| step.id.clone())
        .collect();
    if failed.is_empty() { initial() } else { failed }
}

/// Deselecting the prerequisite must not leave gated steps behind. This is
/// an explicit consistency pass, not a render-time filter.
fn drop_gated(catalog: &Catalog, selection: &mut Selection) {
    selection.retain(|id| catalog.get(id).is_none_or(|step| !step.requires_brew));
}
