//! Pure derivations used by the execution driver.

use crate::core::catalog::{BREW_ID, Catalog};
use crate::core::completion::Completed;
use crate::core::gate::eligible;
use crate::core::selection::Selection;
use crate::core::types::StepStatus;

/// Freeze the execution plan for a run, in catalog order.
///
/// Candidates are the explicit selection, or every catalog id when the
/// selection is empty (an empty selection runs the whole eligible catalog).
/// Completed steps never re-enter a plan, and the gate is evaluated once
/// here against the candidate set, not re-checked mid-run.
pub fn execution_plan(catalog: &Catalog, completed: &Completed, selection: &Selection) -> Vec<String> {
    let candidates: Selection = if selection.is_empty() {
        catalog
            .steps()
            .iter()
            .filter(|step| !completed.contains(&step.id))
            .map(|step| step.id.clone())
            .collect()
    } else {
        selection.clone()
    };

    let brew_status = catalog.brew_status();
    catalog
        .steps()
        .iter()
        .filter(|step| candidates.contains(&step.id))
        .filter(|step| !completed.contains(&step.id))
        .filter(|step| eligible(step, &candidates, brew_status))
        .map(|step| step.id.clone())
        .collect()
}

/// Selection to present after a run: the prerequisite plus every executed
/// step that failed and is still retryable.
pub fn next_selection(catalog: &Catalog, completed: &Completed, executed: &[String]) -> Selection {
    let mut next = Selection::from([BREW_ID.to_string()]);
    next.extend(
        executed
            .iter()
            .filter(|id| {
                catalog
                    .get(id.as_str())
                    .is_some_and(|step| step.status == StepStatus::Fail)
            })
            .filter(|id| !completed.contains(id.as_str()))
            .cloned(),
    );
    next
}
