//! Sequential fail-fast execution of the frozen plan.

use std::path::Path;
use std::time::Instant;

use anyhow::{Result, anyhow};
use tracing::{info, instrument, warn};

use crate::core::catalog::Catalog;
use crate::core::classifier::classify_line;
use crate::core::completion::Completed;
use crate::core::logbuf::LogBuffer;
use crate::core::plan::{execution_plan, next_selection};
use crate::core::selection::Selection;
use crate::core::types::StepStatus;
use crate::io::script::{ScriptEvent, ScriptRequest, ScriptRunner};

/// Result of one driver invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Ids actually started, in order (a prefix of the plan when a failure
    /// cut the run short).
    pub executed: Vec<String>,
    /// Labels of executed steps that failed.
    pub failed_labels: Vec<String>,
    /// Selection to present next: prerequisite plus retryable failures.
    pub next_selection: Selection,
}

/// Execute the plan derived from `selection`, one step at a time.
///
/// Each step runs to a terminal exit code before the next starts; the first
/// failure stops the run and later planned steps stay idle. Post-run
/// bookkeeping (completion, next selection, run record) always happens,
/// cut short or not. Returns the report and the grown completion set.
#[instrument(skip_all, fields(selected = selection.len()))]
pub fn run_steps<R: ScriptRunner>(
    runner: &R,
    workdir: &Path,
    shell: &str,
    catalog: &mut Catalog,
    selection: &Selection,
    completed: &Completed,
    logs: &mut LogBuffer,
) -> Result<(RunReport, Completed)> {
    let plan = execution_plan(catalog, completed, selection);
    info!(steps = plan.len(), "run started");

    let mut executed: Vec<String> = Vec::new();
    let mut emitted_any = false;

    for id in plan {
        let step = catalog
            .get(&id)
            .ok_or_else(|| anyhow!("planned step '{id}' not in catalog"))?;
        let request = ScriptRequest {
            script: step.script.clone(),
            workdir: workdir.to_path_buf(),
            shell: shell.to_string(),
        };

        catalog.set_result(&id, StepStatus::Running, None)?;
        executed.push(id.clone());
        let start = Instant::now();

        let code = match runner.spawn(&request) {
            Ok(events) => consume_events(events, logs, &mut emitted_any),
            Err(err) => {
                // A script that cannot start is an ordinary failure with an
                // implied nonzero exit.
                warn!(step = %id, err = %err, "failed to start script");
                append_line(logs, &format!("[ERROR] {err:#}"), &mut emitted_any);
                1
            }
        };

        let status = if code == 0 {
            StepStatus::Ok
        } else {
            StepStatus::Fail
        };
        catalog.set_result(&id, status, Some(start.elapsed()))?;

        if status == StepStatus::Fail {
            warn!(step = %id, exit_code = code, "step failed, stopping run");
            break;
        }
    }

    let ok_ids = executed
        .iter()
        .filter(|id| {
            catalog
                .get(id.as_str())
                .is_some_and(|step| step.status == StepStatus::Ok)
        })
        .cloned();
    let completed_after = completed.mark(ok_ids);
    let next = next_selection(catalog, &completed_after, &executed);
    let failed_labels: Vec<String> = executed
        .iter()
        .filter_map(|id| catalog.get(id))
        .filter(|step| step.status == StepStatus::Fail)
        .map(|step| step.label.clone())
        .collect();

    info!(
        executed = executed.len(),
        failed = failed_labels.len(),
        "run finished"
    );
    Ok((
        RunReport {
            executed,
            failed_labels,
            next_selection: next,
        },
        completed_after,
    ))
}

/// Consume the event stream until the terminal exit event. Blocking on the
/// channel is the driver's only suspension point; each line is classified
/// as it arrives.
fn consume_events(
    events: std::sync::mpsc::Receiver<ScriptEvent>,
    logs: &mut LogBuffer,
    emitted_any: &mut bool,
) -> i32 {
    for event in events {
        match event {
            ScriptEvent::Line(line) => append_line(logs, &line, emitted_any),
            ScriptEvent::Exited(code) => return code,
        }
    }
    // The producer vanished without an exit event; treat as failure.
    1
}

fn append_line(logs: &mut LogBuffer, raw: &str, emitted_any: &mut bool) {
    let entries = classify_line(raw, !*emitted_any);
    if !entries.is_empty() {
        *emitted_any = true;
    }
    logs.extend(entries);
}
