//! Test-only helpers for building catalogs and scripted script runners.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, channel};

use anyhow::{Context, Result, anyhow};

use crate::core::catalog::{Catalog, Step};
use crate::core::selection::Selection;
use crate::core::types::StepStatus;
use crate::io::script::{ScriptEvent, ScriptRequest, ScriptRunner};

/// Create a deterministic step with default fields.
pub fn step(id: &str, requires_brew: bool) -> Step {
    Step {
        id: id.to_string(),
        label: format!("{id} label"),
        script: PathBuf::from(format!("scripts/{id}.sh")),
        status: StepStatus::Idle,
        duration: None,
        requires_brew,
        category: None,
    }
}

/// Build a catalog from steps, panicking on invalid fixtures.
pub fn catalog(steps: Vec<Step>) -> Catalog {
    Catalog::new(steps).expect("valid catalog")
}

/// Build a selection from string ids.
pub fn selection_of(ids: &[&str]) -> Selection {
    ids.iter().map(|id| id.to_string()).collect()
}

/// Temporary project root with a `scripts/` directory for fixture scripts.
pub struct TestProject {
    dir: tempfile::TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create tempdir")?;
        fs::create_dir_all(dir.path().join("scripts")).context("create scripts dir")?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a fixture script under `scripts/<name>`.
    pub fn write_script(&self, name: &str, body: &str) -> Result<()> {
        let path = self.dir.path().join("scripts").join(name);
        fs::write(&path, body).with_context(|| format!("write {}", path.display()))
    }
}

/// One scripted spawn outcome replayed by [`ScriptedRunner`].
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Emit these events in order.
    Events(Vec<ScriptEvent>),
    /// Fail the spawn itself.
    SpawnError(String),
}

impl ScriptedOutcome {
    /// Lines followed by an exit code.
    pub fn run(lines: &[&str], exit_code: i32) -> Self {
        let mut events: Vec<ScriptEvent> = lines
            .iter()
            .map(|line| ScriptEvent::Line(line.to_string()))
            .collect();
        events.push(ScriptEvent::Exited(exit_code));
        Self::Events(events)
    }

    /// Silent run with the given exit code.
    pub fn exit(exit_code: i32) -> Self {
        Self::run(&[], exit_code)
    }

    pub fn spawn_error(message: &str) -> Self {
        Self::SpawnError(message.to_string())
    }
}

/// Scripted stand-in for [`ScriptRunner`] that replays canned event
/// sequences, one per spawn, without starting processes.
pub struct ScriptedRunner {
    outcomes: Mutex<VecDeque<ScriptedOutcome>>,
}

impl ScriptedRunner {
    pub fn new(outcomes: Vec<ScriptedOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
        }
    }
}

impl ScriptRunner for ScriptedRunner {
    fn spawn(&self, request: &ScriptRequest) -> Result<Receiver<ScriptEvent>> {
        let outcome = self
            .outcomes
            .lock()
            .expect("scripted runner lock")
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted outcome left for {}", request.script.display()))?;
        match outcome {
            ScriptedOutcome::SpawnError(message) => Err(anyhow!(message)),
            ScriptedOutcome::Events(events) => {
                let (tx, rx) = channel();
                for event in events {
                    let _ = tx.send(event);
                }
                Ok(rx)
            }
        }
    }
}
