//! Application state container and command dispatch.
//!
//! A single [`App`] owns every piece of orchestration state; frontends feed
//! abstract [`Command`]s in and observe state. Transitions go through the
//! pure reducer, and collection-valued state is replaced wholesale on every
//! mutation rather than edited in place.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::catalog::Catalog;
use crate::core::completion::Completed;
use crate::core::logbuf::LogBuffer;
use crate::core::selection::{self, Selection, ToggleOutcome};
use crate::core::session::{Command, Effect, Screen, UiState, reduce};
use crate::core::types::LogEntry;
use crate::driver::{RunReport, run_steps};
use crate::io::config::SetupConfig;
use crate::io::script::ScriptRunner;

pub struct App<R: ScriptRunner> {
    catalog: Catalog,
    selection: Selection,
    completed: Completed,
    logs: LogBuffer,
    last_report: Option<RunReport>,
    ui: UiState,
    running: bool,
    should_quit: bool,
    runner: R,
    workdir: PathBuf,
    shell: String,
}

impl<R: ScriptRunner> App<R> {
    pub fn new(catalog: Catalog, config: &SetupConfig, workdir: PathBuf, runner: R) -> Self {
        Self {
            catalog,
            selection: selection::initial(),
            completed: Completed::new(),
            logs: LogBuffer::new(config.log_capacity),
            last_report: None,
            ui: UiState::default(),
            running: false,
            should_quit: false,
            runner,
            workdir,
            shell: config.shell.clone(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the selection wholesale. The driver gates the plan at run
    /// start, so a non-interactive frontend may seed any subset of ids.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn completed(&self) -> &Completed {
        &self.completed
    }

    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }

    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    pub fn ui(&self) -> UiState {
        self.ui
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Apply one command: reduce the UI state, then perform the effect.
    pub fn handle(&mut self, command: Command) -> Result<()> {
        let (ui, effect) = reduce(self.ui, command, self.catalog.len());
        self.ui = ui;
        match effect {
            Effect::None => {}
            Effect::Quit => self.should_quit = true,
            Effect::ToggleCurrent => self.toggle_current(),
            Effect::SelectAll => {
                self.selection =
                    selection::select_all(&self.catalog, &self.completed, &self.selection);
            }
            Effect::ClearSelection => self.selection = selection::clear(),
            Effect::SelectFailed => {
                self.selection =
                    selection::select_failed(&self.catalog, &self.completed, &self.selection);
            }
            Effect::Run => self.run()?,
        }
        Ok(())
    }

    /// Execute the current selection. Reentrancy guard: at most one run in
    /// flight, a second invocation is a no-op.
    pub fn run(&mut self) -> Result<()> {
        if self.running {
            return Ok(());
        }
        self.running = true;
        let result = run_steps(
            &self.runner,
            &self.workdir,
            &self.shell,
            &mut self.catalog,
            &self.selection,
            &self.completed,
            &mut self.logs,
        );
        self.running = false;

        let (report, completed) = result?;
        self.completed = completed;
        self.selection = report.next_selection.clone();
        self.last_report = Some(report);
        self.ui = UiState {
            screen: Screen::Summary,
            ..self.ui
        };
        Ok(())
    }

    fn toggle_current(&mut self) {
        let Some(step) = self.catalog.steps().get(self.ui.cursor) else {
            return;
        };
        let id = step.id.clone();
        match selection::toggle(&self.catalog, &self.completed, &self.selection, &id) {
            ToggleOutcome::Applied(next) => self.selection = next,
            ToggleOutcome::Rejected(rejection) => {
                self.logs.push(LogEntry::warning(rejection.message()));
            }
        }
    }
}
