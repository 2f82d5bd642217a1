//! Shared deterministic types for the orchestration core.
//!
//! These types define stable contracts between core components. They should
//! not depend on external state or I/O and must remain deterministic across
//! runs.

use serde::{Deserialize, Serialize};

/// Lifecycle of a catalog step within the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Not started in any run yet (or left untouched by a truncated run).
    Idle,
    /// The step's script is currently executing.
    Running,
    /// The script exited with code 0.
    Ok,
    /// The script exited nonzero or could not be started.
    Fail,
}

/// Display role assigned to a classified log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRole {
    Error,
    Warning,
    Success,
    Info,
    Plain,
}

/// One immutable entry in the session log.
///
/// Entries are produced by the classifier (or by selection rejections) and
/// never mutated afterwards; the buffer may only evict them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Display text with ANSI sequences, tags, and pictographs removed.
    pub text: String,
    pub role: LogRole,
    /// Explicit foreground color, if the line carried one (tag or ANSI).
    pub fg: Option<&'static str>,
    /// Sub-detail of the preceding top-level line; rendered dim/indented.
    pub dim: bool,
    pub icon: Option<char>,
    /// Synthetic step-boundary marker; carries no text.
    pub separator: bool,
}

impl LogEntry {
    /// Synthetic separator emitted before a new top-level info line.
    pub fn separator() -> Self {
        Self {
            text: String::new(),
            role: LogRole::Plain,
            fg: None,
            dim: false,
            icon: None,
            separator: true,
        }
    }

    /// Warning entry for a rejected user action (gate violations).
    pub fn warning(text: String) -> Self {
        Self {
            text,
            role: LogRole::Warning,
            fg: Some("#FFFF00"),
            dim: false,
            icon: Some('!'),
            separator: false,
        }
    }
}
