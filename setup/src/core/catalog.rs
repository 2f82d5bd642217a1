//! Ordered step catalog and per-step run results.
//!
//! The catalog is fixed at startup: membership and order never change for the
//! process lifetime, and iteration order is execution precedence. Only the
//! driver records results via [`Catalog::set_result`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde::Serialize;

use crate::core::types::StepStatus;

/// Id of the prerequisite step every gated step depends on.
pub const BREW_ID: &str = "brew";

/// One installable unit bound to an external shell script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub id: String,
    pub label: String,
    /// Script path relative to the project root.
    pub script: PathBuf,
    pub status: StepStatus,
    /// Wall time of the most recent execution.
    pub duration: Option<Duration>,
    /// Gated on the Homebrew prerequisite (see [`crate::core::gate`]).
    pub requires_brew: bool,
    pub category: Option<String>,
}

/// Check catalog invariants not enforced by construction:
/// - At least one step
/// - No duplicate ids
/// - The prerequisite step is present
pub fn validate_steps(steps: &[Step]) -> Vec<String> {
    let mut errors = Vec::new();
    if steps.is_empty() {
        errors.push("catalog must contain at least one step".to_string());
    }
    let mut seen = std::collections::HashSet::new();
    for step in steps {
        if !seen.insert(step.id.as_str()) {
            errors.push(format!("duplicate id '{}'", step.id));
        }
    }
    if !steps.is_empty() && !seen.contains(BREW_ID) {
        errors.push(format!("missing prerequisite step '{BREW_ID}'"));
    }
    errors
}

/// Read-mostly catalog with a single mutation point for run results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    steps: Vec<Step>,
}

impl Catalog {
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        let errors = validate_steps(&steps);
        if !errors.is_empty() {
            bail!("invalid catalog:\n- {}", errors.join("\n- "));
        }
        Ok(Self { steps })
    }

    /// Full ordered listing; the slice order is execution precedence.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Current status of the prerequisite step.
    pub fn brew_status(&self) -> StepStatus {
        self.get(BREW_ID)
            .map(|step| step.status)
            .unwrap_or(StepStatus::Idle)
    }

    /// Record a step's status and duration. Driver-only mutation point:
    /// no other component may change step state.
    pub fn set_result(
        &mut self,
        id: &str,
        status: StepStatus,
        duration: Option<Duration>,
    ) -> Result<()> {
        let step = self
            .steps
            .iter_mut()
            .find(|step| step.id == id)
            .ok_or_else(|| anyhow!("unknown step id '{id}'"))?;
        step.status = status;
        step.duration = duration;
        Ok(())
    }
}

/// Catalog shipped with the installer, in execution order.
pub fn default_catalog(scripts_dir: &Path) -> Catalog {
    let step = |id: &str, label: &str, file: &str, requires_brew: bool, category: &str| Step {
        id: id.to_string(),
        label: label.to_string(),
        script: scripts_dir.join(file),
        status: StepStatus::Idle,
        duration: None,
        requires_brew,
        category: Some(category.to_string()),
    };
    Catalog {
        steps: vec![
            step("brew", "Homebrew", "brew.sh", false, "core"),
            step("nvm", "NVM", "nvm.sh", false, "runtimes"),
            step("node", "Node.js", "node.sh", false, "runtimes"),
            step("bun", "Bun", "bun.sh", true, "runtimes"),
            step("go", "Go", "go.sh", true, "runtimes"),
            step(
                "karabiner",
                "Karabiner Elements",
                "karabiner-elements.sh",
                true,
                "apps",
            ),
            step("raycast", "Raycast", "raycast.sh", true, "apps"),
            step("ghostty", "Ghostty", "ghostty.sh", true, "apps"),
            step("cursor", "Cursor", "cursor.sh", true, "apps"),
            step("neovim", "Neovim", "neovim.sh", true, "terminal"),
            step("zellij", "Zellij", "zellij.sh", true, "terminal"),
            step("gh", "GitHub CLI", "github-cli.sh", true, "terminal"),
            step("claude", "Claude Code", "claude-code.sh", false, "agents"),
            step("opencode", "OpenCode TUI", "open-code.sh", false, "agents"),
            step(
                "cursor-agent",
                "Cursor Agent",
                "cursor-agent.sh",
                false,
                "agents",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog, step};

    #[test]
    fn default_catalog_starts_idle_with_brew_first() {
        let catalog = default_catalog(Path::new("scripts"));
        assert_eq!(catalog.steps()[0].id, BREW_ID);
        assert!(
            catalog
                .steps()
                .iter()
                .all(|step| step.status == StepStatus::Idle && step.duration.is_none())
        );
    }

    #[test]
    fn default_catalog_passes_validation() {
        let catalog = default_catalog(Path::new("scripts"));
        assert!(validate_steps(catalog.steps()).is_empty());
    }

    #[test]
    fn new_rejects_duplicate_ids() {
        let err = Catalog::new(vec![
            step("brew", false),
            step("node", false),
            step("node", false),
        ])
        .expect_err("expected duplicate id error");
        assert!(err.to_string().contains("duplicate id 'node'"));
    }

    #[test]
    fn new_rejects_missing_prerequisite() {
        let err = Catalog::new(vec![step("node", false)]).expect_err("expected error");
        assert!(err.to_string().contains("missing prerequisite"));
    }

    #[test]
    fn set_result_updates_only_the_named_step() {
        let mut catalog = catalog(vec![step("brew", false), step("node", false)]);
        catalog
            .set_result("node", StepStatus::Ok, Some(Duration::from_secs(3)))
            .expect("set result");

        let node = catalog.get("node").expect("node");
        assert_eq!(node.status, StepStatus::Ok);
        assert_eq!(node.duration, Some(Duration::from_secs(3)));
        assert_eq!(catalog.brew_status(), StepStatus::Idle);
    }

    #[test]
    fn set_result_errors_on_unknown_id() {
        let mut catalog = catalog(vec![step("brew", false)]);
        let err = catalog
            .set_result("nope", StepStatus::Ok, None)
            .expect_err("expected error");
        assert!(err.to_string().contains("unknown step id"));
    }
}
