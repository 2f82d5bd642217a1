//! CLI tests for the `setup` binary.
//!
//! Spawns the built binary in a tempdir seeded with fake installer scripts
//! and verifies exit codes and output for the happy and failing paths.

use std::fs;
use std::path::Path;
use std::process::Command;

use setup::exit_codes;
use setup::test_support::TestProject;

fn setup_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_setup"));
    cmd.current_dir(dir);
    cmd
}

#[test]
fn run_succeeds_when_every_script_passes() {
    let project = TestProject::new().expect("project");
    project
        .write_script("brew.sh", "echo '[SUCCESS] brew ready'\nexit 0\n")
        .expect("script");
    project.write_script("node.sh", "exit 0\n").expect("script");

    let output = setup_cmd(project.root())
        .args(["run", "brew", "node"])
        .output()
        .expect("setup run");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("brew ready"));
    assert!(stdout.contains("Homebrew"));
}

#[test]
fn run_reports_failure_and_stops_early() {
    let project = TestProject::new().expect("project");
    project.write_script("brew.sh", "exit 1\n").expect("script");
    project
        .write_script("node.sh", "echo should-not-run\nexit 0\n")
        .expect("script");

    let output = setup_cmd(project.root())
        .args(["run", "brew", "node"])
        .output()
        .expect("setup run");

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Failed: Homebrew"));
    assert!(!stdout.contains("should-not-run"));
}

#[test]
fn run_rejects_unknown_ids() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = setup_cmd(temp.path())
        .args(["run", "nope"])
        .output()
        .expect("setup run");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown step id"));
}

#[test]
fn list_prints_the_catalog_with_gating() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = setup_cmd(temp.path())
        .arg("list")
        .output()
        .expect("setup list");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Homebrew"));
    assert!(stdout.contains("Karabiner Elements (requires brew)"));
}

#[test]
fn list_json_is_parseable() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = setup_cmd(temp.path())
        .args(["list", "--json"])
        .output()
        .expect("setup list --json");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let steps: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("parse json listing");
    assert_eq!(steps.as_array().map(Vec::len), Some(15));
    assert_eq!(steps[0]["id"], "brew");
}

#[test]
fn config_file_overrides_the_scripts_dir() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("setup.toml"),
        "shell = \"/bin/bash\"\nscripts_dir = \"installers\"\nlog_capacity = 300\n",
    )
    .expect("write config");
    let installers = temp.path().join("installers");
    fs::create_dir_all(&installers).expect("create installers dir");
    fs::write(installers.join("brew.sh"), "exit 0\n").expect("write script");

    let output = setup_cmd(temp.path())
        .args(["run", "brew"])
        .output()
        .expect("setup run");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
}
