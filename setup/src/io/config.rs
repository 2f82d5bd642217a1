//! Installer configuration stored in `setup.toml` at the project root.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Name of the configuration file, resolved against the working directory.
pub const CONFIG_FILE: &str = "setup.toml";

/// Installer configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to the reference behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SetupConfig {
    /// POSIX shell used to interpret installer scripts.
    pub shell: String,

    /// Directory holding the installer scripts, relative to the project root.
    pub scripts_dir: String,

    /// Ring-buffer capacity of the session log.
    pub log_capacity: usize,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            shell: "/bin/bash".to_string(),
            scripts_dir: "scripts".to_string(),
            log_capacity: 300,
        }
    }
}

impl SetupConfig {
    pub fn validate(&self) -> Result<()> {
        if self.shell.trim().is_empty() {
            return Err(anyhow!("shell must be non-empty"));
        }
        if self.scripts_dir.trim().is_empty() {
            return Err(anyhow!("scripts_dir must be non-empty"));
        }
        if self.log_capacity == 0 {
            return Err(anyhow!("log_capacity must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SetupConfig::default()`.
pub fn load_config(path: &Path) -> Result<SetupConfig> {
    if !path.exists() {
        let cfg = SetupConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SetupConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SetupConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, SetupConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("setup.toml");
        let cfg = SetupConfig {
            shell: "/bin/sh".to_string(),
            ..SetupConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn zero_log_capacity_is_rejected() {
        let cfg = SetupConfig {
            log_capacity: 0,
            ..SetupConfig::default()
        };
        let err = cfg.validate().expect_err("expected error");
        assert!(err.to_string().contains("log_capacity"));
    }
}
