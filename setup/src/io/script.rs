//! Shell script execution with streamed output events.
//!
//! The [`ScriptRunner`] trait decouples the driver from process spawning.
//! Tests use scripted runners that replay predetermined event sequences
//! without touching the filesystem or spawning processes.

use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};

/// Environment forced onto every script so downstream tools keep emitting
/// ANSI-colored text through the pipes.
const FORCED_ENV: [(&str, &str); 3] = [
    ("FORCE_COLOR", "1"),
    ("TERM", "xterm-256color"),
    ("COLORTERM", "truecolor"),
];

/// Parameters for one script invocation.
#[derive(Debug, Clone)]
pub struct ScriptRequest {
    /// Script path, resolved by the shell against `workdir`.
    pub script: PathBuf,
    /// Working directory for the script (the project root).
    pub workdir: PathBuf,
    /// Shell interpreter the script runs under.
    pub shell: String,
}

/// Ordered event stream produced by a running script.
///
/// Lines from stdout and stderr interleave in arrival order (per-stream
/// order is preserved, cross-stream order is not); exactly one `Exited`
/// terminates the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    Line(String),
    Exited(i32),
}

/// Abstraction over script execution backends.
pub trait ScriptRunner {
    /// Start the script and return its event stream. An error here means the
    /// process could not be started at all.
    fn spawn(&self, request: &ScriptRequest) -> Result<Receiver<ScriptEvent>>;
}

/// Runs scripts under a POSIX shell with piped output.
pub struct ShellRunner;

impl ScriptRunner for ShellRunner {
    #[instrument(skip_all, fields(script = %request.script.display()))]
    fn spawn(&self, request: &ScriptRequest) -> Result<Receiver<ScriptEvent>> {
        let mut cmd = Command::new(&request.shell);
        cmd.arg(&request.script)
            .current_dir(&request.workdir)
            .envs(FORCED_ENV)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("spawning script");
        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawn {}", request.script.display()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr was not piped"))?;

        let (tx, rx) = channel();
        let stdout_tx = tx.clone();
        let stdout_handle = thread::spawn(move || forward_lines(stdout, stdout_tx));
        let stderr_tx = tx.clone();
        let stderr_handle = thread::spawn(move || forward_lines(stderr, stderr_tx));

        // Supervisor: drain both streams before reporting the exit code, so
        // no Line event can trail the terminal Exited event.
        thread::spawn(move || {
            let _ = stdout_handle.join();
            let _ = stderr_handle.join();
            let code = match child.wait() {
                Ok(status) => status.code().unwrap_or(1),
                Err(err) => {
                    error!(err = %err, "wait for script failed");
                    1
                }
            };
            debug!(exit_code = code, "script finished");
            let _ = tx.send(ScriptEvent::Exited(code));
        });

        Ok(rx)
    }
}

/// Forward one output stream line by line. Invalid UTF-8 is replaced rather
/// than dropped; trailing newlines are trimmed.
fn forward_lines<R: Read>(reader: R, tx: Sender<ScriptEvent>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if tx.send(ScriptEvent::Line(line)).is_err() {
                    return;
                }
            }
            Err(err) => {
                warn!(err = %err, "read script output");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn drain(rx: Receiver<ScriptEvent>) -> (Vec<String>, i32) {
        let mut lines = Vec::new();
        let mut code = None;
        for event in rx {
            match event {
                ScriptEvent::Line(line) => lines.push(line),
                ScriptEvent::Exited(c) => {
                    code = Some(c);
                    break;
                }
            }
        }
        (lines, code.expect("exit event"))
    }

    #[test]
    fn spawn_streams_lines_then_exit_code() {
        let temp = tempfile::tempdir().expect("tempdir");
        let script = temp.path().join("hello.sh");
        fs::write(&script, "echo one\necho two 1>&2\nexit 0\n").expect("write script");

        let rx = ShellRunner
            .spawn(&ScriptRequest {
                script: PathBuf::from("hello.sh"),
                workdir: temp.path().to_path_buf(),
                shell: "/bin/bash".to_string(),
            })
            .expect("spawn");

        let (mut lines, code) = drain(rx);
        lines.sort();
        assert_eq!(lines, vec!["one", "two"]);
        assert_eq!(code, 0);
    }

    #[test]
    fn spawn_reports_nonzero_exit() {
        let temp = tempfile::tempdir().expect("tempdir");
        let script = temp.path().join("fail.sh");
        fs::write(&script, "exit 7\n").expect("write script");

        let rx = ShellRunner
            .spawn(&ScriptRequest {
                script: PathBuf::from("fail.sh"),
                workdir: temp.path().to_path_buf(),
                shell: "/bin/bash".to_string(),
            })
            .expect("spawn");

        let (lines, code) = drain(rx);
        assert!(lines.is_empty());
        assert_eq!(code, 7);
    }

    #[test]
    fn missing_shell_fails_to_spawn() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = ShellRunner
            .spawn(&ScriptRequest {
                script: PathBuf::from("any.sh"),
                workdir: temp.path().to_path_buf(),
                shell: "/definitely/not/a/shell".to_string(),
            })
            .expect_err("expected spawn error");
        assert!(err.to_string().contains("spawn"));
    }
}
