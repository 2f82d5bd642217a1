//! Interactive machine-setup installer orchestrator.
//!
//! This crate drives a curated catalog of installer steps: the user selects a
//! subset, the driver executes the matching shell scripts one at a time in
//! catalog order, output lines are classified into structured log entries,
//! and steps that succeeded are remembered for the rest of the session. The
//! architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (catalog, gating, selection,
//!   planning, log classification, screen transitions). No I/O, fully
//!   testable in isolation.
//! - **[`io`]**: Side-effecting operations (configuration files, script
//!   process execution). Isolated to enable scripted stand-ins in tests.
//!
//! Orchestration modules ([`app`], [`driver`]) coordinate core logic with I/O
//! to implement the command surface and the run loop.

pub mod app;
pub mod core;
pub mod driver;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
