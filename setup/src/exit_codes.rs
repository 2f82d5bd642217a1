//! Stable exit codes for setup CLI commands.

/// Command succeeded; every executed step exited cleanly.
pub const OK: i32 = 0;
/// Invalid usage, configuration, or catalog.
pub const INVALID: i32 = 1;
/// A step failed and the run stopped early.
pub const FAILED: i32 = 2;
