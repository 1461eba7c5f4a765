//! Documented process exit codes.

use crate::errors::ConfigError;

/// Exit codes produced by `capture-runner`.
///
/// Unknown/unexpected failures always result in exit code 1, the same code
/// used when tests fail, since both mean "this run is not green".
pub enum RunnerExitCode {}

impl RunnerExitCode {
    /// Every selected test passed or was skipped.
    pub const OK: u8 = 0;

    /// One or more tests failed or timed out.
    pub const TESTS_FAILED: u8 = 1;

    /// The command line was malformed. Clap exits with this code itself.
    pub const USAGE: u8 = 2;

    /// The run was aborted before any test started because of a configuration error.
    pub const CONFIG_ERROR: u8 = 3;
}

/// Maps an error that escaped a command to the exit code reported to the shell.
pub fn for_error(err: &anyhow::Error) -> u8 {
    if err.chain().any(|cause| cause.is::<ConfigError>()) {
        RunnerExitCode::CONFIG_ERROR
    } else {
        RunnerExitCode::TESTS_FAILED
    }
}
