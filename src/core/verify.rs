//! # Output Verifier / 输出校验器
//!
//! Checks a successful decoder run in a fixed order: first the captured
//! standard output against the golden file with an external content diff,
//! then the captured standard error against the informational-line pattern.
//!
//! 按固定顺序检查一次成功的解码器运行：先用外部 diff 将捕获的标准输出与黄金文件比较，
//! 再用信息行模式检查捕获的标准错误。

use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsString;
use std::path::Path;

use crate::core::config::RunConfig;
use crate::core::models::{FailureReason, TestResult};
use crate::infra::command::{Completion, Launcher, ProcessSpec};
use crate::infra::fs::WorkerScratch;

/// The progress line a decoder prints on standard error when reading a capture.
pub static PROGRESS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^reading from file .*, link-type .*$").expect("progress line pattern is valid")
});

/// Program used for the content diff.
pub const DIFF_PROGRAM: &str = "diff";

/// Verifies the captured streams in `scratch` against `golden`.
///
/// Returns `None` when both checks pass, otherwise the result the test ends
/// with. Running it twice on the same files gives the same answer.
pub async fn verify_output(
    golden: &Path,
    scratch: &WorkerScratch,
    cfg: &RunConfig,
    launcher: &dyn Launcher,
) -> Option<TestResult> {
    if let Some(result) = diff_against_golden(golden, scratch, cfg, launcher).await {
        return Some(result);
    }
    check_stderr(&scratch.stderr(), &cfg.stderr_allow)
}

async fn diff_against_golden(
    golden: &Path,
    scratch: &WorkerScratch,
    cfg: &RunConfig,
    launcher: &dyn Launcher,
) -> Option<TestResult> {
    let mut args: Vec<OsString> = cfg.diff_flags.iter().map(Into::into).collect();
    args.push(golden.into());
    args.push(scratch.stdout().into());

    let spec = ProcessSpec {
        program: DIFF_PROGRAM.into(),
        args,
        cwd: scratch.path().to_path_buf(),
        env: cfg.child_env(),
        stdout: scratch.diff_out(),
        stderr: scratch.diff_err(),
        timeout: None,
    };

    match launcher.launch(&spec).await {
        Ok(Completion::Exited { success: true, .. }) => None,
        Ok(Completion::Exited { .. }) => {
            let mut diagnostic = read_lossy(&spec.stdout);
            diagnostic.push_str(&read_lossy(&spec.stderr));
            Some(TestResult::failed(FailureReason::ContentMismatch, diagnostic))
        }
        Ok(Completion::TimedOut) | Ok(Completion::Interrupted) => Some(TestResult::Skipped {
            reason: "interrupted".to_string(),
        }),
        Err(e) => Some(TestResult::failed(
            FailureReason::FailedToRun(format!("{DIFF_PROGRAM}: {e}")),
            spec.display_command(),
        )),
    }
}

/// Fails when any line of the captured standard error is not informational.
/// The diagnostic is the whole captured text.
pub fn check_stderr(stderr: &Path, allow: &Regex) -> Option<TestResult> {
    let text = match std::fs::read(stderr) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            return Some(TestResult::failed(
                FailureReason::Scratch(format!("{}: {e}", stderr.display())),
                String::new(),
            ));
        }
    };
    if text.lines().all(|line| allow.is_match(line)) {
        None
    } else {
        Some(TestResult::failed(FailureReason::UnexpectedStderr, text))
    }
}

/// Reads a scratch file for use as diagnostic text. Missing files read as empty.
pub fn read_lossy(path: &Path) -> String {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
