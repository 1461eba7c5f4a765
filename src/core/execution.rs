//! # Test Execution Engine Module / 测试执行引擎模块
//!
//! This module runs a single [`TestRequest`]: it invokes the decoder under
//! test with its streams redirected into the worker's scratch directory,
//! decodes abnormal completions, and hands successful runs to the verifier.
//!
//! 此模块运行单个 [`TestRequest`]：调用被测解码器并将其输出流重定向到工作者的临时目录，
//! 解码异常结束状态，并将成功的运行交给校验器。

use std::ffi::OsString;
use std::time::{Duration, Instant};

use crate::core::config::RunConfig;
use crate::core::models::{FailureReason, TestRequest, TestResult};
use crate::core::verify::{read_lossy, verify_output};
use crate::infra::command::{Completion, Launcher, ProcessSpec};
use crate::infra::fs::WorkerScratch;

/// Builds the decoder invocation for `req`:
/// `<binary> <decode flags> -r <input> <args...>`.
pub fn build_invocation(req: &TestRequest, cfg: &RunConfig, scratch: &WorkerScratch) -> ProcessSpec {
    let mut args: Vec<OsString> = cfg.decode_flags.iter().map(Into::into).collect();
    args.push("-r".into());
    args.push(req.input.clone().into());
    args.extend(req.args.iter().map(Into::into));

    ProcessSpec {
        program: cfg.binary.clone().into(),
        args,
        cwd: scratch.path().to_path_buf(),
        env: cfg.child_env(),
        stdout: scratch.stdout(),
        stderr: scratch.stderr(),
        timeout: cfg.timeout,
    }
}

/// Runs one request to its terminal result.
///
/// A request carrying a skip reason never reaches the launcher. Before every
/// invocation the scratch directory is reset, so a crash artifact found
/// afterwards always belongs to this run.
pub async fn run_request(
    req: &TestRequest,
    cfg: &RunConfig,
    scratch: &WorkerScratch,
    launcher: &dyn Launcher,
) -> TestResult {
    if let Some(reason) = &req.skip_reason {
        return TestResult::Skipped {
            reason: reason.clone(),
        };
    }

    if let Err(e) = scratch.reset_for_run() {
        return TestResult::failed(
            FailureReason::Scratch(format!("{}: {e}", scratch.path().display())),
            String::new(),
        );
    }

    let spec = build_invocation(req, cfg, scratch);
    let started = cfg.print_passed.then(Instant::now);

    let completion = match launcher.launch(&spec).await {
        Ok(completion) => completion,
        Err(e) => {
            return TestResult::failed(
                FailureReason::FailedToRun(e.to_string()),
                format!("{}\n{e}", spec.display_command()),
            );
        }
    };
    let elapsed = started.map(|t| t.elapsed()).unwrap_or(Duration::ZERO);

    match completion {
        Completion::TimedOut => TestResult::TimedOut {
            budget: cfg.timeout.unwrap_or_default(),
        },
        Completion::Interrupted => TestResult::Skipped {
            reason: "interrupted".to_string(),
        },
        Completion::Exited { raw, success: false } => {
            let outcome = cfg
                .exit_decoder
                .decode(raw, scratch.crash_artifact_present());
            TestResult::failed(
                FailureReason::AbnormalExit { raw, outcome },
                read_lossy(&spec.stderr),
            )
        }
        Completion::Exited { success: true, .. } => {
            match verify_output(&req.output, scratch, cfg, launcher).await {
                Some(rejected) => rejected,
                None => TestResult::Passed { duration: elapsed },
            }
        }
    }
}
