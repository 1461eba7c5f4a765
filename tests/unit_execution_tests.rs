//! # Execution Engine Unit Tests / 执行引擎单元测试
//!
//! Runs single requests against a scripted launcher so every terminal state
//! can be reached without spawning processes.
//!
//! 使用脚本化启动器运行单个请求，无需派生进程即可到达每个终止状态。

mod common;

use capture_runner::core::execution::{build_invocation, run_request};
use capture_runner::infra::command::Completion;
use capture_runner::infra::fs::WorkerScratch;
use capture_runner::models::{FailureReason, TestCase, TestRequest, TestResult};
use common::{Script, ScriptedLauncher, test_config};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

fn request(name: &str) -> TestRequest {
    let cfg = test_config(Path::new("/srv/tests"));
    TestRequest::from_case(
        &TestCase::new(name, format!("{name}.pcap"), format!("{name}.out"), vec!["-v".into()]),
        &cfg,
    )
}

#[test]
fn test_invocation_shape() {
    let cfg = test_config(Path::new("/srv/tests"));
    let scratch = WorkerScratch::create(None, 0).unwrap();
    let spec = build_invocation(&request("foo"), &cfg, &scratch);

    assert_eq!(spec.program, OsString::from("/opt/decoder/bin/tcpdump"));
    let args: Vec<_> = spec.args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
    assert_eq!(args, vec!["-#", "-n", "-r", "/srv/tests/foo.pcap", "-v", "-tttt"]);
    assert_eq!(spec.cwd, scratch.path());
    assert!(spec.env.contains(&("TZ".to_string(), "GMT0".to_string())));
    assert_eq!(spec.stdout, scratch.stdout());
}

#[tokio::test]
async fn test_skipped_request_never_launches() {
    let cfg = test_config(Path::new("/srv/tests"));
    let scratch = WorkerScratch::create(None, 0).unwrap();
    let launcher = ScriptedLauncher::always(Script::ok(""));

    let mut req = request("crypto");
    req.skip_reason = Some("HAVE_LIBCRYPTO is not defined".to_string());
    let result = run_request(&req, &cfg, &scratch, &launcher).await;

    assert_eq!(
        result,
        TestResult::Skipped {
            reason: "HAVE_LIBCRYPTO is not defined".to_string()
        }
    );
    assert!(launcher.calls().is_empty());
}

#[tokio::test]
async fn test_pass_runs_decoder_then_diff() {
    let cfg = test_config(Path::new("/srv/tests"));
    let scratch = WorkerScratch::create(None, 0).unwrap();
    let launcher = ScriptedLauncher::always(
        Script::ok("packet 1\n").with_stderr("reading from file foo.pcap, link-type EN10MB (Ethernet)\n"),
    );

    let result = run_request(&request("foo"), &cfg, &scratch, &launcher).await;
    assert_eq!(result, TestResult::Passed { duration: Duration::ZERO });

    let calls = launcher.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].program, OsString::from("diff"));
    let diff_args: Vec<_> = calls[1].args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
    assert_eq!(diff_args[0], "-u");
    assert_eq!(diff_args[1], "/srv/tests/foo.out");
}

#[tokio::test]
async fn test_start_failure_is_failed_to_run() {
    let cfg = test_config(Path::new("/srv/tests"));
    let scratch = WorkerScratch::create(None, 0).unwrap();
    let launcher = ScriptedLauncher::always(Script::cannot_start());

    match run_request(&request("foo"), &cfg, &scratch, &launcher).await {
        TestResult::Failed {
            reason: FailureReason::FailedToRun(message),
            diagnostic,
        } => {
            assert!(message.contains("no such file"));
            assert!(diagnostic.contains("tcpdump"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_crash_is_abnormal_exit_with_stderr() {
    let cfg = test_config(Path::new("/srv/tests"));
    let scratch = WorkerScratch::create(None, 0).unwrap();
    let launcher = ScriptedLauncher::always(Script::exits(0x8b).with_stderr("Segmentation fault\n"));

    match run_request(&request("foo"), &cfg, &scratch, &launcher).await {
        TestResult::Failed {
            reason: FailureReason::AbnormalExit { raw, outcome },
            diagnostic,
        } => {
            assert_eq!(raw, 0x8b);
            assert_eq!(outcome.crash_signal, Some(11));
            assert_eq!(diagnostic, "Segmentation fault\n");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    // No verification after an abnormal exit.
    assert_eq!(launcher.calls().len(), 1);
}

#[tokio::test]
async fn test_crash_artifact_is_detected_and_cleared() {
    let cfg = test_config(Path::new("/srv/tests"));
    let scratch = WorkerScratch::create(None, 0).unwrap();

    let crashing = ScriptedLauncher::always(Script::exits(0x100).with_core());
    match run_request(&request("foo"), &cfg, &scratch, &crashing).await {
        TestResult::Failed {
            reason: FailureReason::AbnormalExit { outcome, .. },
            ..
        } => assert!(outcome.crashed),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(scratch.crash_artifact_present());

    // The next run in the same directory must not see the stale artifact.
    let plain_failure = ScriptedLauncher::always(Script::exits(0x100));
    match run_request(&request("bar"), &cfg, &scratch, &plain_failure).await {
        TestResult::Failed {
            reason: FailureReason::AbnormalExit { outcome, .. },
            ..
        } => {
            assert!(!outcome.crashed);
            assert_eq!(outcome.exit_code, Some(1));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_content_mismatch_carries_diff() {
    let cfg = test_config(Path::new("/srv/tests"));
    let scratch = WorkerScratch::create(None, 0).unwrap();
    let mut launcher = ScriptedLauncher::always(Script::ok("actual\n"));
    launcher.diff_mismatch = true;

    match run_request(&request("foo"), &cfg, &scratch, &launcher).await {
        TestResult::Failed {
            reason: FailureReason::ContentMismatch,
            diagnostic,
        } => assert!(diagnostic.contains("+actual")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_stderr_fails_after_matching_output() {
    let cfg = test_config(Path::new("/srv/tests"));
    let scratch = WorkerScratch::create(None, 0).unwrap();
    let launcher = ScriptedLauncher::always(Script::ok("ok\n").with_stderr(
        "reading from file foo.pcap, link-type EN10MB (Ethernet)\ntcpdump: pcap_loop: truncated dump file\n",
    ));

    match run_request(&request("foo"), &cfg, &scratch, &launcher).await {
        TestResult::Failed {
            reason: FailureReason::UnexpectedStderr,
            diagnostic,
        } => assert!(diagnostic.contains("truncated dump file")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_and_interruption() {
    let mut cfg = test_config(Path::new("/srv/tests"));
    cfg.timeout = Some(Duration::from_secs(7));
    let scratch = WorkerScratch::create(None, 0).unwrap();

    let timing_out = ScriptedLauncher::always(Script::completes(Completion::TimedOut));
    assert_eq!(
        run_request(&request("foo"), &cfg, &scratch, &timing_out).await,
        TestResult::TimedOut {
            budget: Duration::from_secs(7)
        }
    );

    let interrupted = ScriptedLauncher::always(Script::completes(Completion::Interrupted));
    assert_eq!(
        run_request(&request("foo"), &cfg, &scratch, &interrupted).await,
        TestResult::Skipped {
            reason: "interrupted".to_string()
        }
    );
}
