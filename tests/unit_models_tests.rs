//! # Models Module Unit Tests / Models 模块单元测试
//!
//! Argument normalization, request construction and result classification.
//!
//! 参数规范化、请求构建和结果分类。

mod common;

use capture_runner::core::exit_status::ExitOutcome;
use capture_runner::core::skip::requires_config;
use capture_runner::models::{
    FailureReason, TestCase, TestRequest, TestResult, TestState, normalize_args,
};
use common::test_config;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod normalize_tests {
    use super::*;

    #[test]
    fn test_default_time_flag_is_appended() {
        let args = normalize_args(&strings(&["-v", "-e"]), Path::new("/t"));
        assert_eq!(args, strings(&["-v", "-e", "-tttt"]));
    }

    #[test]
    fn test_own_time_flag_is_stripped() {
        let args = normalize_args(&strings(&["-vv", "--own-time-flag", "-tt"]), Path::new("/t"));
        assert_eq!(args, strings(&["-vv", "-tt"]));
    }

    #[test]
    fn test_testdir_placeholder_is_expanded() {
        let args = normalize_args(
            &strings(&["-E", "file @TESTDIR@/esp-secrets.txt"]),
            Path::new("/srv/tests"),
        );
        assert_eq!(args, strings(&["-E", "file /srv/tests/esp-secrets.txt", "-tttt"]));
    }

    #[test]
    fn test_empty_args() {
        assert_eq!(normalize_args(&[], Path::new("/t")), strings(&["-tttt"]));
    }
}

#[cfg(test)]
mod request_tests {
    use super::*;

    #[test]
    fn test_request_resolves_paths() {
        let cfg = test_config(Path::new("/srv/tests"));
        let case = TestCase::new("foo", "a.pcap", "a.out", strings(&["-v"]));
        let req = TestRequest::from_case(&case, &cfg);

        assert_eq!(req.name, "foo");
        assert_eq!(req.input, PathBuf::from("/srv/tests/a.pcap"));
        assert_eq!(req.output, PathBuf::from("/srv/tests/a.out"));
        assert_eq!(req.args, strings(&["-v", "-tttt"]));
        assert!(!req.is_skipped());
    }

    #[test]
    fn test_request_caches_skip_reason() {
        let cfg = test_config(Path::new("/srv/tests"));
        let case = TestCase::new("esp1", "esp.pcap", "esp1.out", vec![])
            .with_skip(requires_config("HAVE_LIBCRYPTO"));
        let req = TestRequest::from_case(&case, &cfg);
        assert!(req.is_skipped());
        assert_eq!(req.skip_reason.as_deref(), Some("HAVE_LIBCRYPTO is not defined"));
    }
}

#[cfg(test)]
mod result_tests {
    use super::*;

    #[test]
    fn test_states_and_failure_classification() {
        let passed = TestResult::Passed {
            duration: Duration::ZERO,
        };
        let failed = TestResult::failed(FailureReason::ContentMismatch, "diff");
        let skipped = TestResult::Skipped {
            reason: "x".to_string(),
        };
        let timed_out = TestResult::TimedOut {
            budget: Duration::from_secs(5),
        };

        assert_eq!(passed.state(), TestState::Passed);
        assert_eq!(failed.state(), TestState::Failed);
        assert_eq!(skipped.state(), TestState::Skipped);
        assert_eq!(timed_out.state(), TestState::TimedOut);

        assert!(!passed.is_failure());
        assert!(failed.is_failure());
        assert!(!skipped.is_failure());
        assert!(timed_out.is_failure());
    }

    #[test]
    fn test_abnormal_exit_display() {
        let reason = FailureReason::AbnormalExit {
            raw: 0x8b,
            outcome: ExitOutcome {
                exit_code: None,
                crashed: true,
                crash_signal: Some(11),
            },
        };
        assert_eq!(reason.to_string(), "exit status 0x8b (crashed with signal 11)");
    }
}
