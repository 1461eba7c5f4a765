//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the runner:
//! the declarative [`TestCase`], the normalized [`TestRequest`] built from it,
//! and the terminal [`TestResult`] of running one request.
//!
//! 此模块定义了整个运行器中使用的核心数据结构：
//! 声明式的 [`TestCase`]、由其构建的规范化 [`TestRequest`]，
//! 以及运行一个请求的最终 [`TestResult`]。

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::core::config::RunConfig;
use crate::core::exit_status::ExitOutcome;
use crate::core::skip::SkipWhen;

/// Time-format flag appended to every request that does not opt out.
pub const DEFAULT_TIME_FLAG: &str = "-tttt";
/// Argument token that opts out of [`DEFAULT_TIME_FLAG`]. It is stripped from
/// the request; the test's own time flag is kept.
pub const OWN_TIME_FLAG: &str = "--own-time-flag";
/// Replaced with the absolute test directory inside request arguments.
pub const TESTDIR_PLACEHOLDER: &str = "@TESTDIR@";

/// A single test, as declared in the embedded catalog or the test list.
///
/// 嵌入式目录或测试列表中声明的单个测试。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Unique across the whole registry.
    pub name: String,
    /// Capture file, relative to the test directory.
    pub input: PathBuf,
    /// Golden file, relative to the test directory.
    pub output: PathBuf,
    /// Extra decoder arguments, in order.
    pub args: Vec<String>,
    /// When this test does not apply. Resolved into a reason when the
    /// request is built.
    pub skip: SkipWhen,
}

impl TestCase {
    pub fn new(
        name: impl Into<String>,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        args: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: output.into(),
            args,
            skip: SkipWhen::never(),
        }
    }

    pub fn with_skip(mut self, skip: SkipWhen) -> Self {
        self.skip = skip;
        self
    }
}

/// A test ready to be dispatched: paths resolved, arguments normalized and
/// the skip decision cached. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRequest {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub args: Vec<String>,
    /// `Some` means the test must not run.
    pub skip_reason: Option<String>,
}

impl TestRequest {
    pub fn from_case(case: &TestCase, cfg: &RunConfig) -> Self {
        let skip_reason = match case.skip.first_match(cfg) {
            Some((predicate, reason)) => {
                debug!(test = %case.name, %predicate, %reason, "test will be skipped");
                Some(reason)
            }
            None => None,
        };

        Self {
            name: case.name.clone(),
            input: cfg.test_dir.join(&case.input),
            output: cfg.test_dir.join(&case.output),
            args: normalize_args(&case.args, &cfg.test_dir),
            skip_reason,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skip_reason.is_some()
    }
}

/// Appends [`DEFAULT_TIME_FLAG`] unless `args` contains [`OWN_TIME_FLAG`], in
/// which case the sentinel is removed instead. [`TESTDIR_PLACEHOLDER`] is
/// expanded in every argument.
pub fn normalize_args(args: &[String], test_dir: &Path) -> Vec<String> {
    let test_dir = test_dir.to_string_lossy();
    let opted_out = args.iter().any(|arg| arg == OWN_TIME_FLAG);

    let mut normalized: Vec<String> = args
        .iter()
        .filter(|arg| *arg != OWN_TIME_FLAG)
        .map(|arg| arg.replace(TESTDIR_PLACEHOLDER, &test_dir))
        .collect();
    if !opted_out {
        normalized.push(DEFAULT_TIME_FLAG.to_string());
    }
    normalized
}

/// Why a test failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// A process could not be started. Carries the system error text.
    FailedToRun(String),
    /// The decoder completed with a nonzero status.
    AbnormalExit { raw: i32, outcome: ExitOutcome },
    /// Standard output differs from the golden file.
    ContentMismatch,
    /// Standard error contains lines that are not informational.
    UnexpectedStderr,
    /// A scratch file could not be prepared or read.
    Scratch(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::FailedToRun(e) => write!(f, "failed to run: {e}"),
            FailureReason::AbnormalExit { raw, outcome } => {
                write!(f, "exit status {raw:#x} ({outcome})")
            }
            FailureReason::ContentMismatch => write!(f, "output differs from the golden file"),
            FailureReason::UnexpectedStderr => write!(f, "unexpected output on standard error"),
            FailureReason::Scratch(e) => write!(f, "scratch file error: {e}"),
        }
    }
}

/// The terminal state of one test.
///
/// Produced exactly once per request, by the worker that ran it.
/// 每个请求恰好产生一次，由运行它的工作者产生。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    /// Duration is zero unless timing was requested.
    Passed { duration: Duration },
    Failed {
        reason: FailureReason,
        diagnostic: String,
    },
    Skipped { reason: String },
    TimedOut { budget: Duration },
}

/// Terminal states of the per-test state machine
/// `Pending -> {Skipped | Running -> {Passed | Failed | TimedOut}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TestState {
    Passed,
    Failed,
    Skipped,
    TimedOut,
}

impl TestResult {
    pub fn failed(reason: FailureReason, diagnostic: impl Into<String>) -> Self {
        TestResult::Failed {
            reason,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn state(&self) -> TestState {
        match self {
            TestResult::Passed { .. } => TestState::Passed,
            TestResult::Failed { .. } => TestState::Failed,
            TestResult::Skipped { .. } => TestState::Skipped,
            TestResult::TimedOut { .. } => TestState::TimedOut,
        }
    }

    /// Failed or timed out: counts against the run.
    pub fn is_failure(&self) -> bool {
        matches!(self, TestResult::Failed { .. } | TestResult::TimedOut { .. })
    }
}

/// A result together with the request it belongs to.
#[derive(Debug, Clone)]
pub struct CompletedTest {
    /// Position of the request in the dispatched sequence.
    pub index: usize,
    pub name: String,
    pub result: TestResult,
}
