//! # Configuration Errors / 配置错误
//!
//! Errors that abort a whole run before any test starts. Per-test problems
//! (start failures, crashes, mismatches, timeouts) are never errors: they are
//! folded into [`TestResult`](crate::models::TestResult) values instead.
//!
//! 在任何测试开始之前中止整个运行的错误。单个测试的问题不是错误，
//! 而是作为 `TestResult` 值返回。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A fatal configuration problem.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read test list {}: {source}", .path.display())]
    ReadTestList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: expected `name input output [args...]`, found {found:?}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        found: String,
    },

    #[error("embedded test `{name}` has unparseable arguments: {args}")]
    MalformedEmbedded { name: String, args: String },

    #[error("duplicate test name `{0}`")]
    DuplicateName(String),

    #[error("no test named `{0}` exists")]
    UnknownTest(String),

    #[error("test `{name}` exists but is skipped: {reason}")]
    TestSkipped { name: String, reason: String },

    #[error("no tests are ready to run ({skipped} of {selected} selected tests are skipped)")]
    NoRunnableTests { selected: usize, skipped: usize },

    #[error("failed to read build configuration {}: {source}", .path.display())]
    ReadBuildConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("test directory {} is not accessible: {source}", .path.display())]
    TestDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot resolve decoder path {}: {source}", .path.display())]
    BinaryPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid diff flags {0:?}")]
    DiffFlags(String),

    #[error("failed to prepare directory {}: {source}", .path.display())]
    Scratch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
