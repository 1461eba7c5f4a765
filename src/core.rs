//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Capture Runner:
//! the test model, skip predicates, exit-status decoding, output
//! verification, the single-test runner, the registry and the scheduler.
//!
//! 此模块包含 Capture Runner 的核心功能：
//! 测试模型、跳过谓词、退出状态解码、输出校验、单测试运行器、注册表和调度器。

pub mod catalog;
pub mod config;
pub mod execution;
pub mod exit_status;
pub mod models;
pub mod registry;
pub mod scheduler;
pub mod skip;
pub mod verify;

// Re-exports
pub use config::RunConfig;
pub use execution::run_request;
pub use models::{TestCase, TestRequest, TestResult};
