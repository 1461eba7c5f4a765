//! # Reporting Module / 报告模块
//!
//! This module handles console output for a run: an immediate block per
//! failed or skipped test, optional timing lines for passing tests, and the
//! final counts.
//!
//! 此模块处理一次运行的控制台输出：每个失败或跳过的测试立即输出一个块，
//! 可选地输出通过测试的耗时，以及最终的统计。

pub mod console;

// Re-export common reporting functions
pub use console::{Reporter, RunCounts};
