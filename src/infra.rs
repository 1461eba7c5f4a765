//! # Infrastructure Module / 基础设施模块
//!
//! Everything that touches the operating system on behalf of a test:
//! spawning and reclaiming child processes (`command`) and the per-worker
//! scratch directories they run in (`fs`). The translation macro is
//! re-exported here so every layer imports it from one place.
//!
//! 代表测试与操作系统交互的部分：派生和回收子进程（`command`），
//! 以及子进程运行所在的每个工作者的临时目录（`fs`）。

pub mod command;
pub mod fs;

pub use rust_i18n::t;
