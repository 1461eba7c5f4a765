//! # Capture Runner Library / Capture Runner 库
//!
//! This library provides the core functionality for the Capture Runner tool,
//! a conformance-test executor that runs a command-line packet decoder against
//! fixed captures and compares its output with golden files.
//!
//! 此库为 Capture Runner 工具提供核心功能，
//! 这是一个一致性测试执行器：针对固定的抓包文件运行命令行报文解码器，
//! 并将其输出与黄金参考文件进行比较。
//!
//! ## Modules / 模块
//!
//! - `core` - Test model, skip predicates, exit decoding, verification and scheduling
//! - `infra` - Process launching and scratch directory management
//! - `reporting` - Console reporting of per-test verdicts and the final summary
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 测试模型、跳过谓词、退出状态解码、输出校验和调度
//! - `infra` - 进程启动和临时工作目录管理
//! - `reporting` - 控制台报告每个测试的结论和最终摘要
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod errors;
pub mod exit_codes;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::models;
pub use crate::core::registry;
pub use errors::ConfigError;

/// Initializes the application's internationalization (i18n).
///
/// An explicit `--lang` value wins; otherwise the system locale is detected.
/// It attempts to match the full locale (e.g., "zh-CN"), then just the
/// language code (e.g., "en"), and finally falls back to "en".
///
/// Returns the locale that was selected.
pub fn init(requested: Option<&str>) -> String {
    let locale = requested
        .map(str::to_string)
        .or_else(sys_locale::get_locale)
        .unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale.as_str()) {
        locale.as_str()
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
    lang.to_string()
}

/// Installs the `tracing` subscriber used for diagnostic logging.
///
/// Events go to standard error so they never mix with captured report output.
/// The filter comes from `RUST_LOG` and defaults to `warn`.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // A second initialization (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
