//! # Run Configuration Module / 运行配置模块
//!
//! This module holds the process-wide [`RunConfig`], built once before the
//! first test starts and shared read-only by every worker afterwards. It also
//! reads the build-configuration header and probes the decoder under test for
//! its runtime capabilities.
//!
//! 此模块包含进程范围的 [`RunConfig`]，它在第一个测试开始前构建一次，
//! 之后由所有工作者只读共享。它还读取构建配置头文件，并探测被测解码器的运行时能力。

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::core::exit_status::ExitDecoder;
use crate::core::verify::PROGRESS_LINE;
use crate::errors::ConfigError;

/// Flags passed to the decoder before the input reference on every run.
pub const DECODE_FLAGS: &[&str] = &["-#", "-n"];
/// The time zone forced on every child so golden timestamps are host independent.
pub const FIXED_TIME_ZONE: &str = "GMT0";
/// Default flags for the content diff.
pub const DEFAULT_DIFF_FLAGS: &[&str] = &["-u"];

/// Build-configuration values read from a C configuration header.
///
/// 从 C 配置头文件中读取的构建配置值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildConfig {
    values: BTreeMap<String, String>,
}

impl BuildConfig {
    /// Parses `#define NAME [VALUE]` lines. Everything else, including
    /// `/* #undef NAME */`, is ignored.
    pub fn parse(text: &str) -> Self {
        let values = text
            .lines()
            .filter_map(|line| {
                let rest = line.trim_start().strip_prefix("#define")?;
                if !rest.starts_with(char::is_whitespace) {
                    return None;
                }
                let mut parts = rest.trim().splitn(2, char::is_whitespace);
                let name = parts.next().filter(|name| !name.is_empty())?;
                let value = parts.next().unwrap_or("").trim();
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        Self { values }
    }

    /// Reads and parses the header at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadBuildConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BuildConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Runtime properties self-reported by the decoder under test.
///
/// `None` means the probe failed; capability predicates never match it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// The floating-point representation class (`--fp-type`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fp_type: Option<String>,
    /// The width of the decoder's time type in bits (`--time-t-size`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_t_bits: Option<u32>,
}

impl Capabilities {
    /// Asks the decoder binary for its capabilities.
    pub async fn probe(binary: &Path) -> Self {
        let fp_type = probe_token(binary, "--fp-type").await;
        let time_t_bits = match probe_token(binary, "--time-t-size").await {
            Some(token) => match token.parse() {
                Ok(bits) => Some(bits),
                Err(_) => {
                    warn!(%token, "decoder reported an unparseable time type width");
                    None
                }
            },
            None => None,
        };
        Self {
            fp_type,
            time_t_bits,
        }
    }
}

/// Runs `<binary> <flag>` and returns the first token of its standard output.
async fn probe_token(binary: &Path, flag: &str) -> Option<String> {
    let output = match tokio::process::Command::new(binary)
        .arg(flag)
        .kill_on_drop(true)
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            warn!(binary = %binary.display(), flag, error = %e, "capability probe failed to start");
            return None;
        }
    };
    if !output.status.success() {
        warn!(binary = %binary.display(), flag, status = %output.status, "capability probe failed");
        return None;
    }
    let token = String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .next()
        .map(str::to_string);
    if token.is_none() {
        warn!(binary = %binary.display(), flag, "capability probe printed nothing");
    }
    token
}

/// Process-wide configuration for a run.
///
/// Constructed once, then shared (`Arc<RunConfig>`) and never mutated.
/// 为一次运行构建一次，然后共享且不再修改。
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The decoder under test.
    pub binary: PathBuf,
    /// Absolute directory that input and golden references are relative to.
    pub test_dir: PathBuf,
    pub build: BuildConfig,
    pub capabilities: Capabilities,
    /// `std::env::consts::OS` unless overridden.
    pub host_os: String,
    pub decode_flags: Vec<String>,
    pub diff_flags: Vec<String>,
    /// Number of workers. Always at least one.
    pub jobs: usize,
    /// Also report passing tests, with their duration.
    pub print_passed: bool,
    pub time_zone: String,
    /// Per-test wall-clock budget.
    pub timeout: Option<Duration>,
    pub exit_decoder: ExitDecoder,
    /// Standard-error lines matching this are informational.
    pub stderr_allow: Regex,
    /// Parent of the per-worker scratch directories; system temp when `None`.
    pub scratch_parent: Option<PathBuf>,
    /// Where captured output of failing tests is copied.
    pub save_failures: Option<PathBuf>,
}

impl RunConfig {
    /// A configuration with the default settings for everything but the
    /// decoder, the test directory and the build/runtime facts.
    pub fn new(
        binary: impl Into<PathBuf>,
        test_dir: impl Into<PathBuf>,
        build: BuildConfig,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            binary: binary.into(),
            test_dir: test_dir.into(),
            build,
            capabilities,
            host_os: std::env::consts::OS.to_string(),
            decode_flags: DECODE_FLAGS.iter().map(|s| s.to_string()).collect(),
            diff_flags: DEFAULT_DIFF_FLAGS.iter().map(|s| s.to_string()).collect(),
            jobs: 1,
            print_passed: false,
            time_zone: FIXED_TIME_ZONE.to_string(),
            timeout: None,
            exit_decoder: ExitDecoder::host(),
            stderr_allow: PROGRESS_LINE.clone(),
            scratch_parent: None,
            save_failures: None,
        }
    }

    /// Environment overrides applied to every child process.
    pub fn child_env(&self) -> Vec<(String, String)> {
        vec![
            ("TZ".to_string(), self.time_zone.clone()),
            ("LC_ALL".to_string(), "C".to_string()),
        ]
    }

    /// A serializable view of the resolved configuration.
    pub fn summary(&self) -> ConfigSummary<'_> {
        ConfigSummary {
            binary: &self.binary,
            test_dir: &self.test_dir,
            host_os: &self.host_os,
            time_zone: &self.time_zone,
            jobs: self.jobs,
            decode_flags: &self.decode_flags,
            diff_flags: &self.diff_flags,
            exit_decoder: self.exit_decoder,
            capabilities: &self.capabilities,
            build: &self.build,
        }
    }
}

/// What `capture-runner config` prints.
#[derive(Debug, Serialize)]
pub struct ConfigSummary<'a> {
    pub binary: &'a Path,
    pub test_dir: &'a Path,
    pub host_os: &'a str,
    pub time_zone: &'a str,
    pub jobs: usize,
    pub decode_flags: &'a [String],
    pub diff_flags: &'a [String],
    pub exit_decoder: ExitDecoder,
    pub capabilities: &'a Capabilities,
    pub build: &'a BuildConfig,
}
