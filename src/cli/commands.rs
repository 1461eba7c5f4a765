//! # Commands Module / 命令模块
//!
//! The `run`, `list` and `config` subcommands, plus the setup they share:
//! resolving paths, loading the registry and building the run configuration.
//!
//! `run`、`list` 和 `config` 子命令，以及它们共享的准备工作：
//! 解析路径、加载注册表和构建运行配置。

use clap::ArgMatches;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::catalog::embedded_cases;
use crate::core::config::{BuildConfig, Capabilities, RunConfig};
use crate::core::registry::{Registry, load_test_list};
use crate::errors::ConfigError;

pub mod list;
pub mod run;
pub mod show_config;

/// File name of the test list inside the test directory.
pub const DEFAULT_TEST_LIST: &str = "TESTLIST";

/// Locations every subcommand needs.
#[derive(Debug, Clone)]
pub struct PathArgs {
    pub binary: PathBuf,
    pub config_h: PathBuf,
    pub test_dir: PathBuf,
    pub test_list: Option<PathBuf>,
}

impl PathArgs {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            binary: matches
                .get_one::<PathBuf>("binary")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("./tcpdump")),
            config_h: matches
                .get_one::<PathBuf>("config-h")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("config.h")),
            test_dir: matches
                .get_one::<PathBuf>("test-dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("tests")),
            test_list: matches.get_one::<PathBuf>("test-list").cloned(),
        }
    }

    /// The explicit test list, or `TESTLIST` inside the test directory.
    pub fn test_list(&self) -> PathBuf {
        self.test_list
            .clone()
            .unwrap_or_else(|| self.test_dir.join(DEFAULT_TEST_LIST))
    }
}

/// Options specific to `run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub only: Option<String>,
    /// `0` means one worker per CPU.
    pub jobs: usize,
    pub print_passed: bool,
    pub timeout_secs: Option<u64>,
    pub diff_flags: String,
    pub scratch_dir: Option<PathBuf>,
    pub save_failures: Option<PathBuf>,
}

impl RunOptions {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            only: matches.get_one::<String>("name").cloned(),
            jobs: matches.get_one::<usize>("jobs").copied().unwrap_or(1),
            print_passed: matches.get_flag("print-passed"),
            timeout_secs: matches.get_one::<u64>("timeout").copied(),
            diff_flags: matches
                .get_one::<String>("diff-flags")
                .cloned()
                .unwrap_or_else(|| "-u".to_string()),
            scratch_dir: matches.get_one::<PathBuf>("scratch-dir").cloned(),
            save_failures: matches.get_one::<PathBuf>("save-failures").cloned(),
        }
    }
}

/// Merges the built-in catalog with the test list file.
pub fn load_registry(paths: &PathArgs) -> Result<Registry, ConfigError> {
    let embedded = embedded_cases()?;
    let listed = load_test_list(&paths.test_list())?;
    debug!(embedded = embedded.len(), listed = listed.len(), "loaded test definitions");
    Registry::merge(embedded, listed)
}

/// Builds the run configuration with default run options.
///
/// Reads the build header and probes the decoder. The test directory is
/// canonicalized so that relative references resolve from any worker's
/// scratch directory.
pub async fn resolve_config(paths: &PathArgs) -> Result<RunConfig, ConfigError> {
    let test_dir = paths
        .test_dir
        .canonicalize()
        .map_err(|source| ConfigError::TestDir {
            path: paths.test_dir.clone(),
            source,
        })?;
    let binary = resolve_binary(&paths.binary)?;
    let build = BuildConfig::load(&paths.config_h)?;
    let capabilities = Capabilities::probe(&binary).await;
    debug!(?capabilities, defines = build.len(), "resolved run configuration");
    Ok(RunConfig::new(binary, test_dir, build, capabilities))
}

/// Children run inside scratch directories, so a decoder given as a relative
/// path is made absolute. A bare program name is left for `PATH` lookup.
fn resolve_binary(binary: &Path) -> Result<PathBuf, ConfigError> {
    if binary.components().count() > 1 {
        std::path::absolute(binary).map_err(|source| ConfigError::BinaryPath {
            path: binary.to_path_buf(),
            source,
        })
    } else {
        Ok(binary.to_path_buf())
    }
}
