//! # Run Command Module / 运行命令模块
//!
//! Implements `capture-runner run [NAME]`.

use anyhow::Result;
use colored::*;
use std::{fs, sync::Arc, time::Duration};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::{PathArgs, RunOptions, load_registry, resolve_config};
use crate::core::{RunConfig, registry, scheduler};
use crate::errors::ConfigError;
use crate::exit_codes::RunnerExitCode;
use crate::infra::command::{Launcher, SystemLauncher};
use crate::infra::t;
use crate::reporting::Reporter;

/// Executes the run command.
///
/// Returns `OK` only when every selected test finished and none of them
/// failed or timed out.
pub async fn execute(paths: PathArgs, options: RunOptions, locale: &str) -> Result<u8> {
    let registry = load_registry(&paths)?;
    let diff_flags = shlex::split(&options.diff_flags)
        .ok_or_else(|| ConfigError::DiffFlags(options.diff_flags.clone()))?;
    if let Some(dir) = &options.save_failures {
        fs::create_dir_all(dir).map_err(|source| ConfigError::Scratch {
            path: dir.clone(),
            source,
        })?;
    }

    let jobs = match options.jobs {
        0 => num_cpus::get(),
        n => n,
    };
    let cfg = RunConfig {
        jobs,
        print_passed: options.print_passed,
        timeout: options.timeout_secs.map(Duration::from_secs),
        diff_flags,
        scratch_parent: options.scratch_dir,
        save_failures: options.save_failures,
        ..resolve_config(&paths).await?
    };

    let requests = registry::select(registry.requests(&cfg), options.only.as_deref())?;
    let total = requests.len();
    println!(
        "{}",
        t!(
            "run.header",
            locale = locale,
            binary = cfg.binary.display(),
            count = total,
            jobs = cfg.jobs.min(total)
        )
        .bold()
    );

    let cancel = setup_signal_handler(locale);
    let cfg = Arc::new(cfg);
    let launcher: Arc<dyn Launcher> = Arc::new(SystemLauncher::new(cancel.clone()));

    let mut reporter = Reporter::new(locale, cfg.print_passed, total);
    scheduler::run_all(cfg, requests, launcher, cancel.clone(), |done| reporter.report(done))
        .await?;
    let counts = reporter.finish();

    if counts.success() && !cancel.is_cancelled() && counts.completed() == total {
        Ok(RunnerExitCode::OK)
    } else {
        Ok(RunnerExitCode::TESTS_FAILED)
    }
}

/// Cancels the returned token on the first Ctrl-C.
fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            return;
        }
        eprintln!("\n{}", t!("run.shutdown_signal", locale = &locale).yellow());
        token_clone.cancel();
    });

    token
}
