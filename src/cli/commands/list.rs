//! Implements `capture-runner list`.

use anyhow::Result;
use colored::*;
use tracing::warn;

use super::{PathArgs, load_registry, resolve_config};
use crate::exit_codes::RunnerExitCode;
use crate::infra::t;

/// Prints every registered test name in registry order.
///
/// Skip reasons are shown when the build configuration can be resolved;
/// otherwise only the names are printed.
pub async fn execute(paths: PathArgs, locale: &str) -> Result<u8> {
    let registry = load_registry(&paths)?;
    let cfg = match resolve_config(&paths).await {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!(error = %e, "listing without skip reasons");
            eprintln!("{}", t!("list.config_unavailable", locale = locale).yellow());
            None
        }
    };

    for case in registry.cases() {
        let reason = cfg
            .as_ref()
            .map(|cfg| case.skip.evaluate(cfg))
            .filter(|reason| !reason.is_empty());
        match reason {
            Some(reason) => println!(
                "{} {}",
                case.name,
                format!("[{}]", t!("list.skipped", locale = locale, reason = reason)).dimmed()
            ),
            None => println!("{}", case.name),
        }
    }
    Ok(RunnerExitCode::OK)
}
