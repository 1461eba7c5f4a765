//! Implements `capture-runner config`.

use anyhow::{Context, Result};

use super::{PathArgs, resolve_config};
use crate::exit_codes::RunnerExitCode;

/// Prints the resolved configuration as TOML.
pub async fn execute(paths: PathArgs) -> Result<u8> {
    let cfg = resolve_config(&paths).await?;
    let rendered =
        toml::to_string_pretty(&cfg.summary()).context("failed to render the configuration")?;
    print!("{rendered}");
    Ok(RunnerExitCode::OK)
}
