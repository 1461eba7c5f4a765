use capture_runner::{cli, exit_codes};
use colored::*;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    capture_runner::init_logging();

    match cli::run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(exit_codes::for_error(&e))
        }
    }
}
