// src/cli.rs
use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::{Arg, ArgAction, Command};
use std::{env, path::PathBuf};

use crate::infra::t;

pub mod commands;

use commands::{PathArgs, RunOptions};

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` or `--lang=<VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        return args.get(pos + 1).cloned();
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang=").map(str::to_string))
}

/// Builds the command-line interface with help text in `locale`.
pub fn build_cli(locale: &str) -> Command {
    Command::new("capture-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .long_about(t!("cli.long_about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("binary")
                .short('b')
                .long("binary")
                .help(t!("cli.binary", locale = locale).to_string())
                .value_name("BINARY")
                .env("TESTRUN_BINARY")
                .default_value("./tcpdump")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config-h")
                .long("config-h")
                .help(t!("cli.config_h", locale = locale).to_string())
                .value_name("CONFIG_H")
                .env("TESTRUN_CONFIG_H")
                .default_value("config.h")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("test-dir")
                .long("test-dir")
                .help(t!("cli.test_dir", locale = locale).to_string())
                .value_name("TEST_DIR")
                .default_value("tests")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("test-list")
                .long("test-list")
                .help(t!("cli.test_list", locale = locale).to_string())
                .value_name("TEST_LIST")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cmd.run_about", locale = locale).to_string())
                .arg(
                    Arg::new("name")
                        .help(t!("cmd.run_name", locale = locale).to_string())
                        .value_name("NAME")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help(t!("arg.jobs", locale = locale).to_string())
                        .value_name("JOBS")
                        .env("TESTRUN_JOBS")
                        .default_value("1")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("print-passed")
                        .long("print-passed")
                        .help(t!("arg.print_passed", locale = locale).to_string())
                        .env("TESTRUN_PASSED")
                        .value_parser(FalseyValueParser::new())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .help(t!("arg.timeout", locale = locale).to_string())
                        .value_name("SECS")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("diff-flags")
                        .long("diff-flags")
                        .help(t!("arg.diff_flags", locale = locale).to_string())
                        .value_name("FLAGS")
                        .default_value("-u")
                        .allow_hyphen_values(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("scratch-dir")
                        .long("scratch-dir")
                        .help(t!("arg.scratch_dir", locale = locale).to_string())
                        .value_name("DIR")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("save-failures")
                        .long("save-failures")
                        .help(t!("arg.save_failures", locale = locale).to_string())
                        .value_name("DIR")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(Command::new("list").about(t!("cmd.list_about", locale = locale).to_string()))
        .subcommand(
            Command::new("config").about(t!("cmd.config_about", locale = locale).to_string()),
        )
}

/// Parses the command line and runs the selected command.
///
/// Returns the process exit code for runs that got as far as reporting.
pub async fn run() -> Result<u8> {
    // Pre-parse language and initialize i18n first.
    let requested = pre_parse_language();
    let locale = crate::init(requested.as_deref());

    let matches = build_cli(&locale).get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let paths = PathArgs::from_matches(run_matches);
            let options = RunOptions::from_matches(run_matches);
            commands::run::execute(paths, options, &locale).await
        }
        Some(("list", list_matches)) => {
            commands::list::execute(PathArgs::from_matches(list_matches), &locale).await
        }
        Some(("config", config_matches)) => {
            commands::show_config::execute(PathArgs::from_matches(config_matches)).await
        }
        // `subcommand_required` makes clap print help and exit before we get here.
        _ => Ok(crate::exit_codes::RunnerExitCode::USAGE),
    }
}
