//! Command-line entry point for repo-starter-kit.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use repo_starter_kit::{cli, commands, logging};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, "bootstrap");
    let log = Arc::new(logging::Logger::new("bootstrap"));

    match commands::bootstrap::run(&args, &log) {
        Ok(()) => {
            log.finish();
            ExitCode::SUCCESS
        }
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
