//! Main entry point for coldiff CLI

use clap::Parser;
use coldiff::cli::Cli;
use coldiff::commands::execute_command;

fn main() {
    // Parse command line arguments; help and version are not failures
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                coldiff::EXIT_FAILED_TO_RUN
            } else {
                coldiff::EXIT_MATCH
            };
            std::process::exit(code);
        }
    };

    // Initialize logging, verbose raises the level to debug
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let status = execute_command(cli);
    std::process::exit(status.exit_code());
}
