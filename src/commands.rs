//! Command implementation for the coldiff CLI

use crate::cli::Cli;
use crate::config::DiffConfig;
use crate::diff::{self, CompareOptions, Status};
use crate::error::Result;
use crate::output::PrettyPrinter;

/// Run a parsed command line to completion
pub fn execute_command(cli: Cli) -> Status {
    let options = match build_options(&cli) {
        Ok(options) => options,
        Err(e) => {
            PrettyPrinter::print_error(&e);
            return Status::FailedToRun;
        }
    };

    log::info!(
        "Comparing '{}' against '{}' over {} table(s)",
        cli.file1.display(),
        cli.file2.display(),
        options.tables.len()
    );
    diff::compare(&cli.file1, &cli.file2, &options)
}

/// Merge the config file (if any) with command-line flags
pub fn build_options(cli: &Cli) -> Result<CompareOptions> {
    let config = match &cli.config {
        Some(path) => DiffConfig::load(path)?,
        None => DiffConfig::default(),
    };
    let mut options = config.merge(&cli.tables, &cli.ignore, cli.format.as_deref())?;
    options.show_progress = cli.progress;
    Ok(options)
}
