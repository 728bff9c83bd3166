//! Command-line interface for coldiff

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "coldiff")]
#[command(about = "Display the columns that differ between two columnar container files")]
#[command(version)]
pub struct Cli {
    /// First (reference) file
    pub file1: PathBuf,

    /// Second file
    pub file2: PathBuf,

    /// Name of a table to compare. Can specify more than once.
    #[arg(short = 't', long = "tree", visible_alias = "table", value_name = "NAME")]
    pub tables: Vec<String>,

    /// Ignore columns whose name contains this substring. Can specify more than once.
    #[arg(short, long, value_name = "SUBSTR")]
    pub ignore: Vec<String>,

    /// JSON config file with default tables and ignore substrings
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format: "pretty", "json"
    #[arg(long, value_parser = validate_format)]
    pub format: Option<String>,

    /// Show a progress bar per table
    #[arg(long)]
    pub progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validate output format name
fn validate_format(s: &str) -> Result<String, String> {
    crate::output::OutputFormat::parse(s)?;
    Ok(s.to_lowercase())
}
