//! Output formatting utilities

use crate::diff::{DiffReport, TableReport};
use crate::error::{ColdiffError, Result};
use std::error::Error;

/// Parse output format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Routes a report to the selected format on stdout
pub struct OutputManager {
    format: OutputFormat,
}

impl OutputManager {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn output_report(&self, report: &DiffReport) -> Result<()> {
        match self.format {
            OutputFormat::Pretty => PrettyPrinter::print_report(report),
            OutputFormat::Json => println!("{}", JsonFormatter::format_report(report)?),
        }
        Ok(())
    }
}

/// Pretty printer for coldiff output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print every mismatched table of a report; prints nothing on a match
    pub fn print_report(report: &DiffReport) {
        print!("{}", Self::render_report(report));
    }

    pub fn render_report(report: &DiffReport) -> String {
        let mut out = String::new();
        for table in report.mismatched() {
            Self::render_table(&mut out, table, &report.file1, &report.file2);
        }
        out
    }

    fn render_table(out: &mut String, table: &TableReport, file1: &str, file2: &str) {
        out.push_str(&format!("{} mismatched between files\n", table.table));
        render_section(
            out,
            &format!("Columns only in '{}'", file1),
            &table.diff.only_in_first,
        );
        render_section(
            out,
            &format!("Columns only in '{}'", file2),
            &table.diff.only_in_second,
        );
        render_section(out, "Columns with different content", &table.diff.differing);
        out.push('\n');
    }

    /// Print an error with its kind and cause chain to stderr
    pub fn print_error(error: &ColdiffError) {
        eprint!("{}", Self::render_error(error));
    }

    pub fn render_error(error: &ColdiffError) -> String {
        let mut out = format!("[{}] : {}\n", error.kind(), error);
        let mut cause = error.source();
        while let Some(e) = cause {
            out.push_str(&format!("  caused by: {}\n", e));
            cause = e.source();
        }
        out
    }
}

fn render_section(out: &mut String, title: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    out.push_str(&format!("== {} ==\n", title));
    for name in names {
        out.push_str(name);
        out.push('\n');
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format_report(report: &DiffReport) -> Result<String> {
        let json = serde_json::json!({
            "version": crate::FORMAT_VERSION,
            "generated": chrono::Utc::now(),
            "status": report.status(),
            "file1": report.file1,
            "file2": report.file2,
            "tables": report.tables,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}
