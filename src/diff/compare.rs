//! Multi-table comparison of two files

use super::report::{DiffReport, Status};
use super::table::Table;
use crate::container::{ColumnarFile, ContainerFile};
use crate::error::Result;
use crate::output::{OutputFormat, OutputManager, PrettyPrinter};
use crate::progress::ProgressReporter;
use std::path::Path;

/// What to compare and how to present it
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub tables: Vec<String>,
    pub ignore: Vec<String>,
    pub format: OutputFormat,
    pub show_progress: bool,
}

impl CompareOptions {
    pub fn new(tables: Vec<String>) -> Self {
        Self {
            tables,
            ignore: Vec::new(),
            format: OutputFormat::Pretty,
            show_progress: false,
        }
    }

    pub fn ignore(mut self, ignore: Vec<String>) -> Self {
        self.ignore = ignore;
        self
    }
}

/// Open both files and diff every requested table.
///
/// Content mismatches are collected for all tables; any error aborts the run.
pub fn diff_files(path1: &Path, path2: &Path, options: &CompareOptions) -> Result<DiffReport> {
    let file1 = ContainerFile::open(path1)?;
    let file2 = ContainerFile::open(path2)?;
    diff_open_files(&file1, &file2, options)
}

/// [`diff_files`] for already opened files
pub fn diff_open_files(
    file1: &dyn ColumnarFile,
    file2: &dyn ColumnarFile,
    options: &CompareOptions,
) -> Result<DiffReport> {
    let mut report = DiffReport::new(file1.name(), file2.name());
    let mut progress = if options.show_progress {
        ProgressReporter::new()
    } else {
        ProgressReporter::new_minimal()
    };

    for table_name in &options.tables {
        let table1 = Table::open(file1, table_name, &options.ignore)?;
        let table2 = Table::open(file2, table_name, &options.ignore)?;

        let bar = progress.start_table(table_name, table1.compared_count() as u64);
        let diff = table1.compare_with_progress(&table2, &bar)?;

        if diff.is_match() {
            log::info!("Table '{}' matches", table_name);
            progress.finish_table("matched");
        } else {
            log::info!(
                "Table '{}' mismatched: {} only in first, {} only in second, {} differing",
                table_name,
                diff.only_in_first.len(),
                diff.only_in_second.len(),
                diff.differing.len()
            );
            progress.finish_table("mismatched");
        }
        report.push(table_name.clone(), diff);
    }

    Ok(report)
}

/// Diff two files, print the outcome, and map it to a [`Status`]
pub fn compare(path1: &Path, path2: &Path, options: &CompareOptions) -> Status {
    match diff_files(path1, path2, options) {
        Ok(report) => {
            let status = report.status();
            let output = OutputManager::new(options.format.clone());
            if let Err(e) = output.output_report(&report) {
                PrettyPrinter::print_error(&e);
                return Status::FailedToRun;
            }
            status
        }
        Err(e) => {
            PrettyPrinter::print_error(&e);
            Status::FailedToRun
        }
    }
}
