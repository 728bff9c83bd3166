//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for table comparisons
#[derive(Debug)]
pub struct ProgressReporter {
    pub table_pb: Option<ProgressBar>,
    show_progress: bool,
    start_time: std::time::Instant,
}

impl ProgressReporter {
    /// Create progress reporter that draws one bar per table
    pub fn new() -> Self {
        Self {
            table_pb: None,
            show_progress: true,
            start_time: std::time::Instant::now(),
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self {
            table_pb: None,
            show_progress: false,
            start_time: std::time::Instant::now(),
        }
    }

    /// Begin a table with `columns` columns to check.
    ///
    /// Returns the bar to advance; it is hidden when progress is disabled.
    pub fn start_table(&mut self, table: &str, columns: u64) -> ProgressBar {
        self.finish_table("");
        let pb = if self.show_progress {
            create_progress_bar(columns, table)
        } else {
            ProgressBar::hidden()
        };
        self.table_pb = Some(pb.clone());
        pb
    }

    /// Finish the current table's bar
    pub fn finish_table(&mut self, message: &str) {
        if let Some(pb) = self.table_pb.take() {
            if message.is_empty() {
                pb.finish_and_clear();
            } else {
                pb.finish_with_message(message.to_string());
            }
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        // Ensure the last bar is cleaned up silently
        if let Some(pb) = self.table_pb.take() {
            pb.finish_and_clear();
        }
        log::debug!("Comparison finished in {:.2?}", self.elapsed());
    }
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>5}/{len:5} {msg}")
            .expect("Invalid progress template")
            .progress_chars("#>-"),
    );
    pb.set_prefix(prefix.to_string());
    pb
}
