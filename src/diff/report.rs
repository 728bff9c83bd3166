//! Diff results and the overall comparison status

use serde::Serialize;

/// Outcome of comparing one table across two files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableDiff {
    /// Columns present only in the first file
    pub only_in_first: Vec<String>,
    /// Columns present only in the second file
    pub only_in_second: Vec<String>,
    /// Columns present in both files with different content
    pub differing: Vec<String>,
}

impl TableDiff {
    pub fn is_match(&self) -> bool {
        self.only_in_first.is_empty() && self.only_in_second.is_empty() && self.differing.is_empty()
    }

    /// The same diff seen from the other file
    pub fn swapped(&self) -> Self {
        Self {
            only_in_first: self.only_in_second.clone(),
            only_in_second: self.only_in_first.clone(),
            differing: self.differing.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: String,
    #[serde(flatten)]
    pub diff: TableDiff,
}

/// Aggregated outcome across every requested table
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiffReport {
    pub file1: String,
    pub file2: String,
    pub tables: Vec<TableReport>,
}

impl DiffReport {
    pub fn new(file1: impl Into<String>, file2: impl Into<String>) -> Self {
        Self {
            file1: file1.into(),
            file2: file2.into(),
            tables: Vec::new(),
        }
    }

    pub fn push(&mut self, table: impl Into<String>, diff: TableDiff) {
        self.tables.push(TableReport {
            table: table.into(),
            diff,
        });
    }

    pub fn mismatched(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|t| !t.diff.is_match())
    }

    pub fn table(&self, name: &str) -> Option<&TableDiff> {
        self.tables.iter().find(|t| t.table == name).map(|t| &t.diff)
    }

    pub fn status(&self) -> Status {
        if self.mismatched().next().is_some() {
            Status::Mismatch
        } else {
            Status::Match
        }
    }
}

/// Three-valued result of a comparison run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Match,
    Mismatch,
    FailedToRun,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Match => crate::EXIT_MATCH,
            Self::Mismatch => crate::EXIT_MISMATCH,
            Self::FailedToRun => crate::EXIT_FAILED_TO_RUN,
        }
    }
}
