//! Flattened table views and the column-level diff between two of them

use super::column::Column;
use super::report::TableDiff;
use crate::container::{ColumnarFile, SchemaNode};
use crate::error::{ColdiffError, Result};
use indicatif::ProgressBar;
use std::collections::{HashMap, HashSet};

/// A table of one file, flattened into its leaf columns
pub struct Table<'a> {
    file: &'a dyn ColumnarFile,
    name: String,
    entries: u64,
    columns: Vec<Column<'a>>,
    ignore: Vec<String>,
}

impl<'a> Table<'a> {
    /// Look up `name` in `file` and flatten its schema.
    ///
    /// Columns whose name contains any of `ignore` are skipped by [`compare`](Self::compare).
    pub fn open(file: &'a dyn ColumnarFile, name: &str, ignore: &[String]) -> Result<Self> {
        let entry = file
            .table(name)
            .ok_or_else(|| ColdiffError::table_not_found(name, file.name()))?;

        let columns = flatten(file, &entry.branches)?;
        warn_on_duplicates(name, file.name(), &columns);

        log::debug!(
            "Table '{}' in '{}': {} entries, {} column(s)",
            name,
            file.name(),
            entry.entries,
            columns.len()
        );

        Ok(Self {
            file,
            name: name.to_string(),
            entries: entry.entries,
            columns,
            ignore: ignore.to_vec(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_name(&self) -> &str {
        self.file.name()
    }

    /// Number of records
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Leaf columns in depth-first, left-to-right schema order
    pub fn columns(&self) -> &[Column<'a>] {
        &self.columns
    }

    pub fn should_ignore(&self, column: &Column<'_>) -> bool {
        self.ignore.iter().any(|s| column.name().contains(s.as_str()))
    }

    fn compared_columns(&self) -> impl Iterator<Item = &Column<'a>> {
        self.columns.iter().filter(move |c| !self.should_ignore(c))
    }

    /// Diff this table (the first file) against `other` (the second file).
    ///
    /// This table's ignore list is applied to both sides.
    pub fn compare(&self, other: &Table<'_>) -> Result<TableDiff> {
        self.compare_with_progress(other, &ProgressBar::hidden())
    }

    /// [`compare`](Self::compare), advancing `progress` once per column checked
    ///
    /// When the record counts differ every shared column is reported as
    /// differing, whatever its chunk bytes hold.
    pub fn compare_with_progress(&self, other: &Table<'_>, progress: &ProgressBar) -> Result<TableDiff> {
        let counts_differ = self.entries != other.entries;
        if counts_differ {
            log::warn!(
                "Comparing '{}' with {} entries in '{}' against {} entries in '{}'; \
                 every shared column is expected to differ",
                self.name,
                self.entries,
                self.file_name(),
                other.entries,
                other.file_name()
            );
        }

        // first occurrence wins, same as a front-to-back scan
        let mut theirs: HashMap<&str, &Column<'_>> = HashMap::new();
        for column in other.columns.iter().filter(|c| !self.should_ignore(c)) {
            theirs.entry(column.name()).or_insert(column);
        }

        let mut matched: HashSet<&str> = HashSet::new();
        let mut diff = TableDiff::default();

        for ours in self.compared_columns() {
            progress.set_message(ours.name().to_string());
            match theirs.get(ours.name()) {
                Some(their_column) => {
                    matched.insert(ours.name());
                    let same = ours.same_content(their_column)?;
                    if same && counts_differ {
                        log::debug!(
                            "Column '{}' has identical chunks but belongs to tables of different length",
                            ours.name()
                        );
                    }
                    if !same || counts_differ {
                        diff.differing.push(ours.name().to_string());
                    }
                }
                None => diff.only_in_first.push(ours.name().to_string()),
            }
            progress.inc(1);
        }

        for column in other.columns.iter().filter(|c| !self.should_ignore(c)) {
            if !matched.contains(column.name()) {
                diff.only_in_second.push(column.name().to_string());
            }
        }

        Ok(diff)
    }

    /// Number of columns [`compare`](Self::compare) will check on this side
    pub fn compared_count(&self) -> usize {
        self.compared_columns().count()
    }
}

/// Depth-first, left-to-right walk collecting every leaf
fn flatten<'a>(file: &'a dyn ColumnarFile, roots: &'a [SchemaNode]) -> Result<Vec<Column<'a>>> {
    let mut columns = Vec::new();
    let mut stack: Vec<(&'a SchemaNode, usize)> = roots.iter().rev().map(|n| (n, 1)).collect();

    while let Some((node, depth)) = stack.pop() {
        if depth > crate::MAX_SCHEMA_DEPTH {
            return Err(ColdiffError::schema(format!(
                "Schema below '{}' is nested deeper than {} levels",
                node.full_name,
                crate::MAX_SCHEMA_DEPTH
            )));
        }

        if node.is_leaf() {
            columns.push(Column::new(file, node));
        } else {
            stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        }
    }

    Ok(columns)
}

fn warn_on_duplicates(table: &str, file: &str, columns: &[Column<'_>]) {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.name()) {
            log::warn!(
                "Column name '{}' appears more than once in table '{}' of '{}'; \
                 only the first is compared",
                column.name(),
                table,
                file
            );
        }
    }
}
