//! The column-diff engine
//!
//! [`Table`] flattens a table's schema into leaf [`Column`]s and diffs two
//! tables column by column; [`compare`] drives that over several tables of
//! two files and produces a [`DiffReport`].

pub mod column;
pub mod compare;
pub mod report;
pub mod table;

pub use column::Column;
pub use compare::{compare, diff_files, diff_open_files, CompareOptions};
pub use report::{DiffReport, Status, TableDiff, TableReport};
pub use table::Table;
