//! # coldiff
//!
//! A chunk-level diff tool for columnar container files. Two files that are
//! expected to be identical (for example the output of a pipeline before and
//! after a code change) are compared table by table and column by column,
//! directly on their serialized chunks, without decoding any records.

pub mod cli;
pub mod commands;
pub mod config;
pub mod container;
pub mod diff;
pub mod error;
pub mod output;
pub mod progress;

pub use container::{ColumnarFile, ContainerFile, ContainerWriter, TableBuilder, WriterOptions};
pub use diff::{compare, diff_files, CompareOptions, DiffReport, Status, Table, TableDiff};
pub use error::{ColdiffError, Result};

/// Current format version for coldiff files and reports
pub const FORMAT_VERSION: &str = "1.0.0";

/// Deepest schema nesting accepted when flattening a table
pub const MAX_SCHEMA_DEPTH: usize = 64;

/// Default compression level for written chunks
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 3;

/// Exit status when every table matched
pub const EXIT_MATCH: i32 = 0;

/// Exit status when at least one table mismatched
pub const EXIT_MISMATCH: i32 = 1;

/// Exit status when the comparison could not be carried out
pub const EXIT_FAILED_TO_RUN: i32 = 127;
