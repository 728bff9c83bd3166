//! File-access layer for chunked columnar container files
//!
//! The diff engine only ever talks to files through [`ColumnarFile`]; the
//! [`ContainerFile`] reader is the implementation for the on-disk format
//! described in [`format`], and [`ContainerWriter`] produces such files.

pub mod compression;
pub mod format;
pub mod reader;
pub mod writer;

pub use format::{ChunkDescriptor, SchemaNode, TableEntry};
pub use reader::ContainerFile;
pub use writer::{ContainerWriter, TableBuilder, WriterOptions};

use std::io;

/// Read-only access to the tables and raw chunk bytes of one file
pub trait ColumnarFile {
    /// Name used in diagnostics (usually the path)
    fn name(&self) -> &str;

    fn table(&self, name: &str) -> Option<&TableEntry>;

    /// Read exactly `len` bytes starting at `offset`
    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>>;

    /// Hint that every chunk of `leaf` is about to be read.
    ///
    /// Returns the number of chunks the leaf has.
    fn load_chunks(&self, leaf: &SchemaNode) -> usize {
        leaf.chunks.len()
    }

    /// Hint that the chunks of `leaf` are no longer needed
    fn drop_chunks(&self, _leaf: &SchemaNode) {}
}
