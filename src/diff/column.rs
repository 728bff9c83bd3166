//! Leaf columns and their bit-exact chunk comparison

use crate::container::compression;
use crate::container::{ColumnarFile, SchemaNode};
use crate::error::{ColdiffError, Result};
use std::io;

/// One leaf of a table's schema, borrowed from its file
#[derive(Clone, Copy)]
pub struct Column<'a> {
    file: &'a dyn ColumnarFile,
    node: &'a SchemaNode,
}

impl<'a> Column<'a> {
    pub(crate) fn new(file: &'a dyn ColumnarFile, node: &'a SchemaNode) -> Self {
        debug_assert!(node.is_leaf(), "columns wrap leaf nodes only");
        Self { file, node }
    }

    /// Fully-qualified name
    pub fn name(&self) -> &'a str {
        &self.node.full_name
    }

    pub fn chunk_count(&self) -> usize {
        self.node.chunks.len()
    }

    pub fn same_name(&self, other: &Column<'_>) -> bool {
        self.name() == other.name()
    }

    /// Compare the decoded bytes of every chunk, stopping at the first difference.
    ///
    /// A differing chunk count is a mismatch without reading any chunk.
    pub fn same_content(&self, other: &Column<'_>) -> Result<bool> {
        let ours = ChunkHint::load(self.file, self.node);
        let theirs = ChunkHint::load(other.file, other.node);

        if ours.count != theirs.count {
            log::debug!(
                "Column '{}' has {} chunk(s) here and {} in '{}'",
                self.name(),
                ours.count,
                theirs.count,
                other.file.name()
            );
            return Ok(false);
        }

        for index in 0..ours.count {
            let our_bytes = self.content(index)?;
            let their_bytes = other.content(index)?;
            if our_bytes != their_bytes {
                log::debug!("Column '{}' differs at chunk {}", self.name(), index);
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Read and, if needed, decompress one chunk
    pub fn content(&self, index: usize) -> Result<Vec<u8>> {
        let chunk = self
            .node
            .chunks
            .get(index)
            .ok_or_else(|| ColdiffError::ChunkLookup {
                column: self.name().to_string(),
                index,
            })?;

        let read_failure = |source: io::Error| ColdiffError::Read {
            column: self.name().to_string(),
            index,
            file: self.file.name().to_string(),
            source,
        };
        let decompress_failure = |message: String| ColdiffError::Decompress {
            column: self.name().to_string(),
            index,
            message,
        };

        let payload_len = usize::try_from(chunk.payload_length()).map_err(|_| {
            read_failure(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("payload of {} bytes does not fit in memory", chunk.payload_length()),
            ))
        })?;
        let raw = self
            .file
            .read_at(chunk.payload_offset(), payload_len)
            .map_err(read_failure)?;

        if chunk.uncompressed_length <= raw.len() as u64 {
            return Ok(raw);
        }

        let declared_len = usize::try_from(chunk.uncompressed_length).map_err(|_| {
            decompress_failure(format!(
                "declared length {} does not fit in memory",
                chunk.uncompressed_length
            ))
        })?;
        compression::decompress(&raw, declared_len).map_err(|e| decompress_failure(e.to_string()))
    }
}

impl std::fmt::Debug for Column<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name())
            .field("chunks", &self.chunk_count())
            .finish()
    }
}

/// Holds a load hint on one leaf and releases it when dropped
struct ChunkHint<'a> {
    file: &'a dyn ColumnarFile,
    node: &'a SchemaNode,
    count: usize,
}

impl<'a> ChunkHint<'a> {
    fn load(file: &'a dyn ColumnarFile, node: &'a SchemaNode) -> Self {
        let count = file.load_chunks(node);
        Self { file, node, count }
    }
}

impl Drop for ChunkHint<'_> {
    fn drop(&mut self) {
        self.file.drop_chunks(self.node);
    }
}
