//! Writer for container files

use super::compression::{self, Algorithm};
use super::format::{
    self, ChunkDescriptor, Directory, KeyHeader, SchemaNode, TableEntry, PREAMBLE_LEN,
};
use crate::error::{ColdiffError, Result};
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Options controlling how chunk payloads are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    pub compression: Option<Algorithm>,
    pub level: u32,
}

impl WriterOptions {
    pub fn uncompressed() -> Self {
        Self {
            compression: None,
            level: 0,
        }
    }

    pub fn compressed(algorithm: Algorithm, level: u32) -> Self {
        Self {
            compression: Some(algorithm),
            level,
        }
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self::compressed(Algorithm::Zstd, crate::DEFAULT_COMPRESSION_LEVEL)
    }
}

/// Describes one table before it is written.
///
/// Columns are given as dotted paths; intermediate schema nodes are created
/// on first use and keep first-use order.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    entries: u64,
    columns: Vec<(String, Vec<Vec<u8>>)>,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>, entries: u64) -> Self {
        Self {
            name: name.into(),
            entries,
            columns: Vec::new(),
        }
    }

    /// Add a leaf column holding the given chunk payloads
    pub fn column(mut self, path: impl Into<String>, chunks: Vec<Vec<u8>>) -> Self {
        self.columns.push((path.into(), chunks));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Default)]
struct PendingNode {
    children: IndexMap<String, PendingNode>,
    chunks: Option<Vec<Vec<u8>>>,
}

/// Streams chunk blocks to disk and writes the directory on [`finish`](Self::finish)
pub struct ContainerWriter {
    path: PathBuf,
    out: BufWriter<File>,
    offset: u64,
    options: WriterOptions,
    directory: Directory,
}

impl ContainerWriter {
    pub fn create<P: AsRef<Path>>(path: P, options: WriterOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut out = BufWriter::new(File::create(&path)?);
        out.write_all(&format::encode_preamble())?;

        Ok(Self {
            path,
            out,
            offset: PREAMBLE_LEN,
            options,
            directory: Directory {
                format_version: crate::FORMAT_VERSION.to_string(),
                tables: IndexMap::new(),
            },
        })
    }

    /// Write every chunk of `table` and record it in the directory
    pub fn write_table(&mut self, table: TableBuilder) -> Result<()> {
        if self.directory.tables.contains_key(&table.name) {
            return Err(ColdiffError::invalid_input(format!(
                "Table '{}' was already written",
                table.name
            )));
        }

        let mut roots: IndexMap<String, PendingNode> = IndexMap::new();
        for (path, chunks) in table.columns {
            insert_column(&mut roots, &path, chunks)?;
        }

        let mut branches = Vec::with_capacity(roots.len());
        for (name, node) in roots {
            branches.push(self.write_node(name.clone(), name, node)?);
        }

        log::debug!(
            "Wrote table '{}' ({} entries) to '{}'",
            table.name,
            table.entries,
            self.path.display()
        );

        self.directory.tables.insert(
            table.name.clone(),
            TableEntry {
                name: table.name,
                entries: table.entries,
                branches,
            },
        );
        Ok(())
    }

    fn write_node(&mut self, name: String, full_name: String, node: PendingNode) -> Result<SchemaNode> {
        let mut children = Vec::with_capacity(node.children.len());
        for (child_name, child) in node.children {
            let child_full = format!("{}.{}", full_name, child_name);
            children.push(self.write_node(child_name, child_full, child)?);
        }

        let mut chunks = Vec::new();
        for data in node.chunks.unwrap_or_default() {
            chunks.push(self.write_chunk(&full_name, &data)?);
        }

        Ok(SchemaNode {
            name,
            full_name,
            children,
            chunks,
        })
    }

    fn write_chunk(&mut self, column: &str, data: &[u8]) -> Result<ChunkDescriptor> {
        let payload = match self.options.compression {
            Some(algorithm) if !data.is_empty() => {
                let packed = compression::compress(algorithm, self.options.level, data)
                    .map_err(|e| {
                        ColdiffError::invalid_input(format!(
                            "Cannot compress chunk of '{}': {}",
                            column, e
                        ))
                    })?;
                // stored raw unless compression actually pays off
                if packed.len() < data.len() {
                    packed
                } else {
                    data.to_vec()
                }
            }
            _ => data.to_vec(),
        };

        let too_large = |_| {
            ColdiffError::invalid_input(format!("Chunk of '{}' exceeds 4 GiB", column))
        };
        let key = KeyHeader {
            payload_length: u32::try_from(payload.len()).map_err(too_large)?,
            uncompressed_length: u32::try_from(data.len()).map_err(too_large)?,
            column: column.to_string(),
        };
        let header = key.encode()?;

        self.out.write_all(&header)?;
        self.out.write_all(&payload)?;

        let descriptor = ChunkDescriptor {
            on_disk_offset: self.offset,
            on_disk_length: (header.len() + payload.len()) as u64,
            header_length: header.len() as u64,
            uncompressed_length: data.len() as u64,
        };
        self.offset += descriptor.on_disk_length;
        Ok(descriptor)
    }

    /// Write the directory and trailer, returning the file path
    pub fn finish(mut self) -> Result<PathBuf> {
        let directory = serde_json::to_vec(&self.directory)?;
        self.out.write_all(&directory)?;
        self.out
            .write_all(&format::encode_trailer(self.offset, directory.len() as u64))?;
        self.out.flush()?;
        Ok(self.path)
    }
}

fn insert_column(
    roots: &mut IndexMap<String, PendingNode>,
    path: &str,
    chunks: Vec<Vec<u8>>,
) -> Result<()> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ColdiffError::schema(format!("Invalid column path '{}'", path)));
    }

    let mut level = roots;
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        let node = level.entry(segment.to_string()).or_default();
        if i == last {
            if node.chunks.is_some() || !node.children.is_empty() {
                return Err(ColdiffError::schema(format!(
                    "Column '{}' is defined twice or also has sub-columns",
                    path
                )));
            }
            node.chunks = Some(chunks);
            return Ok(());
        }
        if node.chunks.is_some() {
            return Err(ColdiffError::schema(format!(
                "Column '{}' cannot be nested under a leaf",
                path
            )));
        }
        level = &mut node.children;
    }
    Ok(())
}
