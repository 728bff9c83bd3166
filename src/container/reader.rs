//! Reader for container files

use super::format::{self, Directory, SchemaNode, TableEntry, PREAMBLE_LEN, TRAILER_LEN};
use super::ColumnarFile;
use crate::error::{ColdiffError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// An open container file
///
/// Chunk payloads loaded through [`ColumnarFile::load_chunks`] are cached by
/// payload offset until the matching `drop_chunks` call.
#[derive(Debug)]
pub struct ContainerFile {
    path: PathBuf,
    display_name: String,
    directory: Directory,
    handle: Mutex<File>,
    cache: Mutex<HashMap<u64, Vec<u8>>>,
}

impl ContainerFile {
    /// Open a container file and read its table directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::open_inner(path).map_err(|e| ColdiffError::file_open(path, e))
    }

    fn open_inner(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let directory = read_directory(&mut file)?;

        log::debug!(
            "Opened '{}' with {} table(s)",
            path.display(),
            directory.tables.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            display_name: path.display().to_string(),
            directory,
            handle: Mutex::new(file),
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Table names in the order they were written
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.directory.tables.keys().map(String::as_str)
    }

    /// Number of chunk payloads currently held in memory
    pub fn cached_chunks(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn read_from_disk(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let mut file = self
            .handle
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "file handle lock poisoned"))?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl ColumnarFile for ContainerFile {
    fn name(&self) -> &str {
        &self.display_name
    }

    fn table(&self, name: &str) -> Option<&TableEntry> {
        self.directory.tables.get(name)
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        // a loaded chunk is handed out once, later reads go back to disk
        if let Ok(mut cache) = self.cache.lock() {
            if cache.get(&offset).map_or(false, |bytes| bytes.len() == len) {
                if let Some(bytes) = cache.remove(&offset) {
                    return Ok(bytes);
                }
            }
        }
        self.read_from_disk(offset, len)
    }

    fn load_chunks(&self, leaf: &SchemaNode) -> usize {
        for chunk in &leaf.chunks {
            let offset = chunk.payload_offset();
            match self.read_from_disk(offset, chunk.payload_length() as usize) {
                Ok(bytes) => {
                    if let Ok(mut cache) = self.cache.lock() {
                        cache.insert(offset, bytes);
                    }
                }
                Err(e) => {
                    // reads are retried (and reported) when the chunk is actually requested
                    log::debug!("Could not preload chunk of '{}': {}", leaf.full_name, e);
                }
            }
        }
        leaf.chunks.len()
    }

    fn drop_chunks(&self, leaf: &SchemaNode) {
        if let Ok(mut cache) = self.cache.lock() {
            for chunk in &leaf.chunks {
                cache.remove(&chunk.payload_offset());
            }
        }
    }
}

fn read_directory(file: &mut File) -> Result<Directory> {
    let file_len = file.metadata()?.len();
    if file_len < PREAMBLE_LEN + TRAILER_LEN {
        return Err(ColdiffError::format(format!(
            "file is only {} bytes long",
            file_len
        )));
    }

    let mut preamble = [0u8; PREAMBLE_LEN as usize];
    file.read_exact(&mut preamble)?;
    format::check_preamble(&preamble)?;

    let mut trailer = [0u8; TRAILER_LEN as usize];
    file.seek(SeekFrom::Start(file_len - TRAILER_LEN))?;
    file.read_exact(&mut trailer)?;
    let (offset, length) = format::decode_trailer(&trailer)?;

    let directory_end = offset.checked_add(length);
    if offset < PREAMBLE_LEN || directory_end.map_or(true, |end| end > file_len - TRAILER_LEN) {
        return Err(ColdiffError::format(format!(
            "directory range {}+{} is outside the file",
            offset, length
        )));
    }

    let mut raw = vec![0u8; length as usize];
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(&mut raw)?;

    let directory: Directory = serde_json::from_slice(&raw)?;
    check_chunk_ranges(&directory, offset)?;
    Ok(directory)
}

/// Every chunk block must lie between the preamble and `data_end`
fn check_chunk_ranges(directory: &Directory, data_end: u64) -> Result<()> {
    for table in directory.tables.values() {
        let mut stack: Vec<&SchemaNode> = table.branches.iter().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.children.iter());

            for (index, chunk) in node.chunks.iter().enumerate() {
                let end = chunk.on_disk_offset.checked_add(chunk.on_disk_length);
                if chunk.on_disk_offset < PREAMBLE_LEN || end.map_or(true, |end| end > data_end) {
                    return Err(ColdiffError::format(format!(
                        "chunk {} of '{}' in table '{}' spans {}+{}, outside the chunk area",
                        index, node.full_name, table.name, chunk.on_disk_offset, chunk.on_disk_length
                    )));
                }
                if chunk.header_length > chunk.on_disk_length {
                    return Err(ColdiffError::format(format!(
                        "chunk {} of '{}' in table '{}' has a {} byte header in a {} byte block",
                        index, node.full_name, table.name, chunk.header_length, chunk.on_disk_length
                    )));
                }
                if chunk.uncompressed_length > u64::from(u32::MAX) {
                    return Err(ColdiffError::format(format!(
                        "chunk {} of '{}' in table '{}' declares {} uncompressed bytes",
                        index, node.full_name, table.name, chunk.uncompressed_length
                    )));
                }
            }
        }
    }
    Ok(())
}
