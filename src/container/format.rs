//! On-disk layout of coldiff container files
//!
//! ```text
//! "CDIF" | version u16 | reserved u16
//! chunk blocks (key header + payload) ...
//! directory (JSON)
//! directory offset u64 | directory length u64 | "CDIF"
//! ```
//!
//! All integers are little endian.

use crate::error::{ColdiffError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const MAGIC: &[u8; 4] = b"CDIF";
pub const CHUNK_MAGIC: &[u8; 4] = b"CHNK";
pub const LAYOUT_VERSION: u16 = 1;
pub const PREAMBLE_LEN: u64 = 8;
pub const TRAILER_LEN: u64 = 20;

/// Location of one chunk block inside a container file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDescriptor {
    pub on_disk_offset: u64,
    pub on_disk_length: u64,
    pub header_length: u64,
    pub uncompressed_length: u64,
}

impl ChunkDescriptor {
    pub fn payload_offset(&self) -> u64 {
        self.on_disk_offset + self.header_length
    }

    pub fn payload_length(&self) -> u64 {
        self.on_disk_length.saturating_sub(self.header_length)
    }
}

/// A node in a table's schema tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub name: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SchemaNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chunks: Vec<ChunkDescriptor>,
}

impl SchemaNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A named table and its top-level schema nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub name: String,
    pub entries: u64,
    pub branches: Vec<SchemaNode>,
}

/// Table directory stored at the end of the file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Directory {
    pub format_version: String,
    pub tables: IndexMap<String, TableEntry>,
}

/// Header written in front of every chunk payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHeader {
    pub payload_length: u32,
    pub uncompressed_length: u32,
    pub column: String,
}

impl KeyHeader {
    const FIXED_LEN: usize = 4 + 2 + 4 + 4 + 2;

    pub fn encoded_len(&self) -> usize {
        Self::FIXED_LEN + self.column.len()
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let name_len = u16::try_from(self.column.len()).map_err(|_| {
            ColdiffError::invalid_input(format!("Column name too long: {}", self.column))
        })?;
        let header_len = u16::try_from(self.encoded_len()).map_err(|_| {
            ColdiffError::invalid_input(format!("Column name too long: {}", self.column))
        })?;

        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(CHUNK_MAGIC);
        buf.extend_from_slice(&header_len.to_le_bytes());
        buf.extend_from_slice(&self.payload_length.to_le_bytes());
        buf.extend_from_slice(&self.uncompressed_length.to_le_bytes());
        buf.extend_from_slice(&name_len.to_le_bytes());
        buf.extend_from_slice(self.column.as_bytes());
        Ok(buf)
    }
}

pub fn encode_preamble() -> [u8; PREAMBLE_LEN as usize] {
    let v = LAYOUT_VERSION.to_le_bytes();
    [MAGIC[0], MAGIC[1], MAGIC[2], MAGIC[3], v[0], v[1], 0, 0]
}

pub fn check_preamble(bytes: &[u8]) -> Result<u16> {
    if bytes.len() < PREAMBLE_LEN as usize || &bytes[..4] != MAGIC {
        return Err(ColdiffError::format("missing file magic"));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != LAYOUT_VERSION {
        return Err(ColdiffError::format(format!(
            "unsupported layout version {}",
            version
        )));
    }
    Ok(version)
}

pub fn encode_trailer(directory_offset: u64, directory_length: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(TRAILER_LEN as usize);
    buf.extend_from_slice(&directory_offset.to_le_bytes());
    buf.extend_from_slice(&directory_length.to_le_bytes());
    buf.extend_from_slice(MAGIC);
    buf
}

/// Returns `(directory_offset, directory_length)`
pub fn decode_trailer(bytes: &[u8]) -> Result<(u64, u64)> {
    if bytes.len() != TRAILER_LEN as usize || &bytes[16..] != MAGIC {
        return Err(ColdiffError::format("missing trailer magic"));
    }
    let mut offset = [0u8; 8];
    let mut length = [0u8; 8];
    offset.copy_from_slice(&bytes[..8]);
    length.copy_from_slice(&bytes[8..16]);
    Ok((u64::from_le_bytes(offset), u64::from_le_bytes(length)))
}
