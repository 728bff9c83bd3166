//! Block codec for chunk payloads
//!
//! A compressed payload is a sequence of blocks. Every block starts with a
//! 9-byte header:
//!
//! | bytes | meaning                                   |
//! |-------|-------------------------------------------|
//! | 0..2  | algorithm tag (`ZS` zstd, `ZL` zlib)      |
//! | 2     | method byte (the compression level used)  |
//! | 3..6  | compressed block size, little endian      |
//! | 6..9  | uncompressed block size, little endian    |
//!
//! Both sizes are 24-bit, so a single block never covers more than
//! [`MAX_BLOCK_SIZE`] bytes of input; larger chunks are split.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::ops::Range;
use thiserror::Error;

/// Size of the header prefixed to every compressed block
pub const HEADER_SIZE: usize = 9;

/// Largest block size representable in the 24-bit header fields
pub const MAX_BLOCK_SIZE: usize = 0xFF_FFFF;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("truncated block header: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("unknown compression algorithm tag {0:?}")]
    UnknownAlgorithm([u8; 2]),

    #[error("{algorithm} stream is corrupt: {message}")]
    Corrupt {
        algorithm: Algorithm,
        message: String,
    },

    #[error("decompressed length {actual} disagrees with declared length {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("decompression produced no data")]
    Empty,

    #[error("compressed block of {0} bytes does not fit in a block header")]
    BlockTooLarge(usize),
}

/// Compression algorithms understood by the block codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Zstd,
    Zlib,
}

impl Algorithm {
    pub fn tag(self) -> [u8; 2] {
        match self {
            Self::Zstd => *b"ZS",
            Self::Zlib => *b"ZL",
        }
    }

    pub fn from_tag(tag: [u8; 2]) -> Option<Self> {
        match &tag {
            b"ZS" => Some(Self::Zstd),
            b"ZL" => Some(Self::Zlib),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "zstd" => Ok(Self::Zstd),
            "zlib" => Ok(Self::Zlib),
            _ => Err(format!("Invalid compression algorithm: {}. Use 'zstd' or 'zlib'", s)),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zstd => write!(f, "zstd"),
            Self::Zlib => write!(f, "zlib"),
        }
    }
}

/// Parsed form of a block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub algorithm: Algorithm,
    pub method: u8,
    pub compressed_len: usize,
    pub uncompressed_len: usize,
}

impl BlockHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < HEADER_SIZE {
            return Err(CodecError::Truncated {
                needed: HEADER_SIZE,
                available: bytes.len(),
            });
        }

        let tag = [bytes[0], bytes[1]];
        let algorithm = Algorithm::from_tag(tag).ok_or(CodecError::UnknownAlgorithm(tag))?;

        Ok(Self {
            algorithm,
            method: bytes[2],
            compressed_len: read_u24(&bytes[3..6]),
            uncompressed_len: read_u24(&bytes[6..9]),
        })
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let tag = self.algorithm.tag();
        let c = self.compressed_len;
        let u = self.uncompressed_len;
        [
            tag[0],
            tag[1],
            self.method,
            c as u8,
            (c >> 8) as u8,
            (c >> 16) as u8,
            u as u8,
            (u >> 8) as u8,
            (u >> 16) as u8,
        ]
    }
}

fn read_u24(bytes: &[u8]) -> usize {
    bytes[0] as usize | (bytes[1] as usize) << 8 | (bytes[2] as usize) << 16
}

/// Compress `data` into a sequence of headed blocks.
///
/// `level` is passed to the underlying codec (clamped to 9 for zlib) and
/// recorded in each header's method byte.
pub fn compress(algorithm: Algorithm, level: u32, data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(data.len() / 2 + HEADER_SIZE);

    for block in data.chunks(MAX_BLOCK_SIZE) {
        let packed = encode_block(algorithm, level, block)?;
        if packed.len() > MAX_BLOCK_SIZE {
            return Err(CodecError::BlockTooLarge(packed.len()));
        }

        let header = BlockHeader {
            algorithm,
            method: level.min(u8::MAX as u32) as u8,
            compressed_len: packed.len(),
            uncompressed_len: block.len(),
        };
        out.extend_from_slice(&header.encode());
        out.extend_from_slice(&packed);
    }

    Ok(out)
}

/// Decompress a headed payload whose total decoded size is `declared_len`.
///
/// Every byte of `raw` must belong to a block, and the block headers must
/// account for exactly `declared_len` bytes before anything is decoded.
pub fn decompress(raw: &[u8], declared_len: usize) -> Result<Vec<u8>, CodecError> {
    let blocks = scan_blocks(raw)?;

    let total = blocks
        .iter()
        .try_fold(0usize, |sum, (header, _)| sum.checked_add(header.uncompressed_len))
        .unwrap_or(usize::MAX);
    if total == 0 {
        return Err(CodecError::Empty);
    }
    if total != declared_len {
        return Err(CodecError::LengthMismatch {
            expected: declared_len,
            actual: total,
        });
    }

    let mut out = Vec::with_capacity(total);
    for (header, range) in blocks {
        let block = decode_block(&header, &raw[range])?;
        if block.len() != header.uncompressed_len {
            return Err(CodecError::LengthMismatch {
                expected: header.uncompressed_len,
                actual: block.len(),
            });
        }
        out.extend_from_slice(&block);
    }

    Ok(out)
}

/// Walk the block headers of `raw`, returning each header with its payload range
fn scan_blocks(raw: &[u8]) -> Result<Vec<(BlockHeader, Range<usize>)>, CodecError> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos < raw.len() {
        let header = BlockHeader::parse(&raw[pos..])?;
        let start = pos + HEADER_SIZE;
        let end = start + header.compressed_len;
        if end > raw.len() {
            return Err(CodecError::Truncated {
                needed: end - pos,
                available: raw.len() - pos,
            });
        }
        blocks.push((header, start..end));
        pos = end;
    }

    Ok(blocks)
}

fn encode_block(algorithm: Algorithm, level: u32, block: &[u8]) -> Result<Vec<u8>, CodecError> {
    let corrupt = |e: std::io::Error| CodecError::Corrupt {
        algorithm,
        message: e.to_string(),
    };

    match algorithm {
        Algorithm::Zstd => zstd::bulk::compress(block, level as i32).map_err(corrupt),
        Algorithm::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.min(9)));
            encoder.write_all(block).map_err(corrupt)?;
            encoder.finish().map_err(corrupt)
        }
    }
}

fn decode_block(header: &BlockHeader, src: &[u8]) -> Result<Vec<u8>, CodecError> {
    let algorithm = header.algorithm;
    let corrupt = |e: std::io::Error| CodecError::Corrupt {
        algorithm,
        message: e.to_string(),
    };

    match algorithm {
        Algorithm::Zstd => zstd::bulk::decompress(src, header.uncompressed_len).map_err(corrupt),
        Algorithm::Zlib => {
            let mut buf = Vec::with_capacity(header.uncompressed_len);
            // one extra byte so an oversized stream shows up as a length mismatch
            ZlibDecoder::new(src)
                .take(header.uncompressed_len as u64 + 1)
                .read_to_end(&mut buf)
                .map_err(corrupt)?;
            Ok(buf)
        }
    }
}
