//! Error types for coldiff operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ColdiffError>;

#[derive(Error, Debug)]
pub enum ColdiffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File '{path}' could not be opened")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: Box<ColdiffError>,
    },

    #[error("Malformed container file: {message}")]
    Format { message: String },

    #[error("No table named '{table}' exists in file '{file}'")]
    TableNotFound { table: String, file: String },

    #[error("No chunk {index} for column '{column}'")]
    ChunkLookup { column: String, index: usize },

    #[error("Failed to read chunk {index} of column '{column}' from file '{file}'")]
    Read {
        column: String,
        index: usize,
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decompress chunk {index} of column '{column}': {message}")]
    Decompress {
        column: String,
        index: usize,
        message: String,
    },

    #[error("Schema error: {message}")]
    Schema { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl ColdiffError {
    pub fn file_open(path: impl Into<PathBuf>, source: ColdiffError) -> Self {
        Self::FileOpen {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format {
            message: msg.into(),
        }
    }

    pub fn table_not_found(table: impl Into<String>, file: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
            file: file.into(),
        }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Short, stable name of the error category
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "Io",
            Self::Json(_) => "Json",
            Self::FileOpen { .. } => "FileOpenFailure",
            Self::Format { .. } => "FormatError",
            Self::TableNotFound { .. } => "TableNotFound",
            Self::ChunkLookup { .. } => "ChunkLookupFailure",
            Self::Read { .. } => "ReadFailure",
            Self::Decompress { .. } => "DecompressFailure",
            Self::Schema { .. } => "SchemaError",
            Self::InvalidInput { .. } => "ArgumentError",
        }
    }
}
