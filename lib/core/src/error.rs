use crate::table::ProductId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Source not found: {}", path.display())]
    MissingSource { path: PathBuf },

    #[error("Column not found: {column}")]
    SchemaMismatch { column: String },

    #[error("Non-numeric value {value:?} in column {column} at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Cannot encode {value:?} in column {column} as a binary flag")]
    InvalidFlag { column: String, value: String },

    #[error("Query row with sentinel id {0} not found")]
    SentinelNotFound(ProductId),

    #[error("Sentinel id {id} appears {count} times, expected exactly once")]
    SentinelDuplicated { id: ProductId, count: usize },

    #[error("Failed to load cluster model from {}: {reason}", path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("Failed to write {}: {reason}", path.display())]
    ArtifactWrite { path: PathBuf, reason: String },

    #[error("Invalid dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Row {row} out of range for a table of {len} rows")]
    RowOutOfRange { row: usize, len: usize },

    #[error("Table has no rows")]
    EmptyTable,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub fn missing_column(column: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            column: column.into(),
        }
    }
}
