use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level '{id}' has no persisted document at {path}")]
    NotFound { id: String, path: PathBuf },
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("grid row {row} has {actual} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("invalid level identifier '{0}': expected a non-empty file stem")]
    InvalidIdentifier(String),
    #[error("failed to read level document {path}: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write level document {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LevelError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LevelError::NotFound { .. })
    }
}
