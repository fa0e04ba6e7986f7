//! Error types for rowdiff-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rowdiff-core
#[derive(Debug, Error)]
pub enum Error {
    /// The two tables do not have the same number of columns
    #[error("schema mismatch: left table has {left} columns, right table has {right}")]
    SchemaMismatch { left: usize, right: usize },

    /// An excluded column index is outside the table
    #[error("excluded column index {index} is out of range for {column_count} columns")]
    InvalidExcludedColumn { index: usize, column_count: usize },

    /// An excluded column name is not in the header
    #[error("excluded column '{0}' not found in header")]
    UnknownColumn(String),

    /// Headers have the same width but different names
    #[error("header mismatch at column {index}: '{left}' vs '{right}'")]
    HeaderMismatch {
        index: usize,
        left: String,
        right: String,
    },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse CSV
    #[error("failed to parse CSV '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors caused by the diff configuration rather than by I/O
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::SchemaMismatch { .. }
                | Error::InvalidExcludedColumn { .. }
                | Error::UnknownColumn(_)
                | Error::HeaderMismatch { .. }
        )
    }
}
