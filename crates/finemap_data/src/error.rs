//! Error types for finemap_data.

use thiserror::Error;

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading inputs or writing outputs.
#[derive(Error, Debug)]
pub enum DataError {
    /// Malformed line in an interaction table.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Number of interaction records does not match the data tensor.
    #[error("Interaction count mismatch: {records} records but data tensor holds {tensor} interactions")]
    CountMismatch {
        /// Records read from the interaction table.
        records: usize,
        /// Interactions along the first axis of the data tensor.
        tensor: usize,
    },

    /// Invalid data shape.
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// File format error.
    #[error("File format error: {0}")]
    FormatError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core error.
    #[error("Core error: {0}")]
    CoreError(#[from] finemap_core::CoreError),
}
