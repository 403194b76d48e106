//! Error types for mdnotes-core

use thiserror::Error;

/// Result type alias using mdnotes-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mdnotes-core operations
///
/// Only the storage layer produces these. [`crate::StorageManager`] logs and
/// absorbs them so the note engine never sees a failure.
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (malformed persisted JSON)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key-value store refused a value larger than its quota
    #[error("Storage quota exceeded: {size} bytes (limit {limit})")]
    QuotaExceeded { size: usize, limit: usize },

    /// Database schema is newer than this build understands
    #[error("Database schema version {found} is newer than supported version {supported}")]
    VersionConflict { found: i32, supported: i32 },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
