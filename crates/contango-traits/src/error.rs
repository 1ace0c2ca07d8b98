//! Error types for store operations.

use thiserror::Error;

/// Common error type for store operations.
///
/// Store errors are propagated, not interpreted: the engine never maps them
/// onto its own error kinds beyond wrapping.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Requested record not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Record already exists; write-once stores refuse the second writer
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Internal backend error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}
