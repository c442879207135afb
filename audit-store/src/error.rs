//! Error types for the audit store

use thiserror::Error;

/// Result type for audit store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Audit store errors
#[derive(Error, Debug)]
pub enum Error {
    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] state_store::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
