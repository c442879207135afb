//! Error types for the state store

use thiserror::Error;

/// Result type for state store operations
pub type Result<T> = std::result::Result<T, Error>;

/// State store errors
#[derive(Error, Debug)]
pub enum Error {
    /// Collection name is not usable as a file name
    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
