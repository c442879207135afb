//! Error types for the transfer engine

use thiserror::Error;

/// Result type for transfer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Transfer engine errors
#[derive(Error, Debug)]
pub enum Error {
    /// Precondition failure, surfaced to the user verbatim
    #[error("{0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Webhook transport error
    #[error("Webhook error: {0}")]
    Webhook(String),

    /// Custody account error
    #[error("Custody error: {0}")]
    Custody(#[from] custody_core::Error),

    /// Audit store error
    #[error("Audit error: {0}")]
    Audit(#[from] audit_store::Error),

    /// ISO 20022 error
    #[error("ISO 20022 error: {0}")]
    Iso20022(#[from] iso20022::Error),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] state_store::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
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
