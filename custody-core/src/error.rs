//! Error types for custody accounts

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for custody operations
pub type Result<T> = std::result::Result<T, Error>;

/// Custody errors
#[derive(Error, Debug)]
pub enum Error {
    /// Account not found
    #[error("Custody account not found: {0}")]
    AccountNotFound(String),

    /// Amount must be strictly positive
    #[error("Invalid amount: {0} (must be greater than 0)")]
    InvalidAmount(Decimal),

    /// Requested amount exceeds the available balance
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Available balance at the time of the check
        available: Decimal,
        /// Requested amount
        requested: Decimal,
    },

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

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
