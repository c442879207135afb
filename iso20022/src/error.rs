//! Error types for ISO 20022 message construction

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ISO 20022 operations
pub type Result<T> = std::result::Result<T, Error>;

/// ISO 20022 errors
#[derive(Error, Debug)]
pub enum Error {
    /// No scan has been run yet
    #[error("No audit data available. Process a DTC1B file in the audit module first.")]
    NoAuditData,

    /// The matched aggregate carries no M2 funds
    #[error("No M2 funds found in scan data for {currency}")]
    NoM2Funds {
        /// Currency that was looked up
        currency: String,
    },

    /// Instruction amount exceeds the extracted M2 figure
    #[error("Insufficient M2 coverage: requested {requested}, available {available} {currency}")]
    InsufficientCoverage {
        /// Requested transfer amount
        requested: Decimal,
        /// Extracted M2 total
        available: Decimal,
        /// Currency of the M2 figure
        currency: String,
    },

    /// Signing or verification failure
    #[error("Attestation error: {0}")]
    Attestation(String),

    /// XML serialization failure
    #[error("XML error: {0}")]
    Xml(String),

    /// Audit store error
    #[error("Audit store error: {0}")]
    Audit(#[from] audit_store::Error),

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
