//! Custodia Audit Store
//!
//! Holds the output of a flat-file scan: per-finding evidence and
//! per-currency monetary aggregates (M0-M4).
//!
//! The scanner that produces these results is a separate tool; this crate
//! is the read-mostly boundary other components consume. Aggregates are
//! labels assigned by the scanner, not a liquidity classification computed
//! here.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod error;
pub mod store;
pub mod types;

// Re-exports
pub use error::{Error, Result};
pub use store::AuditStore;
pub use types::{
    AuditFinding, AuditResults, AuditSummary, CurrencyAggregate, MonetaryTier, ScanEvidence,
};
