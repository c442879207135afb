//! Custodia Custody Core
//!
//! Custody account records and balance bookkeeping.
//!
//! # Invariants
//!
//! - `available_balance >= 0` after any mutation
//! - A completed transfer moves exactly its amount from available to
//!   reserved; `available + reserved` is conserved by the move
//! - Accounts are created by provisioning and never deleted here

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod accounts;
pub mod error;
pub mod types;

// Re-exports
pub use accounts::CustodyStore;
pub use error::{Error, Result};
pub use types::{AccountId, Currency, CustodyAccount};
