//! Custodia transfer engine
//!
//! Orchestrates outbound transfers: validate the custody account, build
//! the pain.001 instruction, submit the `CashTransfer.v1` payload to the
//! settlement webhook, classify the outcome, apply custody bookkeeping
//! on completion, and persist the transfer to history with a plain-text
//! receipt.
//!
//! # Architecture
//!
//! ```text
//! TransferEngine::submit
//!   ├─ precondition checks (no mutation, no network on failure)
//!   ├─ iso20022::build_instruction (hard coverage check)
//!   ├─ WebhookClient::submit → WebhookOutcome
//!   ├─ CustodyStore::apply_reservation (Completed only)
//!   ├─ TransferStore::record (always)
//!   └─ ReceiptWriter::write
//! ```
//!
//! # Invariants
//!
//! - No account mutation unless the webhook accepted the transfer
//! - The transfer record is persisted regardless of outcome
//! - Transport and parse errors never panic; they become Failed records

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod engine;
pub mod error;
pub mod receipt;
pub mod store;
pub mod types;
pub mod webhook;

// Re-exports
pub use config::EngineConfig;
pub use engine::{SubmitResult, TransferEngine};
pub use error::{Error, Result};
pub use store::TransferStore;
pub use types::{Transfer, TransferForm, TransferStats, TransferStatus};
pub use webhook::{WebhookClient, WebhookOutcome};
