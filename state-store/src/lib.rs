//! Custodia State Store
//!
//! Named JSON collections behind an injected repository trait.
//!
//! # Architecture
//!
//! - **Single namespace**: collections are keyed by fixed string names
//! - **Whole-document writes**: each collection is one JSON payload,
//!   replaced atomically on every save
//! - **No coordination**: one process, one writer; there is no guard
//!   against two processes racing on the same data directory

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod error;
pub mod store;

// Re-exports
pub use error::{Error, Result};
pub use store::{JsonFileStore, MemoryStore, StateStore};
