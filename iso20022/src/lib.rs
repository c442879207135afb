//! Custodia ISO 20022
//!
//! Builds pain.001 (Customer Credit Transfer Initiation) payment
//! instructions from custody transfers and audit-store scan data.
//!
//! # Responsibilities
//!
//! - **M2 extraction**: pull the transferable M2 figure out of scan
//!   aggregates, with hard errors when no scan exists or M2 is zero
//! - **Evidence attestations**: Ed25519 signatures over the SHA-256
//!   digest of each qualifying finding's evidence bytes. These attest
//!   scanner provenance; they are not bank-issued certificates
//! - **Instruction construction**: pain.001 message assembly, including
//!   the strict amount-vs-M2 coverage check
//! - **Rendering**: pain.001.001.09 XML with a supplementary data block,
//!   exported to disk on demand

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod attestation;
pub mod balance;
pub mod crypto;
pub mod error;
pub mod instruction;
pub mod xml;

// Re-exports
pub use attestation::{AttestationSigner, EvidenceAttestation, EvidenceSource};
pub use balance::{extract_m2_balance, M2Balance};
pub use crypto::KeyPair;
pub use error::{Error, Result};
pub use instruction::{
    build_instruction, CoverageSnapshot, CreditTransferTransaction, InstructionParams,
    PaymentInstruction,
};
pub use xml::Pain001Generator;
