//! Scanner output model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency code (ISO 4217)
pub type Currency = custody_core::Currency;

/// Monetary-aggregate tier label assigned by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonetaryTier {
    /// Tier M0
    M0,
    /// Tier M1
    M1,
    /// Tier M2
    M2,
    /// Tier M3
    M3,
    /// Tier M4
    M4,
}

/// Per-currency rollup of scanned balances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyAggregate {
    /// Currency of the rollup
    pub currency: Currency,

    /// M0 total
    pub m0: Decimal,

    /// M1 total
    pub m1: Decimal,

    /// M2 total
    pub m2: Decimal,

    /// M3 total
    pub m3: Decimal,

    /// M4 total
    pub m4: Decimal,

    /// USD-equivalent of all tiers
    pub equiv_usd: Decimal,
}

impl CurrencyAggregate {
    /// Zeroed aggregate for a currency
    pub fn empty(currency: Currency) -> Self {
        Self {
            currency,
            m0: Decimal::ZERO,
            m1: Decimal::ZERO,
            m2: Decimal::ZERO,
            m3: Decimal::ZERO,
            m4: Decimal::ZERO,
            equiv_usd: Decimal::ZERO,
        }
    }

    /// Total of a single tier
    pub fn tier(&self, tier: MonetaryTier) -> Decimal {
        match tier {
            MonetaryTier::M0 => self.m0,
            MonetaryTier::M1 => self.m1,
            MonetaryTier::M2 => self.m2,
            MonetaryTier::M3 => self.m3,
            MonetaryTier::M4 => self.m4,
        }
    }

    /// Sum of all tiers
    pub fn total(&self) -> Decimal {
        self.m0 + self.m1 + self.m2 + self.m3 + self.m4
    }
}

/// Byte-level provenance the scanner captured for one finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvidence {
    /// SHA-256 of the scanned file
    pub file_hash: String,

    /// SHA-256 of the block containing the finding
    pub block_hash: String,

    /// Byte offset of the block in the file
    pub source_offset: u64,

    /// Raw block bytes, hex encoded
    pub raw_hex: String,

    /// Scanner-assigned verification code
    pub verification_code: String,

    /// When the evidence was captured
    pub captured_at: DateTime<Utc>,

    /// Whether the scanner's checksum matched on capture
    pub checksum_verified: bool,
}

/// One currency-block finding from the scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditFinding {
    /// Finding ID
    pub id: Uuid,

    /// Currency of the parsed amount
    pub currency: Currency,

    /// Parsed amount
    pub amount: Decimal,

    /// Tier label assigned by the scanner
    pub tier: MonetaryTier,

    /// Provenance, when the scanner captured it
    pub evidence: Option<ScanEvidence>,
}

/// Scan-level summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSummary {
    /// USD-equivalent across all aggregates
    pub total_equiv_usd: Decimal,

    /// Number of findings
    pub finding_count: usize,

    /// When the scan finished
    pub scanned_at: DateTime<Utc>,
}

/// Complete result of one file scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResults {
    /// Name of the scanned file
    pub source_file: String,

    /// SHA-256 of the scanned file
    pub file_hash: String,

    /// Per-currency rollups
    pub aggregates: Vec<CurrencyAggregate>,

    /// Per-finding evidence
    pub findings: Vec<AuditFinding>,

    /// Scan summary
    pub summary: AuditSummary,
}

impl AuditResults {
    /// Aggregate for a currency, if the scan produced one
    pub fn aggregate(&self, currency: Currency) -> Option<&CurrencyAggregate> {
        self.aggregates.iter().find(|a| a.currency == currency)
    }

    /// Findings carrying a given tier label
    pub fn findings_for_tier(&self, tier: MonetaryTier) -> impl Iterator<Item = &AuditFinding> {
        self.findings.iter().filter(move |f| f.tier == tier)
    }
}
