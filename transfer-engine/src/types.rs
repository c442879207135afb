//! Transfer domain types

use chrono::{DateTime, Utc};
use iso20022::PaymentInstruction;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transfer lifecycle status.
///
/// Set exactly once, synchronously from the webhook response at
/// submission time. There is no asynchronous status update afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// Created but not yet submitted
    Pending,
    /// Webhook returned 2xx without a recognizable verdict
    Processing,
    /// Webhook explicitly accepted the transfer
    Completed,
    /// Webhook rejected the transfer, or transport failed
    Failed,
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::Processing => "PROCESSING",
            TransferStatus::Completed => "COMPLETED",
            TransferStatus::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

/// User-supplied transfer form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferForm {
    /// Beneficiary name
    pub receiving_name: String,

    /// Beneficiary account number
    pub receiving_account: String,

    /// Beneficiary institution name
    pub receiving_institution: String,

    /// Transfer amount
    pub amount: Decimal,

    /// Receiving currency code
    pub currency: String,

    /// Free-text description, carried as remittance information
    pub description: String,

    /// ISO purpose code
    pub purpose: String,
}

/// Embedded ISO 20022 envelope of a transfer record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsoEnvelope {
    /// pain.001 message ID
    pub message_id: String,

    /// Full payment instruction as built at submission time
    pub payment_instruction: PaymentInstruction,

    /// Whether the XML rendering was exported
    pub xml_generated: bool,
}

/// Coverage snapshot recorded with each transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageCheck {
    /// Available balance before submission
    pub balance_before: Decimal,

    /// Available balance after bookkeeping (equals before unless Completed)
    pub balance_after: Decimal,

    /// Human-readable description of the balance source
    pub source: String,

    /// Number of evidence attestations attached to the instruction
    pub attestation_count: usize,

    /// Whether every attestation verified
    pub attestations_verified: bool,
}

/// One persisted transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    /// Record ID (`TRF_<unix millis>`)
    pub id: String,

    /// Request ID carried end-to-end (`TXN_<unix millis>_<suffix>`)
    pub transfer_request_id: String,

    /// Sender name
    pub sending_name: String,

    /// Sender account number
    pub sending_account: String,

    /// Sending institution name
    pub sending_institution: String,

    /// Sending institution website
    pub sending_institution_website: String,

    /// Beneficiary name
    pub receiving_name: String,

    /// Beneficiary account number
    pub receiving_account: String,

    /// Beneficiary institution name
    pub receiving_institution: String,

    /// Transfer amount
    pub amount: Decimal,

    /// Sending currency code
    pub sending_currency: String,

    /// Receiving currency code
    pub receiving_currency: String,

    /// Free-text description
    pub description: String,

    /// Submission timestamp
    pub datetime: DateTime<Utc>,

    /// Final status, set from the webhook response
    pub status: TransferStatus,

    /// Raw webhook response body, best effort
    pub response: Option<serde_json::Value>,

    /// Record creation timestamp
    pub created_at: DateTime<Utc>,

    /// Embedded ISO 20022 message
    pub iso20022: IsoEnvelope,

    /// Coverage snapshot at submission time
    pub m2_validation: CoverageCheck,
}

/// Aggregate view over the transfer history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferStats {
    /// Sum of completed transfer amounts
    pub total_sent: Decimal,

    /// Pending count
    pub pending: usize,

    /// Processing count
    pub processing: usize,

    /// Completed count
    pub completed: usize,

    /// Failed count
    pub failed: usize,
}

/// New transfer request ID: `TXN_<unix millis>_<7 uppercase alphanumerics>`
pub fn generate_request_id(now: DateTime<Utc>) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..7)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    format!("TXN_{}_{}", now.timestamp_millis(), suffix)
}

/// New record ID: `TRF_<unix millis>`
pub fn generate_record_id(now: DateTime<Utc>) -> String {
    format!("TRF_{}", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_screaming() {
        assert_eq!(
            serde_json::to_string(&TransferStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
        assert_eq!(
            serde_json::from_str::<TransferStatus>("\"FAILED\"").unwrap(),
            TransferStatus::Failed
        );
    }

    #[test]
    fn test_request_id_shape() {
        let now = Utc::now();
        let id = generate_request_id(now);

        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts[0], "TXN");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 7);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_record_id_shape() {
        let now = Utc::now();
        assert_eq!(
            generate_record_id(now),
            format!("TRF_{}", now.timestamp_millis())
        );
    }
}
