//! Plain-text receipts and history export

use crate::{types::Transfer, Result};
use chrono::Utc;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Renders and writes transfer receipts
pub struct ReceiptWriter {
    receipt_dir: PathBuf,
}

impl ReceiptWriter {
    /// Create a writer targeting `receipt_dir`
    pub fn new(receipt_dir: impl Into<PathBuf>) -> Self {
        Self {
            receipt_dir: receipt_dir.into(),
        }
    }

    /// Render one transfer as a human-readable receipt
    pub fn render(&self, transfer: &Transfer) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Transfer {}", transfer.status);
        let _ = writeln!(out);
        let _ = writeln!(out, "=== TRANSFER DETAILS ===");
        let _ = writeln!(out, "Transfer ID: {}", transfer.transfer_request_id);
        let _ = writeln!(out, "ISO 20022 Message ID: {}", transfer.iso20022.message_id);
        let _ = writeln!(out, "Date/Time: {}", transfer.datetime.to_rfc3339());
        let _ = writeln!(
            out,
            "Amount: {} {:.2}",
            transfer.receiving_currency, transfer.amount
        );
        let _ = writeln!(out, "Description: {}", transfer.description);
        let _ = writeln!(out);

        let _ = writeln!(out, "=== FROM ===");
        let _ = writeln!(out, "Name: {}", transfer.sending_name);
        let _ = writeln!(out, "Account: {}", transfer.sending_account);
        let _ = writeln!(out, "Institution: {}", transfer.sending_institution);
        let _ = writeln!(out, "Website: {}", transfer.sending_institution_website);
        let _ = writeln!(out, "Currency: {}", transfer.sending_currency);
        let _ = writeln!(out);

        let _ = writeln!(out, "=== TO ===");
        let _ = writeln!(out, "Name: {}", transfer.receiving_name);
        let _ = writeln!(out, "Account: {}", transfer.receiving_account);
        let _ = writeln!(out, "Institution: {}", transfer.receiving_institution);
        let _ = writeln!(out, "Currency: {}", transfer.receiving_currency);
        let _ = writeln!(out);

        let coverage = &transfer.m2_validation;
        let _ = writeln!(out, "=== M2 COVERAGE ===");
        let _ = writeln!(out, "Source: {}", coverage.source);
        let _ = writeln!(
            out,
            "Balance Before: {} {:.3}",
            transfer.sending_currency, coverage.balance_before
        );
        let _ = writeln!(
            out,
            "Balance After: {} {:.3}",
            transfer.sending_currency, coverage.balance_after
        );
        let _ = writeln!(out, "Attestations: {}", coverage.attestation_count);
        let _ = writeln!(
            out,
            "Attestations Verified: {}",
            if coverage.attestations_verified { "YES" } else { "NO" }
        );

        let attestations = &transfer.iso20022.payment_instruction.attestations;
        if !attestations.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "=== EVIDENCE ATTESTATIONS ===");
            for (index, attestation) in attestations.iter().enumerate() {
                let _ = writeln!(out);
                let _ = writeln!(out, "[Attestation {}]", index + 1);
                let _ = writeln!(out, "Signature: {}", abbreviate(&attestation.signature, 64));
                let _ = writeln!(out, "Method: {}", attestation.method);
                let _ = writeln!(out, "Digest: {}", attestation.digest_value);
                let _ = writeln!(out, "Attestor: {}", attestation.attestor);
                let _ = writeln!(out, "Serial: {}", attestation.serial);
                let _ = writeln!(out, "Signed At: {}", attestation.signed_at.to_rfc3339());
                let _ = writeln!(
                    out,
                    "Verified: {}",
                    if attestation.verified { "YES" } else { "NO" }
                );
                let _ = writeln!(
                    out,
                    "Source File Hash: {}",
                    abbreviate(&attestation.source.file_hash, 32)
                );
                let _ = writeln!(
                    out,
                    "Source Block Hash: {}",
                    abbreviate(&attestation.source.block_hash, 32)
                );
                let _ = writeln!(out, "Source Offset: {}", attestation.source.offset);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "=== ISO 20022 COMPLIANCE ===");
        let _ = writeln!(out, "Standard: pain.001.001.09 (Customer Credit Transfer)");
        let _ = writeln!(out, "Classification: M2 Money Supply");
        let _ = writeln!(
            out,
            "XML Generated: {}",
            if transfer.iso20022.xml_generated { "YES" } else { "NO" }
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "=== STATUS ===");
        let _ = writeln!(out, "Status: {}", transfer.status);
        if let Some(message) = response_message(transfer) {
            let _ = writeln!(out, "API Response: {}", message);
        }

        out
    }

    /// Write `Transfer_<request id>.txt` into the receipt directory
    pub fn write(&self, transfer: &Transfer) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.receipt_dir)?;

        let filename = format!("Transfer_{}.txt", transfer.transfer_request_id);
        let filepath = self.receipt_dir.join(&filename);
        std::fs::write(&filepath, self.render(transfer))?;

        tracing::info!("Wrote transfer receipt: {}", filename);
        Ok(filepath)
    }

    /// Export the full history as one text file, newest first
    pub fn export_history(&self, transfers: &[Transfer]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.receipt_dir)?;

        let mut out = String::new();
        let _ = writeln!(out, "TRANSFER HISTORY EXPORT");
        let _ = writeln!(out, "Exported At: {}", Utc::now().to_rfc3339());
        let _ = writeln!(out, "Transfers: {}", transfers.len());

        for transfer in transfers {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", "=".repeat(60));
            let _ = writeln!(out);
            out.push_str(&self.render(transfer));
        }

        let filename = format!(
            "API_GLOBAL_Transfers_{}.txt",
            Utc::now().format("%Y-%m-%d")
        );
        let filepath = self.receipt_dir.join(&filename);
        std::fs::write(&filepath, out)?;

        tracing::info!(count = transfers.len(), "Exported transfer history");
        Ok(filepath)
    }

    /// Directory receipts are written to
    pub fn dir(&self) -> &Path {
        &self.receipt_dir
    }
}

// Ellipsis only when something was actually cut off
fn abbreviate(s: &str, max: usize) -> String {
    if s.len() > max {
        format!("{}...", &s[..max])
    } else {
        s.to_string()
    }
}

fn response_message(transfer: &Transfer) -> Option<&str> {
    let response = transfer.response.as_ref()?;
    response
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| {
            response
                .get("data")?
                .get("updates")?
                .get(0)?
                .get("message")?
                .as_str()
        })
}
