//! Persisted transfer history
//!
//! Newest-first: every new record is prepended to the collection.

use crate::{
    types::{Transfer, TransferStats, TransferStatus},
    Result,
};
use state_store::StateStore;
use std::sync::Arc;

/// Fixed collection name for the transfer history
pub const COLLECTION_TRANSFERS: &str = "api_global_transfers";

/// Transfer history store
pub struct TransferStore {
    store: Arc<dyn StateStore>,
}

impl TransferStore {
    /// Create store over a persistence backend
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Load the full history, newest first (empty if none was ever saved)
    pub fn transfers(&self) -> Result<Vec<Transfer>> {
        match self.store.read(COLLECTION_TRANSFERS)? {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => Ok(Vec::new()),
        }
    }

    /// Prepend one transfer to the history and persist
    pub fn record(&self, transfer: Transfer) -> Result<()> {
        let mut transfers = self.transfers()?;
        transfers.insert(0, transfer);

        let payload = serde_json::to_string(&transfers)?;
        self.store.write(COLLECTION_TRANSFERS, &payload)?;

        tracing::debug!(count = transfers.len(), "Recorded transfer");
        Ok(())
    }

    /// Aggregate stats over the history
    pub fn stats(&self) -> Result<TransferStats> {
        let mut stats = TransferStats::default();

        for transfer in self.transfers()? {
            match transfer.status {
                TransferStatus::Pending => stats.pending += 1,
                TransferStatus::Processing => stats.processing += 1,
                TransferStatus::Completed => {
                    stats.completed += 1;
                    stats.total_sent += transfer.amount;
                }
                TransferStatus::Failed => stats.failed += 1,
            }
        }

        Ok(stats)
    }

    /// Drop the entire history
    pub fn clear(&self) -> Result<()> {
        self.store.remove(COLLECTION_TRANSFERS)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CoverageCheck, IsoEnvelope};
    use chrono::Utc;
    use iso20022::{AttestationSigner, InstructionParams};
    use rust_decimal_macros::dec;
    use state_store::MemoryStore;

    fn transfer(id: &str, status: TransferStatus, amount: rust_decimal::Decimal) -> Transfer {
        let mut aggregate =
            audit_store::CurrencyAggregate::empty(custody_core::Currency::USD);
        aggregate.m2 = dec!(1000000);
        let results = audit_store::AuditResults {
            source_file: "DTC1B".to_string(),
            file_hash: "ab".repeat(32),
            aggregates: vec![aggregate],
            findings: vec![],
            summary: audit_store::AuditSummary {
                total_equiv_usd: dec!(1000000),
                finding_count: 0,
                scanned_at: Utc::now(),
            },
        };
        let signer = AttestationSigner::new(&[1u8; 32], "Custodia Scanner");
        let instruction = iso20022::build_instruction(
            InstructionParams {
                transfer_request_id: id.to_string(),
                amount,
                currency: "USD".to_string(),
                debtor_name: "OPERATING RESERVE".to_string(),
                debtor_account: "10010001".to_string(),
                debtor_bic: "DIGCUSXX".to_string(),
                debtor_institution: "Digital Commercial Bank Ltd".to_string(),
                creditor_name: "BENEFICIARY".to_string(),
                creditor_account: "23890111".to_string(),
                creditor_bic: "APEXCAUS".to_string(),
                creditor_institution: "APEX CAPITAL RESERVE BANK INC".to_string(),
                remittance_info: "M2 MONEY TRANSFER".to_string(),
                purpose_code: "INFR".to_string(),
            },
            Some(&results),
            &signer,
        )
        .unwrap();

        let now = Utc::now();
        Transfer {
            id: format!("TRF_{}", id),
            transfer_request_id: id.to_string(),
            sending_name: "OPERATING RESERVE".to_string(),
            sending_account: "10010001".to_string(),
            sending_institution: "Digital Commercial Bank Ltd".to_string(),
            sending_institution_website: "https://digcommbank.com/".to_string(),
            receiving_name: "BENEFICIARY".to_string(),
            receiving_account: "23890111".to_string(),
            receiving_institution: "APEX CAPITAL RESERVE BANK INC".to_string(),
            amount,
            sending_currency: "USD".to_string(),
            receiving_currency: "USD".to_string(),
            description: "M2 MONEY TRANSFER".to_string(),
            datetime: now,
            status,
            response: None,
            created_at: now,
            iso20022: IsoEnvelope {
                message_id: instruction.message_id.clone(),
                payment_instruction: instruction,
                xml_generated: false,
            },
            m2_validation: CoverageCheck {
                balance_before: dec!(1000),
                balance_after: dec!(1000),
                source: "Custody Account: OPERATING RESERVE".to_string(),
                attestation_count: 0,
                attestations_verified: false,
            },
        }
    }

    #[test]
    fn test_record_prepends() {
        let store = TransferStore::new(Arc::new(MemoryStore::new()));

        store
            .record(transfer("TXN_1", TransferStatus::Completed, dec!(100)))
            .unwrap();
        store
            .record(transfer("TXN_2", TransferStatus::Failed, dec!(200)))
            .unwrap();

        let history = store.transfers().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].transfer_request_id, "TXN_2");
        assert_eq!(history[1].transfer_request_id, "TXN_1");
    }

    #[test]
    fn test_stats_counts_only_completed_amounts() {
        let store = TransferStore::new(Arc::new(MemoryStore::new()));

        store
            .record(transfer("TXN_1", TransferStatus::Completed, dec!(100)))
            .unwrap();
        store
            .record(transfer("TXN_2", TransferStatus::Completed, dec!(50)))
            .unwrap();
        store
            .record(transfer("TXN_3", TransferStatus::Failed, dec!(999)))
            .unwrap();
        store
            .record(transfer("TXN_4", TransferStatus::Processing, dec!(10)))
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_sent, dec!(150));
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.processing, 1);
        assert_eq!(stats.pending, 0);
    }

    #[test]
    fn test_clear() {
        let store = TransferStore::new(Arc::new(MemoryStore::new()));
        store
            .record(transfer("TXN_1", TransferStatus::Completed, dec!(100)))
            .unwrap();

        store.clear().unwrap();
        assert!(store.transfers().unwrap().is_empty());
    }
}
