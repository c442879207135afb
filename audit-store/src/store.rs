//! Persisted scan results

use crate::{error::Result, types::AuditResults};
use state_store::StateStore;
use std::sync::Arc;

/// Fixed collection name for scan results
pub const COLLECTION_AUDIT: &str = "audit_results";

/// Audit result store
pub struct AuditStore {
    store: Arc<dyn StateStore>,
}

impl AuditStore {
    /// Create store over a persistence backend
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Load the latest scan results, if a scan has been persisted
    pub fn results(&self) -> Result<Option<AuditResults>> {
        match self.store.read(COLLECTION_AUDIT)? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Persist scan results, replacing any previous scan
    pub fn save_results(&self, results: &AuditResults) -> Result<()> {
        let payload = serde_json::to_string(results)?;
        self.store.write(COLLECTION_AUDIT, &payload)?;

        tracing::info!(
            source = %results.source_file,
            findings = results.findings.len(),
            aggregates = results.aggregates.len(),
            "Saved audit results"
        );
        Ok(())
    }

    /// Drop persisted results
    pub fn clear(&self) -> Result<()> {
        self.store.remove(COLLECTION_AUDIT)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuditSummary, CurrencyAggregate};
    use chrono::Utc;
    use custody_core::Currency;
    use rust_decimal::Decimal;
    use state_store::MemoryStore;

    fn results() -> AuditResults {
        AuditResults {
            source_file: "DTC1B".to_string(),
            file_hash: "cd".repeat(32),
            aggregates: vec![CurrencyAggregate::empty(Currency::USD)],
            findings: vec![],
            summary: AuditSummary {
                total_equiv_usd: Decimal::ZERO,
                finding_count: 0,
                scanned_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_results_roundtrip() {
        let store = AuditStore::new(Arc::new(MemoryStore::new()));
        assert!(store.results().unwrap().is_none());

        store.save_results(&results()).unwrap();
        let loaded = store.results().unwrap().unwrap();
        assert_eq!(loaded.source_file, "DTC1B");
        assert_eq!(loaded.aggregates.len(), 1);

        store.clear().unwrap();
        assert!(store.results().unwrap().is_none());
    }
}
