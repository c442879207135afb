//! Typed custody account store
//!
//! Thin layer over the state store: loads and saves the whole account
//! collection as one JSON array, and applies reservation bookkeeping
//! through a load-mutate-persist cycle.

use crate::{
    error::{Error, Result},
    types::{AccountId, CustodyAccount},
};
use rust_decimal::Decimal;
use state_store::StateStore;
use std::sync::Arc;

/// Fixed collection name for custody accounts
pub const COLLECTION_ACCOUNTS: &str = "custody_accounts";

/// Custody account store
pub struct CustodyStore {
    store: Arc<dyn StateStore>,
}

impl CustodyStore {
    /// Create store over a persistence backend
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Load all custody accounts (empty if none were ever saved)
    pub fn accounts(&self) -> Result<Vec<CustodyAccount>> {
        match self.store.read(COLLECTION_ACCOUNTS)? {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => Ok(Vec::new()),
        }
    }

    /// Persist the full account collection
    pub fn save_accounts(&self, accounts: &[CustodyAccount]) -> Result<()> {
        let payload = serde_json::to_string(accounts)?;
        self.store.write(COLLECTION_ACCOUNTS, &payload)?;

        tracing::debug!(count = accounts.len(), "Saved custody accounts");
        Ok(())
    }

    /// Resolve an account by ID
    pub fn find(&self, id: &AccountId) -> Result<CustodyAccount> {
        self.accounts()?
            .into_iter()
            .find(|a| &a.id == id)
            .ok_or_else(|| Error::AccountNotFound(id.to_string()))
    }

    /// Apply completed-transfer bookkeeping to one account and persist.
    ///
    /// Returns the mutated account. Nothing is persisted if the
    /// reservation fails.
    pub fn apply_reservation(&self, id: &AccountId, amount: Decimal) -> Result<CustodyAccount> {
        let mut accounts = self.accounts()?;
        let account = accounts
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| Error::AccountNotFound(id.to_string()))?;

        account.reserve(amount)?;
        let updated = account.clone();

        self.save_accounts(&accounts)?;

        tracing::info!(
            account = %updated.id,
            amount = %amount,
            available = %updated.available_balance,
            reserved = %updated.reserved_balance,
            "Reserved funds for completed transfer"
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Currency;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use state_store::MemoryStore;

    fn store_with_account(available: Decimal) -> CustodyStore {
        let store = CustodyStore::new(Arc::new(MemoryStore::new()));
        store
            .save_accounts(&[CustodyAccount {
                id: AccountId::new("ACC-001"),
                account_name: "OPERATING RESERVE".to_string(),
                account_number: "10010001".to_string(),
                currency: Currency::USD,
                available_balance: available,
                reserved_balance: Decimal::ZERO,
            }])
            .unwrap();
        store
    }

    #[test]
    fn test_empty_store_has_no_accounts() {
        let store = CustodyStore::new(Arc::new(MemoryStore::new()));
        assert!(store.accounts().unwrap().is_empty());
        assert!(matches!(
            store.find(&AccountId::new("missing")),
            Err(Error::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_apply_reservation_persists() {
        let store = store_with_account(dec!(1000));
        let id = AccountId::new("ACC-001");

        let updated = store.apply_reservation(&id, dec!(400)).unwrap();
        assert_eq!(updated.available_balance, dec!(600));
        assert_eq!(updated.reserved_balance, dec!(400));

        // Reload from the backend to confirm persistence
        let reloaded = store.find(&id).unwrap();
        assert_eq!(reloaded.available_balance, dec!(600));
        assert_eq!(reloaded.reserved_balance, dec!(400));
    }

    #[test]
    fn test_failed_reservation_persists_nothing() {
        let store = store_with_account(dec!(100));
        let id = AccountId::new("ACC-001");

        assert!(store.apply_reservation(&id, dec!(500)).is_err());

        let reloaded = store.find(&id).unwrap();
        assert_eq!(reloaded.available_balance, dec!(100));
        assert_eq!(reloaded.reserved_balance, Decimal::ZERO);
    }

    proptest! {
        // For all 0 < a <= available: available' = available - a,
        // reserved' = reserved + a, and the sum is conserved.
        #[test]
        fn prop_reserve_conserves_total(available in 1u64..1_000_000, fraction in 1u64..=1_000) {
            let available = Decimal::from(available);
            let amount = (available * Decimal::from(fraction)) / Decimal::from(1_000u64);
            prop_assume!(amount > Decimal::ZERO);

            let store = store_with_account(available);
            let id = AccountId::new("ACC-001");

            let updated = store.apply_reservation(&id, amount).unwrap();
            prop_assert_eq!(updated.available_balance, available - amount);
            prop_assert_eq!(updated.reserved_balance, amount);
            prop_assert_eq!(updated.available_balance + updated.reserved_balance, available);
            prop_assert!(updated.available_balance >= Decimal::ZERO);
        }
    }
}
