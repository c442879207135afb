//! Core types for custody accounts
//!
//! All money amounts are exact decimals; account records serialize with
//! camelCase field names to stay compatible with previously exported state.

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Custody account identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO 4217 currency code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Currency {
    /// US Dollar
    USD,
    /// Euro
    EUR,
    /// British Pound
    GBP,
    /// Swiss Franc
    CHF,
    /// UAE Dirham
    AED,
}

impl Currency {
    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::CHF => "CHF",
            Currency::AED => "AED",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "CHF" => Some(Currency::CHF),
            "AED" => Some(Currency::AED),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A locally held balance record standing in for an external bank account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodyAccount {
    /// Account identifier
    pub id: AccountId,

    /// Display name of the account holder
    pub account_name: String,

    /// External account number
    pub account_number: String,

    /// Account currency
    pub currency: Currency,

    /// Balance available for transfers
    pub available_balance: Decimal,

    /// Balance reserved by completed transfers
    pub reserved_balance: Decimal,
}

impl CustodyAccount {
    /// Check whether `amount` can be debited from the available balance
    pub fn can_debit(&self, amount: Decimal) -> bool {
        amount > Decimal::ZERO && amount <= self.available_balance
    }

    /// Completed-transfer bookkeeping: move `amount` from available to
    /// reserved.
    ///
    /// Errors leave the account untouched.
    pub fn reserve(&mut self, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        if amount > self.available_balance {
            return Err(Error::InsufficientBalance {
                available: self.available_balance,
                requested: amount,
            });
        }

        self.available_balance -= amount;
        self.reserved_balance += amount;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(available: Decimal) -> CustodyAccount {
        CustodyAccount {
            id: AccountId::new("ACC-001"),
            account_name: "OPERATING RESERVE".to_string(),
            account_number: "10010001".to_string(),
            currency: Currency::USD,
            available_balance: available,
            reserved_balance: Decimal::ZERO,
        }
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::parse("USD"), Some(Currency::USD));
        assert_eq!(Currency::parse("XXX"), None);
    }

    #[test]
    fn test_reserve_moves_balance() {
        let mut acct = account(dec!(1000));
        acct.reserve(dec!(250)).unwrap();

        assert_eq!(acct.available_balance, dec!(750));
        assert_eq!(acct.reserved_balance, dec!(250));
    }

    #[test]
    fn test_reserve_rejects_non_positive() {
        let mut acct = account(dec!(1000));
        assert!(matches!(
            acct.reserve(Decimal::ZERO),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            acct.reserve(dec!(-5)),
            Err(Error::InvalidAmount(_))
        ));
        // Untouched on error
        assert_eq!(acct.available_balance, dec!(1000));
        assert_eq!(acct.reserved_balance, Decimal::ZERO);
    }

    #[test]
    fn test_reserve_rejects_overdraw() {
        let mut acct = account(dec!(100));
        let err = acct.reserve(dec!(100.01)).unwrap_err();
        assert!(matches!(err, Error::InsufficientBalance { .. }));
        assert_eq!(acct.available_balance, dec!(100));
    }

    #[test]
    fn test_account_serde_field_names() {
        let acct = account(dec!(1));
        let json = serde_json::to_string(&acct).unwrap();
        assert!(json.contains("availableBalance"));
        assert!(json.contains("reservedBalance"));
        assert!(json.contains("accountNumber"));
    }
}
