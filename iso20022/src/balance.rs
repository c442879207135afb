//! M2 balance extraction from scan aggregates

use crate::{
    attestation::{AttestationSigner, EvidenceAttestation},
    error::Error,
    Result,
};
use audit_store::AuditResults;
use custody_core::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Extracted M2 figure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct M2Balance {
    /// M2 total from the matched aggregate
    pub total: Decimal,

    /// Currency of the aggregate
    pub currency: Currency,

    /// Whether every evidence attestation verified
    pub validated: bool,
}

/// Pull the transferable M2 figure out of scan results.
///
/// The USD aggregate is authoritative. Errors when no scan data exists or
/// when the matched M2 figure is exactly zero.
pub fn extract_m2_balance(
    results: Option<&AuditResults>,
    signer: &AttestationSigner,
) -> Result<M2Balance> {
    let results = results.ok_or(Error::NoAuditData)?;
    let (balance, _) = extract_m2_attested(results, signer)?;
    Ok(balance)
}

/// Extraction variant that also hands back the signed attestations, so a
/// caller embedding them does not sign the finding set a second time.
pub(crate) fn extract_m2_attested(
    results: &AuditResults,
    signer: &AttestationSigner,
) -> Result<(M2Balance, Vec<EvidenceAttestation>)> {
    let aggregate = results
        .aggregate(Currency::USD)
        .ok_or_else(|| Error::NoM2Funds {
            currency: Currency::USD.code().to_string(),
        })?;

    if aggregate.m2 == Decimal::ZERO {
        return Err(Error::NoM2Funds {
            currency: aggregate.currency.code().to_string(),
        });
    }

    let mut attestations = signer.extract(results);
    let validated = signer.verify_all(&mut attestations);

    tracing::info!(
        total = %aggregate.m2,
        currency = %aggregate.currency,
        validated,
        "Extracted M2 balance"
    );

    let balance = M2Balance {
        total: aggregate.m2,
        currency: aggregate.currency,
        validated,
    };

    Ok((balance, attestations))
}
