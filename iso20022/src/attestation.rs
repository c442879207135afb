//! Evidence attestations
//!
//! Each qualifying scan finding (tier M2, evidence captured) is attested
//! by signing the SHA-256 digest of its raw evidence bytes with the
//! configured Ed25519 key. Verification recomputes the digest and checks
//! the signature and validity window.

use crate::{
    crypto::{hash_bytes, KeyPair},
    error::Result,
};
use audit_store::{AuditResults, MonetaryTier, ScanEvidence};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Where the attested evidence came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceSource {
    /// SHA-256 of the scanned file
    pub file_hash: String,

    /// SHA-256 of the evidence block
    pub block_hash: String,

    /// Byte offset of the block in the file
    pub offset: u64,
}

/// A provenance attestation over one scan finding.
///
/// This attests that the named evidence bytes were seen by this system's
/// signer. It is not a bank-issued certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceAttestation {
    /// Ed25519 signature over the digest, hex encoded
    pub signature: String,

    /// Signature method
    pub method: String,

    /// SHA-256 digest of the evidence bytes, hex encoded
    pub digest_value: String,

    /// Name of the attesting party
    pub attestor: String,

    /// Scanner verification code, carried as the attestation serial
    pub serial: String,

    /// When the attestation was produced
    pub signed_at: DateTime<Utc>,

    /// Validity window start
    pub valid_from: DateTime<Utc>,

    /// Validity window end
    pub valid_to: DateTime<Utc>,

    /// Set by verification
    pub verified: bool,

    /// Evidence provenance
    pub source: EvidenceSource,
}

/// Signs and verifies evidence attestations
pub struct AttestationSigner {
    keypair: KeyPair,
    attestor: String,
    validity: Duration,
}

impl AttestationSigner {
    /// Create a signer with a deterministic key from `seed`
    pub fn new(seed: &[u8; 32], attestor: impl Into<String>) -> Self {
        Self {
            keypair: KeyPair::from_seed(seed),
            attestor: attestor.into(),
            validity: Duration::days(365),
        }
    }

    /// Public key of the signer
    pub fn public_key(&self) -> [u8; 32] {
        self.keypair.public_key()
    }

    /// Attest every M2 finding that carries evidence.
    ///
    /// Findings whose raw hex does not decode are skipped with a warning.
    pub fn extract(&self, results: &AuditResults) -> Vec<EvidenceAttestation> {
        let mut attestations = Vec::new();

        for finding in results.findings_for_tier(MonetaryTier::M2) {
            let Some(evidence) = &finding.evidence else {
                continue;
            };

            match self.attest(evidence) {
                Ok(attestation) => attestations.push(attestation),
                Err(e) => {
                    tracing::warn!(finding = %finding.id, error = %e, "Skipping unattestable finding");
                }
            }
        }

        tracing::info!(
            count = attestations.len(),
            "Extracted evidence attestations from M2 findings"
        );
        attestations
    }

    fn attest(&self, evidence: &ScanEvidence) -> Result<EvidenceAttestation> {
        let raw = hex::decode(&evidence.raw_hex)
            .map_err(|e| crate::Error::Attestation(format!("Bad evidence hex: {}", e)))?;

        let digest = hash_bytes(&raw);
        let signature = self.keypair.sign(&digest);
        let signed_at = Utc::now();

        Ok(EvidenceAttestation {
            signature: hex::encode(signature),
            method: "Ed25519".to_string(),
            digest_value: hex::encode(digest),
            attestor: self.attestor.clone(),
            serial: evidence.verification_code.clone(),
            signed_at,
            valid_from: signed_at,
            valid_to: signed_at + self.validity,
            verified: evidence.checksum_verified,
            source: EvidenceSource {
                file_hash: evidence.file_hash.clone(),
                block_hash: evidence.block_hash.clone(),
                offset: evidence.source_offset,
            },
        })
    }

    /// Verify attestations in place, updating each `verified` flag.
    ///
    /// Returns true only when every attestation verified and the set is
    /// non-empty.
    pub fn verify_all(&self, attestations: &mut [EvidenceAttestation]) -> bool {
        if attestations.is_empty() {
            tracing::warn!("No attestations to verify");
            return false;
        }

        let now = Utc::now();
        let mut valid = 0usize;

        for attestation in attestations.iter_mut() {
            attestation.verified = self.verify_one(attestation, now);
            if attestation.verified {
                valid += 1;
            }
        }

        tracing::info!(
            valid,
            total = attestations.len(),
            "Verified evidence attestations"
        );
        valid == attestations.len()
    }

    fn verify_one(&self, attestation: &EvidenceAttestation, now: DateTime<Utc>) -> bool {
        if now < attestation.valid_from || now > attestation.valid_to {
            tracing::warn!(serial = %attestation.serial, "Attestation outside validity window");
            return false;
        }

        let Ok(digest) = hex::decode(&attestation.digest_value) else {
            return false;
        };
        let Ok(signature_bytes) = hex::decode(&attestation.signature) else {
            return false;
        };
        let Ok(signature) = <[u8; 64]>::try_from(signature_bytes.as_slice()) else {
            return false;
        };

        self.keypair.verify(&digest, &signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_store::{AuditFinding, AuditSummary, CurrencyAggregate};
    use custody_core::Currency;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn evidence() -> ScanEvidence {
        ScanEvidence {
            file_hash: "ab".repeat(32),
            block_hash: "cd".repeat(32),
            source_offset: 4096,
            raw_hex: hex::encode(b"currency block bytes"),
            verification_code: "VC-0001".to_string(),
            captured_at: Utc::now(),
            checksum_verified: true,
        }
    }

    fn results_with_findings(findings: Vec<AuditFinding>) -> AuditResults {
        AuditResults {
            source_file: "DTC1B".to_string(),
            file_hash: "ab".repeat(32),
            aggregates: vec![CurrencyAggregate::empty(Currency::USD)],
            summary: AuditSummary {
                total_equiv_usd: Decimal::ZERO,
                finding_count: findings.len(),
                scanned_at: Utc::now(),
            },
            findings,
        }
    }

    #[test]
    fn test_extract_attests_m2_findings_with_evidence() {
        let signer = AttestationSigner::new(&[7u8; 32], "Custodia Scanner");

        let findings = vec![
            AuditFinding {
                id: Uuid::new_v4(),
                currency: Currency::USD,
                amount: dec!(100),
                tier: MonetaryTier::M2,
                evidence: Some(evidence()),
            },
            // M2 without evidence: skipped
            AuditFinding {
                id: Uuid::new_v4(),
                currency: Currency::USD,
                amount: dec!(50),
                tier: MonetaryTier::M2,
                evidence: None,
            },
            // Evidence but wrong tier: skipped
            AuditFinding {
                id: Uuid::new_v4(),
                currency: Currency::USD,
                amount: dec!(10),
                tier: MonetaryTier::M0,
                evidence: Some(evidence()),
            },
        ];

        let attestations = signer.extract(&results_with_findings(findings));
        assert_eq!(attestations.len(), 1);
        assert_eq!(attestations[0].method, "Ed25519");
        assert_eq!(attestations[0].serial, "VC-0001");
    }

    #[test]
    fn test_verify_all_roundtrip() {
        let signer = AttestationSigner::new(&[7u8; 32], "Custodia Scanner");
        let finding = AuditFinding {
            id: Uuid::new_v4(),
            currency: Currency::USD,
            amount: dec!(100),
            tier: MonetaryTier::M2,
            evidence: Some(evidence()),
        };

        let mut attestations = signer.extract(&results_with_findings(vec![finding]));
        assert!(signer.verify_all(&mut attestations));
        assert!(attestations.iter().all(|a| a.verified));
    }

    #[test]
    fn test_verify_rejects_tampered_digest() {
        let signer = AttestationSigner::new(&[7u8; 32], "Custodia Scanner");
        let finding = AuditFinding {
            id: Uuid::new_v4(),
            currency: Currency::USD,
            amount: dec!(100),
            tier: MonetaryTier::M2,
            evidence: Some(evidence()),
        };

        let mut attestations = signer.extract(&results_with_findings(vec![finding]));
        attestations[0].digest_value = hex::encode([0u8; 32]);

        assert!(!signer.verify_all(&mut attestations));
        assert!(!attestations[0].verified);
    }

    #[test]
    fn test_verify_rejects_foreign_signer() {
        let signer = AttestationSigner::new(&[7u8; 32], "Custodia Scanner");
        let other = AttestationSigner::new(&[9u8; 32], "Someone Else");
        let finding = AuditFinding {
            id: Uuid::new_v4(),
            currency: Currency::USD,
            amount: dec!(100),
            tier: MonetaryTier::M2,
            evidence: Some(evidence()),
        };

        let mut attestations = signer.extract(&results_with_findings(vec![finding]));
        assert!(!other.verify_all(&mut attestations));
    }

    #[test]
    fn test_verify_empty_set_is_false() {
        let signer = AttestationSigner::new(&[7u8; 32], "Custodia Scanner");
        assert!(!signer.verify_all(&mut []));
    }
}
