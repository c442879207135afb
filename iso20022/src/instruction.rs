//! pain.001 payment instruction construction
//!
//! An instruction is built fresh per transfer and embedded in the transfer
//! record; it is never persisted on its own. Construction re-validates the
//! amount against the extracted M2 figure and hard-fails when exceeded.
//! The engine performs the same comparison earlier as a soft check; the
//! check here is the authoritative one.

use crate::{
    attestation::{AttestationSigner, EvidenceAttestation},
    balance::extract_m2_attested,
    error::Error,
    Result,
};
use audit_store::AuditResults;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inputs for instruction construction
#[derive(Debug, Clone)]
pub struct InstructionParams {
    /// Transfer request ID (becomes the end-to-end ID)
    pub transfer_request_id: String,

    /// Instructed amount
    pub amount: Decimal,

    /// Instructed currency code
    pub currency: String,

    /// Debtor (sender) name
    pub debtor_name: String,

    /// Debtor account number
    pub debtor_account: String,

    /// Debtor agent BIC
    pub debtor_bic: String,

    /// Debtor institution name
    pub debtor_institution: String,

    /// Creditor (receiver) name
    pub creditor_name: String,

    /// Creditor account number
    pub creditor_account: String,

    /// Creditor agent BIC
    pub creditor_bic: String,

    /// Creditor institution name
    pub creditor_institution: String,

    /// Unstructured remittance information
    pub remittance_info: String,

    /// ISO purpose code
    pub purpose_code: String,
}

/// Initiating party of the message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiatingParty {
    /// Party name
    pub name: String,
    /// BIC identification
    pub identification: String,
}

/// Debtor side of the payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debtor {
    /// Account holder name
    pub name: String,
    /// Account number
    pub account_number: String,
    /// Account currency code
    pub currency: String,
    /// Holding institution name
    pub institution: String,
}

/// Financial institution agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// BIC of the institution
    pub bicfi: String,
    /// Institution name
    pub name: String,
}

/// Creditor side of the payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creditor {
    /// Beneficiary name
    pub name: String,
    /// Account number
    pub account_number: String,
}

/// One credit transfer transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransferTransaction {
    /// End-to-end payment ID
    pub payment_id: String,
    /// Instructed amount
    pub amount: Decimal,
    /// Instructed currency code
    pub currency: String,
    /// Beneficiary
    pub creditor: Creditor,
    /// Beneficiary institution
    pub creditor_agent: Agent,
    /// Unstructured remittance information
    pub remittance_info: String,
    /// ISO purpose code
    pub purpose_code: String,
}

/// Snapshot of the M2 figure backing the instruction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageSnapshot {
    /// Name of the scanned source file
    pub source_file: String,
    /// Extracted M2 total
    pub total_balance: Decimal,
    /// Currency of the M2 figure
    pub currency: String,
    /// When the figure was extracted
    pub extracted_at: DateTime<Utc>,
    /// Whether every attestation verified
    pub verified: bool,
}

/// A pain.001 customer credit transfer initiation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInstruction {
    /// Message ID (`PAIN.001.<transfer_request_id>`)
    pub message_id: String,

    /// Creation timestamp
    pub creation_date_time: DateTime<Utc>,

    /// Number of transactions (always 1 here)
    pub number_of_transactions: u32,

    /// Control sum
    pub control_sum: Decimal,

    /// Initiating party
    pub initiating_party: InitiatingParty,

    /// Payment information ID (`PMT.<transfer_request_id>`)
    pub payment_information_id: String,

    /// Payment method (TRF)
    pub payment_method: String,

    /// Requested execution date (next day)
    pub requested_execution_date: NaiveDate,

    /// Debtor
    pub debtor: Debtor,

    /// Debtor agent
    pub debtor_agent: Agent,

    /// Credit transfer transactions
    pub transactions: Vec<CreditTransferTransaction>,

    /// Evidence attestations carried in supplementary data
    pub attestations: Vec<EvidenceAttestation>,

    /// M2 coverage snapshot
    pub coverage: CoverageSnapshot,
}

/// Build a pain.001 instruction for one transfer.
///
/// Hard errors: no scan data, zero M2, amount exceeding the M2 figure.
pub fn build_instruction(
    params: InstructionParams,
    results: Option<&AuditResults>,
    signer: &AttestationSigner,
) -> Result<PaymentInstruction> {
    let results = results.ok_or(Error::NoAuditData)?;
    let (m2, attestations) = extract_m2_attested(results, signer)?;

    if params.amount > m2.total {
        return Err(Error::InsufficientCoverage {
            requested: params.amount,
            available: m2.total,
            currency: m2.currency.code().to_string(),
        });
    }

    let now = Utc::now();

    let instruction = PaymentInstruction {
        message_id: format!("PAIN.001.{}", params.transfer_request_id),
        creation_date_time: now,
        number_of_transactions: 1,
        control_sum: params.amount,
        initiating_party: InitiatingParty {
            name: params.debtor_institution.clone(),
            identification: params.debtor_bic.clone(),
        },
        payment_information_id: format!("PMT.{}", params.transfer_request_id),
        payment_method: "TRF".to_string(),
        requested_execution_date: (now + Duration::days(1)).date_naive(),
        debtor: Debtor {
            name: params.debtor_name,
            account_number: params.debtor_account,
            currency: params.currency.clone(),
            institution: params.debtor_institution.clone(),
        },
        debtor_agent: Agent {
            bicfi: params.debtor_bic,
            name: params.debtor_institution,
        },
        transactions: vec![CreditTransferTransaction {
            payment_id: params.transfer_request_id,
            amount: params.amount,
            currency: params.currency,
            creditor: Creditor {
                name: params.creditor_name,
                account_number: params.creditor_account,
            },
            creditor_agent: Agent {
                bicfi: params.creditor_bic,
                name: params.creditor_institution,
            },
            remittance_info: params.remittance_info,
            purpose_code: params.purpose_code,
        }],
        attestations,
        coverage: CoverageSnapshot {
            source_file: results.source_file.clone(),
            total_balance: m2.total,
            currency: m2.currency.code().to_string(),
            extracted_at: now,
            verified: m2.validated,
        },
    };

    tracing::info!(
        message_id = %instruction.message_id,
        attestations = instruction.attestations.len(),
        verified = instruction.coverage.verified,
        "Built payment instruction"
    );

    Ok(instruction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_store::{AuditResults, AuditSummary, CurrencyAggregate};
    use custody_core::Currency;
    use rust_decimal_macros::dec;

    fn signer() -> AttestationSigner {
        AttestationSigner::new(&[3u8; 32], "Custodia Scanner")
    }

    fn results(m2: Decimal) -> AuditResults {
        let mut aggregate = CurrencyAggregate::empty(Currency::USD);
        aggregate.m2 = m2;
        AuditResults {
            source_file: "DTC1B".to_string(),
            file_hash: "ef".repeat(32),
            aggregates: vec![aggregate],
            findings: vec![],
            summary: AuditSummary {
                total_equiv_usd: m2,
                finding_count: 0,
                scanned_at: Utc::now(),
            },
        }
    }

    fn params(amount: Decimal) -> InstructionParams {
        InstructionParams {
            transfer_request_id: "TXN_1700000000_ABCDEFG".to_string(),
            amount,
            currency: "USD".to_string(),
            debtor_name: "OPERATING RESERVE".to_string(),
            debtor_account: "10010001".to_string(),
            debtor_bic: "DIGCUSXX".to_string(),
            debtor_institution: "Digital Commercial Bank Ltd".to_string(),
            creditor_name: "GLOBAL INFRASTRUCTURE AGENCY".to_string(),
            creditor_account: "23890111".to_string(),
            creditor_bic: "APEXCAUS".to_string(),
            creditor_institution: "APEX CAPITAL RESERVE BANK INC".to_string(),
            remittance_info: "M2 MONEY TRANSFER".to_string(),
            purpose_code: "INFR".to_string(),
        }
    }

    #[test]
    fn test_message_id_format() {
        let results = results(dec!(1000000));
        let instruction = build_instruction(params(dec!(500)), Some(&results), &signer()).unwrap();

        assert_eq!(instruction.message_id, "PAIN.001.TXN_1700000000_ABCDEFG");
        assert_eq!(
            instruction.payment_information_id,
            "PMT.TXN_1700000000_ABCDEFG"
        );
        assert_eq!(instruction.number_of_transactions, 1);
        assert_eq!(instruction.control_sum, dec!(500));
        assert_eq!(instruction.payment_method, "TRF");
        assert_eq!(instruction.transactions.len(), 1);
    }

    #[test]
    fn test_hard_error_without_scan_data() {
        assert!(matches!(
            build_instruction(params(dec!(500)), None, &signer()),
            Err(Error::NoAuditData)
        ));
    }

    #[test]
    fn test_hard_error_when_amount_exceeds_m2() {
        let results = results(dec!(100));
        let err = build_instruction(params(dec!(100.01)), Some(&results), &signer()).unwrap_err();

        assert!(matches!(err, Error::InsufficientCoverage { .. }));
    }

    #[test]
    fn test_amount_equal_to_m2_is_allowed() {
        let results = results(dec!(100));
        assert!(build_instruction(params(dec!(100)), Some(&results), &signer()).is_ok());
    }

    #[test]
    fn test_attestations_signed_once_and_verified() {
        use audit_store::{AuditFinding, MonetaryTier, ScanEvidence};
        use uuid::Uuid;

        let mut results = results(dec!(1000000));
        results.findings = vec![AuditFinding {
            id: Uuid::new_v4(),
            currency: Currency::USD,
            amount: dec!(100),
            tier: MonetaryTier::M2,
            evidence: Some(ScanEvidence {
                file_hash: "ab".repeat(32),
                block_hash: "cd".repeat(32),
                source_offset: 4096,
                raw_hex: hex::encode(b"currency block bytes"),
                verification_code: "VC-0001".to_string(),
                captured_at: Utc::now(),
                checksum_verified: true,
            }),
        }];
        results.summary.finding_count = 1;

        let instruction = build_instruction(params(dec!(500)), Some(&results), &signer()).unwrap();

        assert_eq!(instruction.attestations.len(), 1);
        assert!(instruction.attestations[0].verified);
        assert!(instruction.coverage.verified);
    }

    #[test]
    fn test_coverage_snapshot() {
        let results = results(dec!(250000));
        let instruction = build_instruction(params(dec!(1)), Some(&results), &signer()).unwrap();

        assert_eq!(instruction.coverage.source_file, "DTC1B");
        assert_eq!(instruction.coverage.total_balance, dec!(250000));
        assert_eq!(instruction.coverage.currency, "USD");
    }
}
