//! Transfer orchestration
//!
//! One submission runs end to end synchronously: preconditions, coverage
//! checks, instruction build, webhook round trip, bookkeeping, history,
//! receipt. Account balances are touched only when the webhook explicitly
//! accepted the transfer, so an abort at any earlier step needs no
//! rollback.

use crate::{
    config::EngineConfig,
    receipt::ReceiptWriter,
    store::TransferStore,
    types::{
        generate_record_id, generate_request_id, CoverageCheck, IsoEnvelope, Transfer,
        TransferForm, TransferStats, TransferStatus,
    },
    webhook::{CashTransfer, CashTransferEnvelope, WebhookClient, WebhookOutcome},
    Error, Result,
};
use audit_store::AuditStore;
use chrono::Utc;
use custody_core::{AccountId, CustodyStore};
use iso20022::{AttestationSigner, InstructionParams, Pain001Generator};
use rust_decimal::Decimal;
use state_store::StateStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Outcome of one submission
#[derive(Debug)]
pub struct SubmitResult {
    /// The persisted transfer record
    pub transfer: Transfer,

    /// Path of the written receipt
    pub receipt_path: PathBuf,
}

/// Transfer engine
pub struct TransferEngine {
    custody: CustodyStore,
    audit: AuditStore,
    history: TransferStore,
    webhook: WebhookClient,
    signer: AttestationSigner,
    receipts: ReceiptWriter,
    iso: Pain001Generator,
    config: EngineConfig,
}

impl TransferEngine {
    /// Create an engine over one persistence backend
    pub fn new(config: EngineConfig, store: Arc<dyn StateStore>) -> Result<Self> {
        let seed = config.seed_bytes()?;

        Ok(Self {
            custody: CustodyStore::new(store.clone()),
            audit: AuditStore::new(store.clone()),
            history: TransferStore::new(store),
            webhook: WebhookClient::new(config.webhook.clone())?,
            signer: AttestationSigner::new(&seed, config.attestor.clone()),
            receipts: ReceiptWriter::new(config.output.receipt_dir.clone()),
            iso: Pain001Generator::new(config.output.iso_dir.clone()),
            config,
        })
    }

    /// Submit one transfer from `account_id` described by `form`.
    ///
    /// Precondition failures and instruction-build errors abort before
    /// any network call or mutation. Webhook transport failures do not
    /// abort: the transfer is recorded as Failed.
    pub async fn submit(
        &self,
        account_id: Option<&AccountId>,
        form: &TransferForm,
    ) -> Result<SubmitResult> {
        // Preconditions, checked in order
        let account_id = account_id
            .ok_or_else(|| Error::Validation("No custody account selected".to_string()))?;

        let account = match self.custody.find(account_id) {
            Ok(account) => account,
            Err(custody_core::Error::AccountNotFound(id)) => {
                return Err(Error::Validation(format!("Unknown custody account: {}", id)));
            }
            Err(e) => return Err(e.into()),
        };

        if form.amount <= Decimal::ZERO {
            return Err(Error::Validation(
                "Transfer amount must be greater than zero".to_string(),
            ));
        }

        if form.amount > account.available_balance {
            return Err(Error::Validation(format!(
                "Insufficient balance: requested {} {}, available {} {}",
                account.currency, form.amount, account.currency, account.available_balance
            )));
        }

        let balance_before = account.available_balance;

        // Soft M2 cross-check. Absence or failure here is logged, not
        // fatal; the instruction builder enforces the hard check.
        let results = self.audit.results()?;
        match &results {
            None => {
                tracing::warn!("No scan data loaded; skipping M2 cross-check");
            }
            Some(results) => match iso20022::extract_m2_balance(Some(results), &self.signer) {
                Ok(m2) if form.amount > m2.total => {
                    tracing::warn!(
                        requested = %form.amount,
                        m2_total = %m2.total,
                        "Requested amount exceeds the scanned M2 figure"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "M2 cross-check unavailable");
                }
            },
        }

        let now = Utc::now();
        let request_id = generate_request_id(now);

        // Hard errors from instruction construction abort the submission
        let instruction = iso20022::build_instruction(
            InstructionParams {
                transfer_request_id: request_id.clone(),
                amount: form.amount,
                currency: form.currency.clone(),
                debtor_name: account.account_name.clone(),
                debtor_account: account.account_number.clone(),
                debtor_bic: self.config.sender.bic.clone(),
                debtor_institution: self.config.sender.institution.clone(),
                creditor_name: form.receiving_name.clone(),
                creditor_account: form.receiving_account.clone(),
                creditor_bic: "APEXCAUS".to_string(),
                creditor_institution: form.receiving_institution.clone(),
                remittance_info: form.description.clone(),
                purpose_code: form.purpose.clone(),
            },
            results.as_ref(),
            &self.signer,
        )?;

        let payload = CashTransferEnvelope {
            cash_transfer: CashTransfer {
                sending_name: account.account_name.clone(),
                sending_account: account.account_number.clone(),
                receiving_name: form.receiving_name.clone(),
                receiving_account: form.receiving_account.clone(),
                datetime: now,
                amount: format!("{:.2}", form.amount),
                receiving_currency: form.currency.clone(),
                sending_currency: account.currency.code().to_string(),
                description: form.description.clone(),
                transfer_request_id: request_id.clone(),
                receiving_institution: form.receiving_institution.clone(),
                sending_institution: self.config.sender.institution.clone(),
                sending_institution_website: self.config.sender.website.clone(),
                method: "API".to_string(),
                purpose: form.purpose.clone(),
                source: self.config.sender.source.clone(),
            },
        };

        // Transport failures are folded into a Failed record
        let (status, response) = match self.webhook.submit(&payload).await {
            Ok((outcome, body)) => (outcome.status(), Some(body)),
            Err(e) => {
                tracing::error!(error = %e, "Webhook transport failure");
                (
                    TransferStatus::Failed,
                    Some(serde_json::json!({ "error": e.to_string() })),
                )
            }
        };

        // Bookkeeping only on explicit acceptance
        let balance_after = if status == TransferStatus::Completed {
            let updated = self.custody.apply_reservation(account_id, form.amount)?;
            updated.available_balance
        } else {
            balance_before
        };

        let xml_generated = if self.config.output.export_iso {
            match self.iso.export(&instruction) {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "ISO 20022 export failed");
                    false
                }
            }
        } else {
            false
        };

        let transfer = Transfer {
            id: generate_record_id(now),
            transfer_request_id: request_id,
            sending_name: account.account_name.clone(),
            sending_account: account.account_number.clone(),
            sending_institution: self.config.sender.institution.clone(),
            sending_institution_website: self.config.sender.website.clone(),
            receiving_name: form.receiving_name.clone(),
            receiving_account: form.receiving_account.clone(),
            receiving_institution: form.receiving_institution.clone(),
            amount: form.amount,
            sending_currency: account.currency.code().to_string(),
            receiving_currency: form.currency.clone(),
            description: form.description.clone(),
            datetime: now,
            status,
            response,
            created_at: now,
            m2_validation: CoverageCheck {
                balance_before,
                balance_after,
                source: format!("Custody Account: {}", account.account_name),
                attestation_count: instruction.attestations.len(),
                attestations_verified: instruction.coverage.verified,
            },
            iso20022: IsoEnvelope {
                message_id: instruction.message_id.clone(),
                payment_instruction: instruction,
                xml_generated,
            },
        };

        // Recorded regardless of outcome
        self.history.record(transfer.clone())?;
        let receipt_path = self.receipts.write(&transfer)?;

        tracing::info!(
            transfer_request_id = %transfer.transfer_request_id,
            status = %transfer.status,
            "Transfer submission finished"
        );

        Ok(SubmitResult {
            transfer,
            receipt_path,
        })
    }

    /// Connectivity check against the settlement webhook
    pub async fn probe(&self) -> Result<WebhookOutcome> {
        self.webhook.probe(&self.config.sender).await
    }

    /// Full transfer history, newest first
    pub fn history(&self) -> Result<Vec<Transfer>> {
        self.history.transfers()
    }

    /// Aggregate history stats
    pub fn stats(&self) -> Result<TransferStats> {
        self.history.stats()
    }

    /// Export the full history as one text file
    pub fn export_history(&self) -> Result<PathBuf> {
        let transfers = self.history.transfers()?;
        self.receipts.export_history(&transfers)
    }
}
