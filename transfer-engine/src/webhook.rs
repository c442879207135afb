//! Settlement webhook client
//!
//! Posts `{"CashTransfer.v1": {...}}` JSON to the configured endpoint and
//! classifies the response into a closed [`WebhookOutcome`]. Classification
//! is exhaustive: every response shape maps to exactly one variant.

use crate::{
    config::{SenderConfig, WebhookConfig},
    types::TransferStatus,
    Error, Result,
};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wire envelope for the settlement webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashTransferEnvelope {
    /// Versioned payload
    #[serde(rename = "CashTransfer.v1")]
    pub cash_transfer: CashTransfer,
}

/// `CashTransfer.v1` payload fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashTransfer {
    /// Sender name
    #[serde(rename = "SendingName")]
    pub sending_name: String,

    /// Sender account number
    #[serde(rename = "SendingAccount")]
    pub sending_account: String,

    /// Beneficiary name
    #[serde(rename = "ReceivingName")]
    pub receiving_name: String,

    /// Beneficiary account number
    #[serde(rename = "ReceivingAccount")]
    pub receiving_account: String,

    /// Submission timestamp
    #[serde(rename = "Datetime")]
    pub datetime: DateTime<Utc>,

    /// Amount, two decimal places
    #[serde(rename = "Amount")]
    pub amount: String,

    /// Receiving currency code
    #[serde(rename = "ReceivingCurrency")]
    pub receiving_currency: String,

    /// Sending currency code
    #[serde(rename = "SendingCurrency")]
    pub sending_currency: String,

    /// Free-text description
    #[serde(rename = "Description")]
    pub description: String,

    /// Request ID carried end-to-end
    #[serde(rename = "TransferRequestID")]
    pub transfer_request_id: String,

    /// Beneficiary institution name
    #[serde(rename = "ReceivingInstitution")]
    pub receiving_institution: String,

    /// Sending institution name
    #[serde(rename = "SendingInstitution")]
    pub sending_institution: String,

    /// Sending institution website
    #[serde(rename = "SendingInstitutionWebsite")]
    pub sending_institution_website: String,

    /// Transport method tag
    #[serde(rename = "method")]
    pub method: String,

    /// Transfer purpose tag
    #[serde(rename = "purpose")]
    pub purpose: String,

    /// Source system tag
    #[serde(rename = "source")]
    pub source: String,
}

/// Classified webhook verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// 2xx with an explicit `success: true`
    Accepted {
        /// Message from the response body, if any
        message: Option<String>,
    },

    /// Non-2xx, or 2xx with an explicit `success: false`
    Rejected {
        /// Message from the response body, if any
        message: Option<String>,
    },

    /// 2xx with no recognizable verdict in the body
    Indeterminate,
}

impl WebhookOutcome {
    /// Transfer status implied by this outcome
    pub fn status(&self) -> TransferStatus {
        match self {
            WebhookOutcome::Accepted { .. } => TransferStatus::Completed,
            WebhookOutcome::Rejected { .. } => TransferStatus::Failed,
            WebhookOutcome::Indeterminate => TransferStatus::Processing,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookResponse {
    success: Option<bool>,
    message: Option<String>,
    data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    updates: Option<Vec<ResponseUpdate>>,
}

#[derive(Debug, Deserialize)]
struct ResponseUpdate {
    message: Option<String>,
}

/// Classify a webhook response body against its HTTP status
pub fn classify(http_success: bool, body: &serde_json::Value) -> WebhookOutcome {
    let parsed: WebhookResponse = match serde_json::from_value(body.clone()) {
        Ok(parsed) => parsed,
        Err(_) => {
            return if http_success {
                WebhookOutcome::Indeterminate
            } else {
                WebhookOutcome::Rejected { message: None }
            };
        }
    };

    let message = parsed.message.or_else(|| {
        parsed
            .data
            .and_then(|d| d.updates)
            .and_then(|u| u.into_iter().next())
            .and_then(|u| u.message)
    });

    if !http_success {
        return WebhookOutcome::Rejected { message };
    }

    match parsed.success {
        Some(true) => WebhookOutcome::Accepted { message },
        Some(false) => WebhookOutcome::Rejected { message },
        None => WebhookOutcome::Indeterminate,
    }
}

/// Settlement webhook client
pub struct WebhookClient {
    config: WebhookConfig,
    client: Client,
}

impl WebhookClient {
    /// Create a client with the configured timeout
    pub fn new(config: WebhookConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Webhook(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Submit a transfer payload.
    ///
    /// Returns the classified outcome plus the raw response body. A body
    /// that fails to parse as JSON is replaced with an error marker so
    /// the transfer record still carries something useful.
    pub async fn submit(
        &self,
        payload: &CashTransferEnvelope,
    ) -> Result<(WebhookOutcome, serde_json::Value)> {
        tracing::info!(
            transfer_request_id = %payload.cash_transfer.transfer_request_id,
            amount = %payload.cash_transfer.amount,
            "Submitting transfer to settlement webhook"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", self.config.key.as_str()), ("force", "true")])
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::Webhook(e.to_string()))?;

        let http_success = response.status().is_success();
        let status_code = response.status().as_u16();

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Webhook response was not valid JSON");
                serde_json::json!({ "error": format!("Failed to parse response: {}", e) })
            }
        };

        let outcome = classify(http_success, &body);
        tracing::info!(status_code, outcome = ?outcome, "Webhook responded");

        Ok((outcome, body))
    }

    /// Connectivity check with a minimal test payload
    pub async fn probe(&self, sender: &SenderConfig) -> Result<WebhookOutcome> {
        let now = Utc::now();
        let payload = CashTransferEnvelope {
            cash_transfer: CashTransfer {
                sending_name: "API_CONNECTION_TEST".to_string(),
                sending_account: "TEST_000".to_string(),
                receiving_name: "API_CONNECTION_TEST".to_string(),
                receiving_account: "TEST_000".to_string(),
                datetime: now,
                amount: "0.01".to_string(),
                receiving_currency: "USD".to_string(),
                sending_currency: "USD".to_string(),
                description: "API CONNECTION VERIFICATION".to_string(),
                transfer_request_id: format!("TEST_{}", now.timestamp_millis()),
                receiving_institution: sender.institution.clone(),
                sending_institution: sender.institution.clone(),
                sending_institution_website: sender.website.clone(),
                method: "API".to_string(),
                purpose: "CONNECTION_TEST".to_string(),
                source: sender.source.clone(),
            },
        };

        let (outcome, _) = self.submit(&payload).await?;
        Ok(outcome)
    }
}
