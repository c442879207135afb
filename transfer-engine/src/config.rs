//! Configuration for the transfer engine

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Transfer engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Webhook configuration
    pub webhook: WebhookConfig,

    /// Sending institution identity
    pub sender: SenderConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Attestation signer seed, 64 hex chars (32 bytes)
    pub signer_seed: String,

    /// Attestor name carried on evidence attestations
    pub attestor: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service_name: "transfer-engine".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            webhook: WebhookConfig::default(),
            sender: SenderConfig::default(),
            output: OutputConfig::default(),
            signer_seed: "00".repeat(32),
            attestor: "Custodia Scanner".to_string(),
        }
    }
}

/// Settlement webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook endpoint URL
    pub endpoint: String,

    /// Query key appended to every request
    pub key: String,

    /// Request timeout
    pub timeout_seconds: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mindcloud.co/api/job/8wZsHuEIK3xu/run".to_string(),
            key: String::new(),
            timeout_seconds: 30,
        }
    }
}

/// Sending institution identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    /// Institution name
    pub institution: String,

    /// Institution website
    pub website: String,

    /// Institution BIC
    pub bic: String,

    /// Source system tag carried in the payload
    pub source: String,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            institution: "Digital Commercial Bank Ltd".to_string(),
            website: "https://digcommbank.com/".to_string(),
            bic: "DIGCUSXX".to_string(),
            source: "DAES_CORE_SYSTEM".to_string(),
        }
    }
}

/// Receipt and ISO output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for plain-text receipts
    pub receipt_dir: PathBuf,

    /// Directory for exported pain.001 XML files
    pub iso_dir: PathBuf,

    /// Export the XML rendering alongside the receipt
    pub export_iso: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            receipt_dir: PathBuf::from("./data/receipts"),
            iso_dir: PathBuf::from("./data/iso20022"),
            export_iso: true,
        }
    }
}

impl EngineConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = EngineConfig::default();

        if let Ok(endpoint) = std::env::var("TRANSFER_WEBHOOK_ENDPOINT") {
            config.webhook.endpoint = endpoint;
        }

        if let Ok(key) = std::env::var("TRANSFER_WEBHOOK_KEY") {
            config.webhook.key = key;
        }

        if let Ok(seed) = std::env::var("TRANSFER_SIGNER_SEED") {
            config.signer_seed = seed;
        }

        if let Ok(dir) = std::env::var("TRANSFER_RECEIPT_DIR") {
            config.output.receipt_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("TRANSFER_ISO_DIR") {
            config.output.iso_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Decode the signer seed into key material
    pub fn seed_bytes(&self) -> Result<[u8; 32]> {
        let bytes = hex::decode(&self.signer_seed)
            .map_err(|e| Error::Config(format!("Bad signer seed hex: {}", e)))?;

        <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| Error::Config("Signer seed must be 32 bytes".to_string()))
    }
}
