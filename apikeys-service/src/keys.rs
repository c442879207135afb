// Key generation and usage aggregation

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Request body for POST /keys
#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    pub name: String,
    pub permissions: Option<serde_json::Value>,
    pub rate_limit: Option<i32>,
    pub expires_in_days: Option<i64>,
}

/// Request body for PUT /keys/:id
#[derive(Debug, Deserialize)]
pub struct UpdateKeyRequest {
    pub name: Option<String>,
    pub status: Option<String>,
    pub permissions: Option<serde_json::Value>,
    pub rate_limit: Option<i32>,
}

/// One row of the last-30-days request log
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RequestSample {
    pub endpoint: String,
    pub method: String,
    pub status_code: i32,
    pub created_at: DateTime<Utc>,
}

/// Aggregated usage statistics for one key
#[derive(Debug, Serialize)]
pub struct UsageStats {
    pub total_requests: usize,
    pub success_rate: f64,
    pub endpoints: Vec<String>,
    pub recent_requests: Vec<RequestSample>,
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// New public key: `ck_live_<32 hex>`
pub fn generate_api_key() -> String {
    format!("ck_live_{}", random_hex(16))
}

/// New secret: `ck_secret_<32 hex>`. Shown to the caller exactly once.
pub fn generate_api_secret() -> String {
    format!("ck_secret_{}", random_hex(16))
}

/// SHA-256 hex digest of a secret, the only form that is persisted
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Default permission set for new keys: read-only
pub fn default_permissions() -> serde_json::Value {
    serde_json::json!({
        "read_transfers": true,
        "create_transfers": false,
        "update_transfers": false,
        "delete_transfers": false,
    })
}

/// Aggregate the request log into usage stats.
///
/// `rows` must be ordered newest first. Status codes below 400 count as
/// successful; an empty log yields a 0% success rate, not NaN.
pub fn compute_usage_stats(rows: Vec<RequestSample>) -> UsageStats {
    let total = rows.len();

    let success_rate = if total == 0 {
        0.0
    } else {
        let ok = rows.iter().filter(|r| r.status_code < 400).count();
        (ok as f64 / total as f64) * 100.0
    };

    let mut endpoints: Vec<String> = Vec::new();
    for row in &rows {
        if !endpoints.contains(&row.endpoint) {
            endpoints.push(row.endpoint.clone());
        }
    }

    let recent_requests = rows.into_iter().take(10).collect();

    UsageStats {
        total_requests: total,
        success_rate,
        endpoints,
        recent_requests,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(endpoint: &str, status_code: i32) -> RequestSample {
        RequestSample {
            endpoint: endpoint.to_string(),
            method: "GET".to_string(),
            status_code,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_key_and_secret_shapes() {
        let key = generate_api_key();
        let secret = generate_api_secret();

        assert!(key.starts_with("ck_live_"));
        assert_eq!(key.len(), "ck_live_".len() + 32);
        assert!(secret.starts_with("ck_secret_"));
        assert_eq!(secret.len(), "ck_secret_".len() + 32);
    }

    #[test]
    fn test_generated_keys_are_distinct() {
        assert_ne!(generate_api_key(), generate_api_key());
        assert_ne!(generate_api_secret(), generate_api_secret());
    }

    #[test]
    fn test_hash_secret_is_not_the_secret() {
        let secret = generate_api_secret();
        let hash = hash_secret(&secret);

        assert_eq!(hash.len(), 64);
        assert!(!hash.contains("ck_secret_"));
        assert_eq!(hash, hash_secret(&secret));
    }

    #[test]
    fn test_usage_stats_empty_log() {
        let stats = compute_usage_stats(vec![]);
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert!(stats.endpoints.is_empty());
        assert!(stats.recent_requests.is_empty());
    }

    #[test]
    fn test_usage_stats_aggregation() {
        let rows = vec![
            sample("/v1/transfers", 200),
            sample("/v1/transfers", 201),
            sample("/v1/accounts", 200),
            sample("/v1/transfers", 429),
        ];

        let stats = compute_usage_stats(rows);
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.success_rate, 75.0);
        assert_eq!(stats.endpoints, vec!["/v1/transfers", "/v1/accounts"]);
        assert_eq!(stats.recent_requests.len(), 4);
    }

    #[test]
    fn test_usage_stats_recent_capped_at_ten() {
        let rows: Vec<_> = (0..25).map(|i| sample(&format!("/e{}", i), 200)).collect();
        let stats = compute_usage_stats(rows);

        assert_eq!(stats.total_requests, 25);
        assert_eq!(stats.recent_requests.len(), 10);
        // Newest-first ordering is preserved
        assert_eq!(stats.recent_requests[0].endpoint, "/e0");
    }
}
