// Prometheus metrics for the API key service

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_with_registry, Counter, Encoder, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

pub struct Metrics {
    pub registry: Registry,

    pub http_requests_total: Counter,
    pub keys_created_total: Counter,
    pub keys_updated_total: Counter,
    pub keys_deleted_total: Counter,
    pub auth_failures_total: Counter,
    pub db_errors_total: Counter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let http_requests_total = register_counter_with_registry!(
            Opts::new("apikeys_http_requests_total", "Total HTTP requests processed"),
            registry
        )?;

        let keys_created_total = register_counter_with_registry!(
            Opts::new("apikeys_keys_created_total", "API keys created"),
            registry
        )?;

        let keys_updated_total = register_counter_with_registry!(
            Opts::new("apikeys_keys_updated_total", "API keys updated"),
            registry
        )?;

        let keys_deleted_total = register_counter_with_registry!(
            Opts::new("apikeys_keys_deleted_total", "API keys deleted"),
            registry
        )?;

        let auth_failures_total = register_counter_with_registry!(
            Opts::new("apikeys_auth_failures_total", "Rejected authentication attempts"),
            registry
        )?;

        let db_errors_total = register_counter_with_registry!(
            Opts::new("apikeys_db_errors_total", "Database errors"),
            registry
        )?;

        Ok(Self {
            registry,
            http_requests_total,
            keys_created_total,
            keys_updated_total,
            keys_deleted_total,
            auth_failures_total,
            db_errors_total,
        })
    }

    /// Export all metrics in Prometheus text format
    pub fn export(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

// Global metrics instance
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_contains_registered_counters() {
        METRICS.keys_created_total.inc();
        let text = METRICS.export().unwrap();
        assert!(text.contains("apikeys_keys_created_total"));
    }
}
