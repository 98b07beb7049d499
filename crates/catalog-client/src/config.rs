//! Configuration types for the catalog client.

use std::time::Duration;

/// Configuration for connecting to the catalog API.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog API (e.g., "https://catalog.internal").
    pub base_url: String,
    /// API key sent as a bearer token, if required.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl CatalogConfig {
    /// Default per-request timeout.
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the batched products endpoint URL for a set of identifiers.
    pub fn products_url(&self, asins: &[String]) -> String {
        format!("{}/v1/products?asins={}", self.base_url, asins.join(","))
    }
}
