//! Redirect-following URL resolver.

use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use tracing::debug;
use url::Url;
use watch_core::{CatalogError, UrlResolver};

/// Maximum redirect hops before giving up on a shortened link.
const MAX_REDIRECTS: usize = 10;

/// Resolves shortened product links by following HTTP redirects and
/// returning the final URL.
#[derive(Clone)]
pub struct HttpResolver {
    http: Client,
}

impl HttpResolver {
    /// Build a resolver with the default redirect policy.
    pub fn new() -> Result<Self, CatalogError> {
        let http = Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| CatalogError::Http(e.to_string()))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl UrlResolver for HttpResolver {
    async fn resolve(&self, url: &str) -> Result<String, CatalogError> {
        // Reject anything that is not an absolute http(s) URL up front
        let parsed =
            Url::parse(url).map_err(|e| CatalogError::Resolve(format!("{url}: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CatalogError::Resolve(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        let response = self
            .http
            .get(parsed)
            .send()
            .await
            .map_err(|e| CatalogError::Resolve(e.to_string()))?;

        let resolved = response.url().to_string();
        debug!(from = url, to = %resolved, "url resolved");
        Ok(resolved)
    }
}
