//! URL resolver doubles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use watch_core::{CatalogError, UrlResolver};

/// A resolver backed by a redirect map.
///
/// URLs without a mapping resolve to themselves, which models a canonical
/// URL that needs no shortening expansion.
#[derive(Clone, Default)]
pub struct StaticResolver {
    redirects: Arc<Mutex<HashMap<String, String>>>,
}

impl StaticResolver {
    /// Create a pass-through resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a short URL to its resolved form.
    pub fn redirect(&self, from: impl Into<String>, to: impl Into<String>) {
        self.redirects
            .lock()
            .unwrap()
            .insert(from.into(), to.into());
    }
}

#[async_trait]
impl UrlResolver for StaticResolver {
    async fn resolve(&self, url: &str) -> Result<String, CatalogError> {
        let redirects = self.redirects.lock().unwrap();
        Ok(redirects.get(url).cloned().unwrap_or_else(|| url.to_string()))
    }
}

/// A resolver that always fails.
#[derive(Clone, Copy, Default)]
pub struct FailingResolver;

#[async_trait]
impl UrlResolver for FailingResolver {
    async fn resolve(&self, url: &str) -> Result<String, CatalogError> {
        Err(CatalogError::Resolve(format!("cannot resolve {url}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_resolver() {
        let resolver = StaticResolver::new();
        resolver.redirect("https://amzn.to/abc", "https://www.amazon.com/dp/B012345678");

        assert_eq!(
            resolver.resolve("https://amzn.to/abc").await.unwrap(),
            "https://www.amazon.com/dp/B012345678"
        );
        assert_eq!(
            resolver
                .resolve("https://www.amazon.com/dp/B0AAAAAAAA")
                .await
                .unwrap(),
            "https://www.amazon.com/dp/B0AAAAAAAA"
        );
    }
}
