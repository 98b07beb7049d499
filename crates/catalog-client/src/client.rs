//! Catalog API HTTP client.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use watch_core::{CatalogError, CatalogItem, CatalogLookup};

use crate::config::CatalogConfig;

/// One product entry in the batched products response.
#[derive(Debug, Deserialize)]
struct ApiProduct {
    asin: String,
    title: String,
    url: String,
    #[serde(default)]
    image_url: Option<String>,
    price: f64,
    #[serde(default)]
    full_price: Option<f64>,
    #[serde(default = "default_true")]
    in_stock: bool,
    #[serde(default)]
    preorder: bool,
}

fn default_true() -> bool {
    true
}

/// Body of the batched products response.
#[derive(Debug, Deserialize)]
struct ProductsResponse {
    products: Vec<ApiProduct>,
}

impl From<ApiProduct> for CatalogItem {
    fn from(p: ApiProduct) -> Self {
        let full_price = p.full_price.unwrap_or(p.price);
        CatalogItem {
            asin: p.asin.to_ascii_uppercase(),
            title: p.title,
            url: p.url,
            image_url: p.image_url,
            price: p.price,
            full_price,
            in_stock: p.in_stock,
            preorder: p.preorder,
        }
    }
}

/// Client for the batched catalog products endpoint.
#[derive(Clone)]
pub struct HttpCatalog {
    http: Client,
    config: CatalogConfig,
}

impl HttpCatalog {
    /// Build a client from the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::Http(e.to_string()))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl CatalogLookup for HttpCatalog {
    async fn get_products(
        &self,
        asins: &[String],
    ) -> Result<HashMap<String, CatalogItem>, CatalogError> {
        if asins.is_empty() {
            return Ok(HashMap::new());
        }

        let url = self.config.products_url(asins);
        debug!(batch = asins.len(), "catalog lookup");

        let mut request = self.http.get(&url);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: ProductsResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

        Ok(body
            .products
            .into_iter()
            .map(|p| {
                let item: CatalogItem = p.into();
                (item.asin.clone(), item)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "HttpCatalog"
    }
}
