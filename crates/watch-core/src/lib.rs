//! Core traits and types for pricewatch collaborators.
//!
//! This crate provides the shared interface between the action-processing
//! pipeline and its external collaborators:
//!
//! - [`CatalogLookup`] - batch product lookup against the catalog API
//! - [`UrlResolver`] - canonicalization of (possibly shortened) product URLs
//! - [`NotificationChannel`] - price-drop delivery to a chat recipient
//! - [`ProductClassifier`] - best-effort product categorization
//! - [`CatalogItem`] / [`PriceDrop`] - data carried across those seams
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use watch_core::{CatalogError, CatalogItem, CatalogLookup};
//! use async_trait::async_trait;
//!
//! struct EmptyCatalog;
//!
//! #[async_trait]
//! impl CatalogLookup for EmptyCatalog {
//!     async fn get_products(
//!         &self,
//!         _asins: &[String],
//!     ) -> Result<HashMap<String, CatalogItem>, CatalogError> {
//!         Ok(HashMap::new())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "EmptyCatalog"
//!     }
//! }
//! ```

mod asin;
mod error;
mod item;
mod traits;

pub use asin::{extract_asin, is_catalog_host, ASIN_LENGTH};
pub use error::{CatalogError, ClassifyError, NotifyError};
pub use item::{CatalogItem, PriceDrop};
pub use traits::{CatalogLookup, NotificationChannel, ProductClassifier, UrlResolver};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
