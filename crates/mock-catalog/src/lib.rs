//! Mock collaborator implementations for testing the pipeline.
//!
//! These implement the `watch-core` traits without any network I/O:
//!
//! - [`StaticCatalog`] - in-memory catalog with adjustable prices
//! - [`FailingCatalog`] - catalog whose lookups always fail
//! - [`StaticResolver`] - URL resolver backed by a redirect map
//! - [`FailingResolver`] - resolver that always fails
//! - [`RecordingChannel`] - notification channel that records deliveries
//! - [`StaticClassifier`] / [`FailingClassifier`] - classifier doubles
//!
//! # Example
//!
//! ```rust
//! use mock_catalog::StaticCatalog;
//! use watch_core::{CatalogItem, CatalogLookup};
//!
//! # async fn example() {
//! let catalog = StaticCatalog::new();
//! catalog.insert(CatalogItem {
//!     asin: "B012345678".to_string(),
//!     title: "Widget".to_string(),
//!     url: "https://www.amazon.com/dp/B012345678".to_string(),
//!     image_url: None,
//!     price: 100.0,
//!     full_price: 120.0,
//!     in_stock: true,
//!     preorder: false,
//! });
//!
//! let items = catalog
//!     .get_products(&["B012345678".to_string()])
//!     .await
//!     .unwrap();
//! assert_eq!(items["B012345678"].price, 100.0);
//! # }
//! ```

mod catalog;
mod channel;
mod classifier;
mod resolver;

pub use catalog::{FailingCatalog, StaticCatalog};
pub use channel::RecordingChannel;
pub use classifier::{FailingClassifier, StaticClassifier};
pub use resolver::{FailingResolver, StaticResolver};
