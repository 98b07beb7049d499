//! HTTP client for the product catalog API.
//!
//! Provides the concrete [`watch_core::CatalogLookup`] and
//! [`watch_core::UrlResolver`] implementations used in production:
//! a batched product endpoint client and a redirect-following resolver
//! for shortened links.
//!
//! # Example
//!
//! ```no_run
//! use catalog_client::{CatalogConfig, HttpCatalog};
//! use watch_core::CatalogLookup;
//!
//! # async fn example() -> Result<(), watch_core::CatalogError> {
//! let config = CatalogConfig::new("https://catalog.internal").with_api_key("secret");
//! let catalog = HttpCatalog::new(config)?;
//!
//! let items = catalog.get_products(&["B012345678".to_string()]).await?;
//! for (asin, item) in items {
//!     println!("{asin}: {} @ {}", item.title, item.price);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod resolver;

pub use client::HttpCatalog;
pub use config::CatalogConfig;
pub use resolver::HttpResolver;
