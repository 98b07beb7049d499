//! Collaborator trait definitions.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{CatalogError, ClassifyError, NotifyError};
use crate::item::{CatalogItem, PriceDrop};

/// Batch product lookup against the catalog API.
///
/// This trait is object-safe and used as `Arc<dyn CatalogLookup>` by the
/// pipeline processors.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Fetch product data for a batch of identifiers in one call.
    ///
    /// Identifiers absent from the returned map were not found in the
    /// catalog; that is a normal outcome, not an error. An `Err` from this
    /// method means the lookup itself failed and callers may retry.
    async fn get_products(
        &self,
        asins: &[String],
    ) -> Result<HashMap<String, CatalogItem>, CatalogError>;

    /// Get a human-readable name for this catalog implementation.
    fn name(&self) -> &str;
}

/// Resolution of a (possibly shortened) product URL to its canonical form.
#[async_trait]
pub trait UrlResolver: Send + Sync {
    /// Follow redirects and return the final URL.
    async fn resolve(&self, url: &str) -> Result<String, CatalogError>;
}

/// Delivery of a price-drop message to one chat recipient.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Deliver a price-drop notification to the given chat.
    ///
    /// Implementations must return an error on delivery failure so the
    /// caller can apply its retry policy.
    async fn notify(&self, chat_id: i64, price_drop: &PriceDrop) -> Result<(), NotifyError>;

    /// Get a human-readable name for this channel implementation.
    fn name(&self) -> &str;
}

/// Best-effort product categorization.
///
/// Failures from this trait never affect the primary outcome of an action.
#[async_trait]
pub trait ProductClassifier: Send + Sync {
    /// Classify a catalog item, returning a category label.
    async fn classify(&self, item: &CatalogItem) -> Result<String, ClassifyError>;
}
