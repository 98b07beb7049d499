//! The add-product processor: URL submission → monitored product.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use database::models::{Action, ActionType, Product};
use database::{action, price_stat, product, subscription, user, DatabaseError};
use sqlx::SqlitePool;
use tracing::{debug, error, warn};
use watch_core::{
    extract_asin, is_catalog_host, CatalogItem, CatalogLookup, ProductClassifier, UrlResolver,
};

use crate::error::PipelineError;
use crate::processor::ActionProcessor;

/// Configuration for the add-product processor.
#[derive(Debug, Clone)]
pub struct AddProductConfig {
    /// Domains a resolved URL must point at to be accepted.
    pub catalog_domains: Vec<String>,
}

impl Default for AddProductConfig {
    fn default() -> Self {
        Self {
            catalog_domains: vec!["amazon.com".to_string()],
        }
    }
}

/// Processor for `add_product` actions.
///
/// The action's `value` is a (possibly shortened) product URL and its
/// `user_id` identifies the submitting user. The URL is resolved,
/// validated against the catalog domains, reduced to an ASIN, looked up in
/// the catalog, and turned into a product record plus a subscription for
/// the submitter. A price drop discovered on re-submission enqueues a
/// `notify_price` action.
pub struct AddProductProcessor {
    pool: SqlitePool,
    catalog: Arc<dyn CatalogLookup>,
    resolver: Arc<dyn UrlResolver>,
    classifier: Option<Arc<dyn ProductClassifier>>,
    config: AddProductConfig,
}

impl AddProductProcessor {
    /// Create a new add-product processor.
    pub fn new(
        pool: SqlitePool,
        catalog: Arc<dyn CatalogLookup>,
        resolver: Arc<dyn UrlResolver>,
        classifier: Option<Arc<dyn ProductClassifier>>,
        config: AddProductConfig,
    ) -> Self {
        Self {
            pool,
            catalog,
            resolver,
            classifier,
            config,
        }
    }

    /// Run the pre-lookup stages for one action: user gate, URL
    /// resolution, domain check, ASIN extraction.
    ///
    /// Returns `Ok(Some(asin))` when the action is ready for a catalog
    /// lookup. Every permanent failure marks the action processed here and
    /// returns `Ok(None)`; only store failures surface as `Err`.
    async fn prepare(&self, action: &Action) -> Result<Option<String>, PipelineError> {
        let Some(user_id) = action.user_id.as_deref() else {
            warn!(action_id = action.id, "add-product action without user, dropping");
            action::mark_processed(&self.pool, action.id).await?;
            return Ok(None);
        };

        let watcher = match user::get_user(&self.pool, user_id).await {
            Ok(u) => u,
            Err(DatabaseError::NotFound { .. }) => {
                warn!(action_id = action.id, user_id, "unknown user, dropping");
                action::mark_processed(&self.pool, action.id).await?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        if !watcher.monitoring_enabled {
            warn!(action_id = action.id, user_id, "monitoring disabled, dropping");
            action::mark_processed(&self.pool, action.id).await?;
            return Ok(None);
        }

        let resolved = match self.resolver.resolve(&action.value).await {
            Ok(url) => url,
            Err(e) => {
                warn!(action_id = action.id, url = %action.value, error = %e, "url did not resolve, dropping");
                action::mark_processed(&self.pool, action.id).await?;
                return Ok(None);
            }
        };

        if !is_catalog_host(&resolved, &self.config.catalog_domains) {
            warn!(action_id = action.id, url = %resolved, "not a catalog url, dropping");
            action::mark_processed(&self.pool, action.id).await?;
            return Ok(None);
        }

        let Some(asin) = extract_asin(&resolved) else {
            warn!(action_id = action.id, url = %resolved, "no identifier in url, dropping");
            action::mark_processed(&self.pool, action.id).await?;
            return Ok(None);
        };

        Ok(Some(asin))
    }

    /// Apply the post-lookup stages for one action with a pre-fetched
    /// catalog result.
    async fn apply(
        &self,
        action: &Action,
        asin: &str,
        item: Option<&CatalogItem>,
    ) -> Result<(), PipelineError> {
        let Some(item) = item else {
            warn!(action_id = action.id, asin, "catalog has no such item, dropping");
            action::mark_processed(&self.pool, action.id).await?;
            return Ok(());
        };

        // prepare() guarantees a user id
        let user_id = action.user_id.as_deref().unwrap_or_default();

        match product::get_product(&self.pool, asin).await {
            Err(DatabaseError::NotFound { .. }) => {
                self.create_product(asin, item).await?;
            }
            Err(e) => return Err(e.into()),
            Ok(existing) => {
                let already_subscribed =
                    subscription::find_by_product_and_user(&self.pool, asin, user_id)
                        .await?
                        .is_some();
                let unchanged = item.price == existing.price
                    && item.full_price == existing.full_price
                    && item.in_stock == existing.in_stock
                    && item.preorder == existing.preorder;

                if unchanged && already_subscribed {
                    debug!(action_id = action.id, asin, "nothing changed, nothing to do");
                    action::mark_processed(&self.pool, action.id).await?;
                    return Ok(());
                }

                if !unchanged {
                    let should_notify = item.price < existing.price;
                    let mut updated = existing.clone();
                    apply_item(&mut updated, item);
                    product::update_product(&self.pool, &updated).await?;

                    if should_notify {
                        action::create_action(&self.pool, ActionType::NotifyPrice, asin, None)
                            .await?;
                        debug!(asin, old_price = existing.price, new_price = item.price,
                            "price dropped on re-submission, notify enqueued");
                    }
                }
            }
        }

        subscription::upsert_subscription(&self.pool, asin, user_id, None).await?;
        action::mark_processed(&self.pool, action.id).await?;
        Ok(())
    }

    /// Create a product record from catalog data.
    ///
    /// Classification and the initial statistics row are best-effort: the
    /// product is created even when they fail.
    async fn create_product(&self, asin: &str, item: &CatalogItem) -> Result<(), PipelineError> {
        let mut created = new_product(item);

        if let Some(classifier) = &self.classifier {
            match classifier.classify(item).await {
                Ok(category) => created.category = Some(category),
                Err(e) => warn!(asin, error = %e, "classification failed, continuing without"),
            }
        }

        product::create_product(&self.pool, &created).await?;

        // Seed the statistics series with a zero-delta row
        if let Err(e) = price_stat::record_price_stat(&self.pool, asin, item.price, item.price).await
        {
            warn!(asin, error = %e, "failed to seed price statistics");
        }

        debug!(asin, price = item.price, "product created");
        Ok(())
    }
}

/// Build a new product record from catalog data. The initial delta is
/// zero: current price is stored as both `price` and `old_price`.
fn new_product(item: &CatalogItem) -> Product {
    Product {
        asin: item.asin.clone(),
        title: item.title.clone(),
        url: item.url.clone(),
        image_url: item.image_url.clone(),
        price: item.price,
        old_price: item.price,
        full_price: item.full_price,
        lowest_price: item.price,
        in_stock: item.in_stock,
        preorder: item.preorder,
        category: None,
        created_at: String::new(),
        updated_at: String::new(),
        checked_at: String::new(),
    }
}

/// Copy the externally-sourced mutable fields of a catalog item onto an
/// existing product. `old_price` becomes the pre-update price and the
/// running minimum is preserved.
pub(crate) fn apply_item(product: &mut Product, item: &CatalogItem) {
    product.old_price = product.price;
    product.price = item.price;
    product.full_price = item.full_price;
    product.lowest_price = product.lowest_price.min(item.price);
    product.in_stock = item.in_stock;
    product.preorder = item.preorder;
    product.title = item.title.clone();
    product.url = item.url.clone();
    product.image_url = item.image_url.clone();
}

#[async_trait]
impl ActionProcessor for AddProductProcessor {
    fn action_type(&self) -> ActionType {
        ActionType::AddProduct
    }

    /// Single-action path. Unlike the batch path, a failed catalog lookup
    /// propagates here so the caller can retry the action later.
    async fn process(&self, action: &Action) -> Result<(), PipelineError> {
        if action.action_type != ActionType::AddProduct {
            return Err(PipelineError::WrongActionType {
                id: action.id,
                expected: ActionType::AddProduct,
            });
        }

        let Some(asin) = self.prepare(action).await? else {
            return Ok(());
        };
        let items = self.catalog.get_products(std::slice::from_ref(&asin)).await?;
        self.apply(action, &asin, items.get(&asin)).await
    }

    /// Batch path: resolve every candidate URL first, drop the invalid
    /// ones, then issue exactly one catalog call for the union of valid
    /// identifiers.
    ///
    /// If that one batched call fails, every valid action is marked
    /// processed anyway. Giving up instead of retrying keeps a catalog
    /// outage from amplifying the same submissions across ticks, at the
    /// cost of making users resubmit.
    async fn process_next(&self, limit: usize) -> Result<usize, PipelineError> {
        let pending =
            action::find_pending_by_type(&self.pool, ActionType::AddProduct, limit as i64).await?;
        if pending.is_empty() {
            return Ok(0);
        }

        let mut valid: Vec<(&Action, String)> = Vec::new();
        let mut handled = 0;
        for action in &pending {
            match self.prepare(action).await? {
                Some(asin) => valid.push((action, asin)),
                None => handled += 1,
            }
        }
        if valid.is_empty() {
            return Ok(handled);
        }

        let mut asins: Vec<String> = valid.iter().map(|(_, asin)| asin.clone()).collect();
        asins.sort();
        asins.dedup();

        match self.catalog.get_products(&asins).await {
            Err(e) => {
                error!(error = %e, batch = valid.len(), "batched catalog lookup failed, giving up on batch");
                for (action, _) in &valid {
                    match action::mark_processed(&self.pool, action.id).await {
                        Ok(()) => handled += 1,
                        Err(e) => error!(action_id = action.id, error = %e, "failed to mark action processed"),
                    }
                }
                Ok(handled)
            }
            Ok(items) => {
                for (action, asin) in &valid {
                    match self.apply(action, asin, items.get(asin.as_str())).await {
                        Ok(()) => handled += 1,
                        Err(e) => {
                            error!(action_id = action.id, asin = %asin, error = %e, "failed to process add-product action, will retry");
                        }
                    }
                }
                Ok(handled)
            }
        }
    }
}
