//! The check-product processor: periodic price refresh and drop detection.

use std::sync::Arc;

use async_trait::async_trait;
use database::models::{Action, ActionType, Product};
use database::{action, price_stat, product, DatabaseError};
use sqlx::SqlitePool;
use tracing::{debug, error, warn};
use watch_core::{CatalogItem, CatalogLookup};

use crate::add_product::apply_item;
use crate::error::PipelineError;
use crate::processor::ActionProcessor;

/// Price drops smaller than this percentage are refreshed but not recorded
/// in the statistics series.
pub const MIN_SIGNIFICANT_DROP_PCT: f64 = 5.0;

/// Processor for `check_product` work.
///
/// `process_next` does not drain the action queue: the product store hands
/// out the least-recently-checked products, wrapping around once the set
/// is exhausted, and one batched catalog lookup refreshes them all. A
/// detected drop enqueues a `notify_price` action.
pub struct CheckProductProcessor {
    pool: SqlitePool,
    catalog: Arc<dyn CatalogLookup>,
}

impl CheckProductProcessor {
    /// Create a new check-product processor.
    pub fn new(pool: SqlitePool, catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { pool, catalog }
    }

    /// Refresh one product from its catalog item.
    ///
    /// Persists the updated record, records a statistics row for
    /// significant drops, and enqueues a `notify_price` action when the
    /// price decreased.
    async fn refresh(&self, current: &Product, item: &CatalogItem) -> Result<(), PipelineError> {
        let should_notify = item.price < current.price;

        let mut updated = current.clone();
        apply_item(&mut updated, item);
        product::update_product(&self.pool, &updated).await?;

        if should_notify {
            let drop_pct = (current.price - item.price) / current.price * 100.0;
            if drop_pct >= MIN_SIGNIFICANT_DROP_PCT {
                if let Err(e) =
                    price_stat::record_price_stat(&self.pool, &current.asin, current.price, item.price)
                        .await
                {
                    warn!(asin = %current.asin, error = %e, "failed to record price statistics");
                }
            }

            action::create_action(&self.pool, ActionType::NotifyPrice, &current.asin, None)
                .await?;
            debug!(asin = %current.asin, old_price = current.price, new_price = item.price,
                "price dropped, notify enqueued");
        }

        Ok(())
    }
}

#[async_trait]
impl ActionProcessor for CheckProductProcessor {
    fn action_type(&self) -> ActionType {
        ActionType::CheckProduct
    }

    /// Targeted re-check of a single product named by the action's value.
    async fn process(&self, action: &Action) -> Result<(), PipelineError> {
        if action.action_type != ActionType::CheckProduct {
            return Err(PipelineError::WrongActionType {
                id: action.id,
                expected: ActionType::CheckProduct,
            });
        }

        let current = match product::get_product(&self.pool, &action.value).await {
            Ok(p) => p,
            Err(DatabaseError::NotFound { .. }) => {
                warn!(action_id = action.id, asin = %action.value, "unknown product, dropping");
                action::mark_processed(&self.pool, action.id).await?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let items = self
            .catalog
            .get_products(std::slice::from_ref(&current.asin))
            .await?;
        if let Some(item) = items.get(&current.asin) {
            self.refresh(&current, item).await?;
        } else {
            debug!(asin = %current.asin, "product missing from lookup result, skipping");
        }

        action::mark_processed(&self.pool, action.id).await?;
        Ok(())
    }

    /// Refresh the next `limit` products due for a check.
    ///
    /// A failure of the single batched lookup propagates so the whole tick
    /// is retried later; a write failure for one product is logged and
    /// does not stop the rest of the batch.
    async fn process_next(&self, limit: usize) -> Result<usize, PipelineError> {
        let due = product::next_to_check(&self.pool, limit as i64).await?;
        if due.is_empty() {
            return Ok(0);
        }

        let asins: Vec<String> = due.iter().map(|p| p.asin.clone()).collect();
        let items = self.catalog.get_products(&asins).await?;

        let mut refreshed = 0;
        for current in &due {
            let Some(item) = items.get(&current.asin) else {
                debug!(asin = %current.asin, "product missing from lookup result, skipping");
                continue;
            };
            match self.refresh(current, item).await {
                Ok(()) => refreshed += 1,
                Err(e) => {
                    error!(asin = %current.asin, error = %e, "failed to refresh product, will retry next pass");
                }
            }
        }

        Ok(refreshed)
    }
}
