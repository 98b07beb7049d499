//! The notify-price processor: price-drop fan-out to subscribers.

use std::sync::Arc;

use async_trait::async_trait;
use database::models::{Action, ActionType};
use database::{action, feed, subscription, user, DatabaseError};
use futures::future::join_all;
use sqlx::SqlitePool;
use tracing::{debug, error, warn};
use watch_core::{NotificationChannel, PriceDrop};

use crate::error::PipelineError;
use crate::processor::ActionProcessor;

/// Processor for `notify_price` actions.
///
/// The action's `value` names a product; every subscription for it is
/// filtered through the per-subscription desired-price threshold, resolved
/// to a chat identity, and notified in parallel. Delivery is
/// all-or-nothing at the action level: if any single delivery fails the
/// action stays pending and the whole fan-out is retried on a later tick,
/// which can re-notify subscribers that already received the message.
pub struct NotifyPriceProcessor {
    pool: SqlitePool,
    channel: Arc<dyn NotificationChannel>,
}

impl NotifyPriceProcessor {
    /// Create a new notify-price processor.
    pub fn new(pool: SqlitePool, channel: Arc<dyn NotificationChannel>) -> Self {
        Self { pool, channel }
    }
}

#[async_trait]
impl ActionProcessor for NotifyPriceProcessor {
    fn action_type(&self) -> ActionType {
        ActionType::NotifyPrice
    }

    async fn process(&self, action: &Action) -> Result<(), PipelineError> {
        if action.action_type != ActionType::NotifyPrice {
            return Err(PipelineError::WrongActionType {
                id: action.id,
                expected: ActionType::NotifyPrice,
            });
        }

        let product = match database::product::get_product(&self.pool, &action.value).await {
            Ok(p) => p,
            Err(DatabaseError::NotFound { .. }) => {
                warn!(action_id = action.id, asin = %action.value, "unknown product, dropping");
                action::mark_processed(&self.pool, action.id).await?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let subscriptions = subscription::find_by_product(&self.pool, &product.asin).await?;
        if subscriptions.is_empty() {
            warn!(action_id = action.id, asin = %product.asin, "no subscribers, dropping");
            action::mark_processed(&self.pool, action.id).await?;
            return Ok(());
        }

        let price_drop = PriceDrop {
            asin: product.asin.clone(),
            title: product.title.clone(),
            url: product.url.clone(),
            old_price: product.old_price,
            new_price: product.price,
        };

        let mut recipients: Vec<i64> = Vec::new();
        for sub in &subscriptions {
            // Threshold rule: unset always notifies, set notifies at or
            // below the desired price
            if let Some(desired) = sub.desired_price {
                if product.price > desired {
                    debug!(asin = %product.asin, user_id = %sub.user_id, desired,
                        "price above desired threshold, skipping subscriber");
                    continue;
                }
            }

            let watcher = match user::get_user(&self.pool, &sub.user_id).await {
                Ok(u) => u,
                Err(DatabaseError::NotFound { .. }) => {
                    debug!(asin = %product.asin, user_id = %sub.user_id, "subscriber no longer exists, skipping");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            // Secondary in-app surface, independent of chat delivery
            if let Err(e) = feed::create_feed_notification(
                &self.pool,
                &watcher.id,
                &product.asin,
                price_drop.old_price,
                price_drop.new_price,
            )
            .await
            {
                warn!(user_id = %watcher.id, error = %e, "failed to write feed notification");
            }

            match watcher.chat_id {
                Some(chat_id) => recipients.push(chat_id),
                None => debug!(user_id = %watcher.id, "no chat identity, excluded from delivery"),
            }
        }

        if recipients.is_empty() {
            debug!(action_id = action.id, asin = %product.asin, "no deliverable subscribers, nothing to do");
            action::mark_processed(&self.pool, action.id).await?;
            return Ok(());
        }

        let deliveries = recipients
            .iter()
            .map(|chat_id| self.channel.notify(*chat_id, &price_drop));
        let results = join_all(deliveries).await;

        let mut first_failure = None;
        for (chat_id, result) in recipients.iter().zip(results) {
            if let Err(e) = result {
                error!(action_id = action.id, chat_id, error = %e, "delivery failed");
                first_failure.get_or_insert(e);
            }
        }
        if let Some(e) = first_failure {
            // All-or-nothing: leave the action pending so the whole
            // fan-out is retried
            return Err(e.into());
        }

        debug!(action_id = action.id, asin = %product.asin, delivered = recipients.len(),
            "price drop delivered");
        action::mark_processed(&self.pool, action.id).await?;
        Ok(())
    }

    async fn process_next(&self, limit: usize) -> Result<usize, PipelineError> {
        let pending =
            action::find_pending_by_type(&self.pool, ActionType::NotifyPrice, limit as i64).await?;

        let mut handled = 0;
        for act in &pending {
            match self.process(act).await {
                Ok(()) => handled += 1,
                Err(e) => {
                    error!(action_id = act.id, error = %e, "notify action failed, will retry");
                }
            }
        }

        Ok(handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::models::{Product, User};
    use database::{product, Database};
    use mock_catalog::RecordingChannel;

    const ASIN: &str = "B012345678";

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        product::create_product(
            db.pool(),
            &Product {
                asin: ASIN.to_string(),
                title: "Widget".to_string(),
                url: format!("https://www.amazon.com/dp/{ASIN}"),
                image_url: None,
                price: 80.0,
                old_price: 100.0,
                full_price: 100.0,
                lowest_price: 80.0,
                in_stock: true,
                preorder: false,
                category: None,
                created_at: String::new(),
                updated_at: String::new(),
                checked_at: String::new(),
            },
        )
        .await
        .unwrap();
        db
    }

    async fn add_watcher(
        db: &Database,
        id: &str,
        chat_id: Option<i64>,
        desired_price: Option<f64>,
    ) {
        user::create_user(
            db.pool(),
            &User {
                id: id.to_string(),
                name: id.to_string(),
                chat_id,
                monitoring_enabled: true,
                created_at: String::new(),
            },
        )
        .await
        .unwrap();
        subscription::upsert_subscription(db.pool(), ASIN, id, desired_price)
            .await
            .unwrap();
    }

    async fn enqueue(db: &Database, value: &str) -> Action {
        action::create_action(db.pool(), ActionType::NotifyPrice, value, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_fan_out_to_all_subscribers() {
        let db = test_db().await;
        add_watcher(&db, "user-1", Some(11), None).await;
        add_watcher(&db, "user-2", Some(22), None).await;
        let channel = RecordingChannel::new();
        let proc = NotifyPriceProcessor::new(db.pool().clone(), Arc::new(channel.clone()));

        let act = enqueue(&db, ASIN).await;
        proc.process(&act).await.unwrap();

        assert_eq!(channel.sent_count(), 2);
        let (_, delivered) = &channel.sent()[0];
        assert_eq!(delivered.old_price, 100.0);
        assert_eq!(delivered.new_price, 80.0);
        assert!(action::get_action(db.pool(), act.id).await.unwrap().is_processed);
    }

    #[tokio::test]
    async fn test_threshold_filters_subscribers() {
        let db = test_db().await;
        // Current price is 80: thresholds of 90 pass, 50 do not
        add_watcher(&db, "user-1", Some(11), Some(90.0)).await;
        add_watcher(&db, "user-2", Some(22), Some(50.0)).await;
        let channel = RecordingChannel::new();
        let proc = NotifyPriceProcessor::new(db.pool().clone(), Arc::new(channel.clone()));

        let act = enqueue(&db, ASIN).await;
        proc.process(&act).await.unwrap();

        let sent = channel.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 11);
    }

    #[tokio::test]
    async fn test_subscriber_without_chat_identity_is_excluded() {
        let db = test_db().await;
        add_watcher(&db, "user-1", Some(11), None).await;
        add_watcher(&db, "user-2", None, None).await;
        let channel = RecordingChannel::new();
        let proc = NotifyPriceProcessor::new(db.pool().clone(), Arc::new(channel.clone()));

        let act = enqueue(&db, ASIN).await;
        proc.process(&act).await.unwrap();

        // Only one delivery is attempted and the action still completes
        assert_eq!(channel.sent_count(), 1);
        assert!(action::get_action(db.pool(), act.id).await.unwrap().is_processed);

        // The feed record is written for both subscribers
        assert_eq!(feed::unseen_for_user(db.pool(), "user-2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_any_delivery_failure_leaves_action_pending() {
        let db = test_db().await;
        add_watcher(&db, "user-1", Some(11), None).await;
        add_watcher(&db, "user-2", Some(22), None).await;
        let channel = RecordingChannel::new();
        channel.fail_chat(22);
        let proc = NotifyPriceProcessor::new(db.pool().clone(), Arc::new(channel.clone()));

        let act = enqueue(&db, ASIN).await;
        let result = proc.process(&act).await;
        assert!(matches!(result, Err(PipelineError::Notify(_))));

        // The successful delivery went out, but the action is retried whole
        assert_eq!(channel.sent_count(), 1);
        assert!(!action::get_action(db.pool(), act.id).await.unwrap().is_processed);
    }

    #[tokio::test]
    async fn test_missing_product_is_permanent() {
        let db = test_db().await;
        let channel = RecordingChannel::new();
        let proc = NotifyPriceProcessor::new(db.pool().clone(), Arc::new(channel.clone()));

        let act = enqueue(&db, "B099999999").await;
        proc.process(&act).await.unwrap();

        assert_eq!(channel.sent_count(), 0);
        assert!(action::get_action(db.pool(), act.id).await.unwrap().is_processed);
    }

    #[tokio::test]
    async fn test_no_subscribers_is_permanent() {
        let db = test_db().await;
        let channel = RecordingChannel::new();
        let proc = NotifyPriceProcessor::new(db.pool().clone(), Arc::new(channel.clone()));

        let act = enqueue(&db, ASIN).await;
        proc.process(&act).await.unwrap();

        assert_eq!(channel.sent_count(), 0);
        assert!(action::get_action(db.pool(), act.id).await.unwrap().is_processed);
    }

    #[tokio::test]
    async fn test_process_next_counts_and_drains() {
        let db = test_db().await;
        add_watcher(&db, "user-1", Some(11), None).await;
        let channel = RecordingChannel::new();
        let proc = NotifyPriceProcessor::new(db.pool().clone(), Arc::new(channel));

        enqueue(&db, ASIN).await;
        enqueue(&db, "B099999999").await; // permanent: unknown product

        assert_eq!(proc.process_next(10).await.unwrap(), 2);
        assert_eq!(proc.process_next(10).await.unwrap(), 0);
    }
}
