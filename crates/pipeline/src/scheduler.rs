//! Timer-driven dispatch of processors per action type.

use std::sync::Arc;
use std::time::Duration;

use database::action_config;
use sqlx::SqlitePool;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::PipelineError;
use crate::processor::ActionProcessor;

/// How many pending items one tick hands to a processor.
pub const BATCH_LIMIT: usize = 10;

/// Dispatches each enabled action type to its processor on a repeating
/// per-type interval.
///
/// Configs are read once at start-up; a config without a registered
/// processor is logged and skipped. Each bound pair runs on its own tokio
/// task: the timer fires immediately on start and then every
/// `interval_minutes`. Tick errors are caught and logged so one failing
/// tick never stops future ticks. A scheduler moves Unstarted → Running →
/// Stopped exactly once and is never restarted.
pub struct ActionScheduler {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl ActionScheduler {
    /// Load enabled configs, bind processors, and start one timer task per
    /// bound pair.
    pub async fn start(
        pool: &SqlitePool,
        processors: Vec<Arc<dyn ActionProcessor>>,
    ) -> Result<Self, PipelineError> {
        let configs = action_config::find_enabled(pool).await?;
        let (shutdown, _) = watch::channel(false);
        let mut tasks = Vec::new();

        for config in configs {
            let Some(processor) = processors
                .iter()
                .find(|p| p.action_type() == config.action_type)
            else {
                warn!(action_type = %config.action_type, "no processor registered, skipping config");
                continue;
            };

            // A zero interval would busy-loop; clamp to one minute
            let period = Duration::from_secs(config.interval_minutes.max(1) as u64 * 60);
            info!(action_type = %config.action_type, interval_minutes = config.interval_minutes,
                "scheduling processor");

            let processor = Arc::clone(processor);
            let mut stop_rx = shutdown.subscribe();
            tasks.push(tokio::spawn(async move {
                let action_type = processor.action_type();
                let mut timer = tokio::time::interval(period);
                loop {
                    // Shutdown is only observed between ticks: an in-flight
                    // tick always runs to completion
                    tokio::select! {
                        _ = stop_rx.changed() => {
                            debug!(action_type = %action_type, "scheduler task stopping");
                            break;
                        }
                        _ = timer.tick() => {
                            match processor.process_next(BATCH_LIMIT).await {
                                Ok(0) => debug!(action_type = %action_type, "tick: nothing to process"),
                                Ok(count) => info!(action_type = %action_type, count, "tick complete"),
                                Err(e) => error!(action_type = %action_type, error = %e, "tick failed"),
                            }
                        }
                    }
                }
            }));
        }

        Ok(Self { shutdown, tasks })
    }

    /// Number of timer tasks that were bound at start-up.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Cancel all future timer firings.
    ///
    /// Safe to call more than once. Does not cancel or await an in-flight
    /// tick; callers needing a graceful drain must track active work
    /// themselves.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use database::models::{Action, ActionConfig, ActionType};
    use database::Database;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A processor that only counts its ticks.
    #[derive(Clone, Default)]
    struct TickCounter {
        ticks: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ActionProcessor for TickCounter {
        fn action_type(&self) -> ActionType {
            ActionType::CheckProduct
        }

        async fn process(&self, _action: &Action) -> Result<(), PipelineError> {
            Ok(())
        }

        async fn process_next(&self, _limit: usize) -> Result<usize, PipelineError> {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn set_config(db: &Database, action_type: ActionType, enabled: bool) {
        action_config::upsert_config(
            db.pool(),
            &ActionConfig {
                action_type,
                interval_minutes: 60,
                enabled,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_first_tick_fires_immediately() {
        let db = test_db().await;
        set_config(&db, ActionType::CheckProduct, true).await;

        let counter = TickCounter::default();
        let scheduler = ActionScheduler::start(db.pool(), vec![Arc::new(counter.clone())])
            .await
            .unwrap();
        assert_eq!(scheduler.task_count(), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.ticks.load(Ordering::SeqCst), 1);

        scheduler.stop();
    }

    #[tokio::test]
    async fn test_disabled_config_registers_no_timer() {
        let db = test_db().await;
        set_config(&db, ActionType::CheckProduct, false).await;

        let counter = TickCounter::default();
        let scheduler = ActionScheduler::start(db.pool(), vec![Arc::new(counter.clone())])
            .await
            .unwrap();
        assert_eq!(scheduler.task_count(), 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_config_without_processor_is_skipped() {
        let db = test_db().await;
        set_config(&db, ActionType::LinkAccounts, true).await;
        set_config(&db, ActionType::CheckProduct, true).await;

        let counter = TickCounter::default();
        let scheduler = ActionScheduler::start(db.pool(), vec![Arc::new(counter)])
            .await
            .unwrap();

        // The unmatched link_accounts config is skipped, not fatal
        assert_eq!(scheduler.task_count(), 1);
        scheduler.stop();
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let db = test_db().await;
        set_config(&db, ActionType::CheckProduct, true).await;

        let scheduler = ActionScheduler::start(db.pool(), vec![Arc::new(TickCounter::default())])
            .await
            .unwrap();
        scheduler.stop();
        scheduler.stop();
    }
}
