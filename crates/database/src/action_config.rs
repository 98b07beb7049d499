//! Scheduler configuration rows.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{ActionConfig, ActionType};

/// Get all enabled scheduler configs.
///
/// The scheduler reads these once at start-up; config is not hot-reloaded.
pub async fn find_enabled(pool: &SqlitePool) -> Result<Vec<ActionConfig>> {
    let configs = sqlx::query_as::<_, ActionConfig>(
        r#"
        SELECT action_type, interval_minutes, enabled
        FROM action_configs
        WHERE enabled = 1
        ORDER BY action_type
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(configs)
}

/// Get the config for one action type, if present.
pub async fn get_config(pool: &SqlitePool, action_type: ActionType) -> Result<Option<ActionConfig>> {
    let config = sqlx::query_as::<_, ActionConfig>(
        r#"
        SELECT action_type, interval_minutes, enabled
        FROM action_configs
        WHERE action_type = ?
        "#,
    )
    .bind(action_type)
    .fetch_optional(pool)
    .await?;

    Ok(config)
}

/// Create or update the config for one action type.
///
/// Written by configuration tooling; at most one row exists per type.
pub async fn upsert_config(pool: &SqlitePool, config: &ActionConfig) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO action_configs (action_type, interval_minutes, enabled)
        VALUES (?, ?, ?)
        ON CONFLICT(action_type) DO UPDATE SET
            interval_minutes = excluded.interval_minutes,
            enabled = excluded.enabled
        "#,
    )
    .bind(config.action_type)
    .bind(config.interval_minutes)
    .bind(config.enabled)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_find_enabled_skips_disabled() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        upsert_config(
            db.pool(),
            &ActionConfig {
                action_type: ActionType::AddProduct,
                interval_minutes: 1,
                enabled: true,
            },
        )
        .await
        .unwrap();
        upsert_config(
            db.pool(),
            &ActionConfig {
                action_type: ActionType::CheckProduct,
                interval_minutes: 30,
                enabled: false,
            },
        )
        .await
        .unwrap();

        let enabled = find_enabled(db.pool()).await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].action_type, ActionType::AddProduct);

        // Upsert replaces rather than duplicates
        upsert_config(
            db.pool(),
            &ActionConfig {
                action_type: ActionType::AddProduct,
                interval_minutes: 5,
                enabled: true,
            },
        )
        .await
        .unwrap();
        let enabled = find_enabled(db.pool()).await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].interval_minutes, 5);
    }
}
