//! Action queue CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Action, ActionType};

/// Enqueue a new pending action.
pub async fn create_action(
    pool: &SqlitePool,
    action_type: ActionType,
    value: &str,
    user_id: Option<&str>,
) -> Result<Action> {
    let action = sqlx::query_as::<_, Action>(
        r#"
        INSERT INTO actions (action_type, value, user_id)
        VALUES (?, ?, ?)
        RETURNING id, action_type, value, user_id, is_processed, created_at
        "#,
    )
    .bind(action_type)
    .bind(value)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(action)
}

/// Get an action by ID.
pub async fn get_action(pool: &SqlitePool, id: i64) -> Result<Action> {
    sqlx::query_as::<_, Action>(
        r#"
        SELECT id, action_type, value, user_id, is_processed, created_at
        FROM actions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Action",
        id: id.to_string(),
    })
}

/// Update an existing action's payload and processed flag.
pub async fn update_action(pool: &SqlitePool, action: &Action) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE actions
        SET value = ?, user_id = ?, is_processed = ?
        WHERE id = ?
        "#,
    )
    .bind(&action.value)
    .bind(&action.user_id)
    .bind(action.is_processed)
    .bind(action.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Action",
            id: action.id.to_string(),
        });
    }

    Ok(())
}

/// Delete an action by ID.
pub async fn delete_action(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM actions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Action",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Get up to `limit` pending actions of one type, oldest first.
pub async fn find_pending_by_type(
    pool: &SqlitePool,
    action_type: ActionType,
    limit: i64,
) -> Result<Vec<Action>> {
    let actions = sqlx::query_as::<_, Action>(
        r#"
        SELECT id, action_type, value, user_id, is_processed, created_at
        FROM actions
        WHERE action_type = ? AND is_processed = 0
        ORDER BY id
        LIMIT ?
        "#,
    )
    .bind(action_type)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(actions)
}

/// Flip an action's processed flag. The action is retained for audit and
/// never re-dispatched afterwards.
pub async fn mark_processed(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE actions
        SET is_processed = 1
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Action",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Count pending actions of one type.
pub async fn count_pending_by_type(pool: &SqlitePool, action_type: ActionType) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM actions
        WHERE action_type = ? AND is_processed = 0
        "#,
    )
    .bind(action_type)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_pool() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_action_lifecycle() {
        let db = test_pool().await;

        let action = create_action(
            db.pool(),
            ActionType::AddProduct,
            "https://www.amazon.com/dp/B012345678",
            Some("user-1"),
        )
        .await
        .unwrap();
        assert!(!action.is_processed);
        assert_eq!(action.user_id.as_deref(), Some("user-1"));

        let pending = find_pending_by_type(db.pool(), ActionType::AddProduct, 10)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, action.id);

        mark_processed(db.pool(), action.id).await.unwrap();
        let fetched = get_action(db.pool(), action.id).await.unwrap();
        assert!(fetched.is_processed);

        // Processed actions are never handed out again
        let pending = find_pending_by_type(db.pool(), ActionType::AddProduct, 10)
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_find_pending_respects_type_and_limit() {
        let db = test_pool().await;

        for i in 0..5 {
            create_action(db.pool(), ActionType::NotifyPrice, &format!("B0000000{i}0"), None)
                .await
                .unwrap();
        }
        create_action(db.pool(), ActionType::CheckProduct, "B099999990", None)
            .await
            .unwrap();

        let pending = find_pending_by_type(db.pool(), ActionType::NotifyPrice, 3)
            .await
            .unwrap();
        assert_eq!(pending.len(), 3);
        // Oldest first
        assert!(pending.windows(2).all(|w| w[0].id < w[1].id));

        assert_eq!(
            count_pending_by_type(db.pool(), ActionType::NotifyPrice)
                .await
                .unwrap(),
            5
        );
    }

    #[tokio::test]
    async fn test_mark_processed_missing_action() {
        let db = test_pool().await;
        let result = mark_processed(db.pool(), 4242).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
