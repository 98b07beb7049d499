//! Secondary in-app feed notification records.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::FeedNotification;

/// Create a feed notification record for one user.
pub async fn create_feed_notification(
    pool: &SqlitePool,
    user_id: &str,
    product_asin: &str,
    old_price: f64,
    new_price: f64,
) -> Result<FeedNotification> {
    let record = sqlx::query_as::<_, FeedNotification>(
        r#"
        INSERT INTO feed_notifications (user_id, product_asin, old_price, new_price)
        VALUES (?, ?, ?, ?)
        RETURNING id, user_id, product_asin, old_price, new_price, seen, created_at
        "#,
    )
    .bind(user_id)
    .bind(product_asin)
    .bind(old_price)
    .bind(new_price)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

/// Get a user's unseen feed notifications, newest first.
pub async fn unseen_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<FeedNotification>> {
    let records = sqlx::query_as::<_, FeedNotification>(
        r#"
        SELECT id, user_id, product_asin, old_price, new_price, seen, created_at
        FROM feed_notifications
        WHERE user_id = ? AND seen = 0
        ORDER BY id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Mark one feed notification as seen.
pub async fn mark_seen(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE feed_notifications
        SET seen = 1
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "FeedNotification",
            id: id.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_feed_lifecycle() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        let record = create_feed_notification(db.pool(), "user-1", "B012345678", 100.0, 80.0)
            .await
            .unwrap();
        assert!(!record.seen);

        let unseen = unseen_for_user(db.pool(), "user-1").await.unwrap();
        assert_eq!(unseen.len(), 1);

        mark_seen(db.pool(), record.id).await.unwrap();
        let unseen = unseen_for_user(db.pool(), "user-1").await.unwrap();
        assert!(unseen.is_empty());
    }
}
