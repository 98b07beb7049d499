//! Subscription (user watches product) CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Subscription;

/// Create or update a subscription for a (product, user) pair.
///
/// A `None` desired price on re-subscription keeps any previously stored
/// threshold instead of clearing it.
pub async fn upsert_subscription(
    pool: &SqlitePool,
    product_asin: &str,
    user_id: &str,
    desired_price: Option<f64>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO subscriptions (product_asin, user_id, desired_price)
        VALUES (?, ?, ?)
        ON CONFLICT(product_asin, user_id) DO UPDATE SET
            desired_price = COALESCE(excluded.desired_price, subscriptions.desired_price)
        "#,
    )
    .bind(product_asin)
    .bind(user_id)
    .bind(desired_price)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the subscription for a (product, user) pair, if any.
pub async fn find_by_product_and_user(
    pool: &SqlitePool,
    product_asin: &str,
    user_id: &str,
) -> Result<Option<Subscription>> {
    let subscription = sqlx::query_as::<_, Subscription>(
        r#"
        SELECT product_asin, user_id, desired_price, created_at
        FROM subscriptions
        WHERE product_asin = ? AND user_id = ?
        "#,
    )
    .bind(product_asin)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(subscription)
}

/// Get all subscriptions for a product.
pub async fn find_by_product(pool: &SqlitePool, product_asin: &str) -> Result<Vec<Subscription>> {
    let subscriptions = sqlx::query_as::<_, Subscription>(
        r#"
        SELECT product_asin, user_id, desired_price, created_at
        FROM subscriptions
        WHERE product_asin = ?
        ORDER BY created_at
        "#,
    )
    .bind(product_asin)
    .fetch_all(pool)
    .await?;

    Ok(subscriptions)
}

/// Stop a user watching a product.
pub async fn remove_subscription(
    pool: &SqlitePool,
    product_asin: &str,
    user_id: &str,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM subscriptions
        WHERE product_asin = ? AND user_id = ?
        "#,
    )
    .bind(product_asin)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Subscription",
            id: format!("{}/{}", product_asin, user_id),
        });
    }

    Ok(())
}

/// Set or clear the desired-price threshold for a subscription.
pub async fn update_desired_price(
    pool: &SqlitePool,
    product_asin: &str,
    user_id: &str,
    desired_price: Option<f64>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE subscriptions
        SET desired_price = ?
        WHERE product_asin = ? AND user_id = ?
        "#,
    )
    .bind(desired_price)
    .bind(product_asin)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Subscription",
            id: format!("{}/{}", product_asin, user_id),
        });
    }

    Ok(())
}
