//! Price statistics records.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::PriceStat;

/// Record a price change for a product.
///
/// The percentage change is computed from the given pair; a non-positive
/// old price is recorded as a zero change.
pub async fn record_price_stat(
    pool: &SqlitePool,
    product_asin: &str,
    old_price: f64,
    new_price: f64,
) -> Result<PriceStat> {
    let percentage_change = if old_price > 0.0 {
        (old_price - new_price) / old_price * 100.0
    } else {
        0.0
    };

    let stat = sqlx::query_as::<_, PriceStat>(
        r#"
        INSERT INTO price_stats (product_asin, old_price, new_price, percentage_change)
        VALUES (?, ?, ?, ?)
        RETURNING id, product_asin, old_price, new_price, percentage_change, created_at
        "#,
    )
    .bind(product_asin)
    .bind(old_price)
    .bind(new_price)
    .bind(percentage_change)
    .fetch_one(pool)
    .await?;

    Ok(stat)
}

/// Get all recorded stats for a product, newest first.
pub async fn list_for_product(pool: &SqlitePool, product_asin: &str) -> Result<Vec<PriceStat>> {
    let stats = sqlx::query_as::<_, PriceStat>(
        r#"
        SELECT id, product_asin, old_price, new_price, percentage_change, created_at
        FROM price_stats
        WHERE product_asin = ?
        ORDER BY id DESC
        "#,
    )
    .bind(product_asin)
    .fetch_all(pool)
    .await?;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_record_computes_percentage() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        let stat = record_price_stat(db.pool(), "B012345678", 100.0, 80.0)
            .await
            .unwrap();
        assert_eq!(stat.percentage_change, 20.0);

        let stat = record_price_stat(db.pool(), "B012345678", 0.0, 80.0)
            .await
            .unwrap();
        assert_eq!(stat.percentage_change, 0.0);

        let stats = list_for_product(db.pool(), "B012345678").await.unwrap();
        assert_eq!(stats.len(), 2);
    }
}
