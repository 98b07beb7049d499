//! Product CRUD and check-rotation operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Product;

/// Create a new product.
pub async fn create_product(pool: &SqlitePool, product: &Product) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO products
            (asin, title, url, image_url, price, old_price, full_price,
             lowest_price, in_stock, preorder, category)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&product.asin)
    .bind(&product.title)
    .bind(&product.url)
    .bind(&product.image_url)
    .bind(product.price)
    .bind(product.old_price)
    .bind(product.full_price)
    .bind(product.lowest_price)
    .bind(product.in_stock)
    .bind(product.preorder)
    .bind(&product.category)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Product",
                    id: product.asin.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a product by its catalog identifier.
pub async fn get_product(pool: &SqlitePool, asin: &str) -> Result<Product> {
    sqlx::query_as::<_, Product>(
        r#"
        SELECT asin, title, url, image_url, price, old_price, full_price,
               lowest_price, in_stock, preorder, category,
               created_at, updated_at, checked_at
        FROM products
        WHERE asin = ?
        "#,
    )
    .bind(asin)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Product",
        id: asin.to_string(),
    })
}

/// Update an existing product's mutable fields.
pub async fn update_product(pool: &SqlitePool, product: &Product) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET title = ?, url = ?, image_url = ?, price = ?, old_price = ?,
            full_price = ?, lowest_price = ?, in_stock = ?, preorder = ?,
            category = ?, updated_at = datetime('now')
        WHERE asin = ?
        "#,
    )
    .bind(&product.title)
    .bind(&product.url)
    .bind(&product.image_url)
    .bind(product.price)
    .bind(product.old_price)
    .bind(product.full_price)
    .bind(product.lowest_price)
    .bind(product.in_stock)
    .bind(product.preorder)
    .bind(&product.category)
    .bind(&product.asin)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Product",
            id: product.asin.clone(),
        });
    }

    Ok(())
}

/// Get the next `limit` products due for a periodic price check.
///
/// Products are handed out least-recently-checked first and stamped with
/// the current time, so repeated calls rotate through the whole set and
/// wrap around once it is exhausted.
pub async fn next_to_check(pool: &SqlitePool, limit: i64) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT asin, title, url, image_url, price, old_price, full_price,
               lowest_price, in_stock, preorder, category,
               created_at, updated_at, checked_at
        FROM products
        ORDER BY checked_at, asin
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    for product in &products {
        sqlx::query(
            r#"
            UPDATE products
            SET checked_at = datetime('now')
            WHERE asin = ?
            "#,
        )
        .bind(&product.asin)
        .execute(pool)
        .await?;
    }

    Ok(products)
}

/// Count monitored products.
pub async fn count_products(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM products
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn sample_product(asin: &str, price: f64) -> Product {
        Product {
            asin: asin.to_string(),
            title: format!("Product {asin}"),
            url: format!("https://www.amazon.com/dp/{asin}"),
            image_url: None,
            price,
            old_price: price,
            full_price: price,
            lowest_price: price,
            in_stock: true,
            preorder: false,
            category: None,
            created_at: String::new(),
            updated_at: String::new(),
            checked_at: String::new(),
        }
    }

    #[tokio::test]
    async fn test_product_crud() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        let mut product = sample_product("B012345678", 100.0);
        create_product(db.pool(), &product).await.unwrap();

        // Duplicate create is rejected
        let result = create_product(db.pool(), &product).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));

        product.old_price = product.price;
        product.price = 80.0;
        product.lowest_price = 80.0;
        update_product(db.pool(), &product).await.unwrap();

        let fetched = get_product(db.pool(), "B012345678").await.unwrap();
        assert_eq!(fetched.price, 80.0);
        assert_eq!(fetched.old_price, 100.0);
        assert_eq!(fetched.lowest_price, 80.0);
    }

    #[tokio::test]
    async fn test_next_to_check_rotates() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        for asin in ["B000000010", "B000000020", "B000000030"] {
            create_product(db.pool(), &sample_product(asin, 10.0)).await.unwrap();
        }

        let first = next_to_check(db.pool(), 2).await.unwrap();
        assert_eq!(first.len(), 2);

        // The remaining product comes next; after that the set wraps around
        let second = next_to_check(db.pool(), 2).await.unwrap();
        assert_eq!(second.len(), 2);
        assert!(second.iter().any(|p| !first.iter().any(|f| f.asin == p.asin)));
    }
}
