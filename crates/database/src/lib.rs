//! SQLite persistence layer for pricewatch.
//!
//! This crate provides async database operations for actions, products,
//! subscriptions, users, and price statistics using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{action, models::ActionType, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:pricewatch.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Enqueue an action
//!     let action = action::create_action(
//!         db.pool(),
//!         ActionType::AddProduct,
//!         "https://www.amazon.com/dp/B012345678",
//!         Some("user-1"),
//!     )
//!     .await?;
//!     println!("enqueued action {}", action.id);
//!
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod action_config;
pub mod error;
pub mod feed;
pub mod models;
pub mod price_stat;
pub mod product;
pub mod subscription;
pub mod user;

pub use error::{DatabaseError, Result};
pub use models::{
    Action, ActionConfig, ActionType, FeedNotification, PriceStat, Product, Subscription, User,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Set high enough to handle concurrent processor ticks.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/pricewatch.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::User;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_user_crud() {
        let db = test_db().await;

        // Create
        let user = User {
            id: "test-uuid-123".to_string(),
            name: "Alice".to_string(),
            chat_id: Some(1001),
            monitoring_enabled: true,
            created_at: String::new(),
        };
        user::create_user(db.pool(), &user).await.unwrap();

        // Read
        let fetched = user::get_user(db.pool(), &user.id).await.unwrap();
        assert_eq!(fetched.name, "Alice");
        assert_eq!(fetched.chat_id, Some(1001));

        // Update
        user::set_monitoring_enabled(db.pool(), &user.id, false)
            .await
            .unwrap();
        let fetched = user::get_user(db.pool(), &user.id).await.unwrap();
        assert!(!fetched.monitoring_enabled);

        // Delete
        user::delete_user(db.pool(), &user.id).await.unwrap();
        let result = user::get_user(db.pool(), &user.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
