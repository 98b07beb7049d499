//! User CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::User;

/// Create a new user.
pub async fn create_user(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, chat_id, monitoring_enabled)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(user.chat_id)
    .bind(user.monitoring_enabled)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "User",
                    id: user.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, chat_id, monitoring_enabled, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Update an existing user.
pub async fn update_user(pool: &SqlitePool, user: &User) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = ?, chat_id = ?, monitoring_enabled = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.name)
    .bind(user.chat_id)
    .bind(user.monitoring_enabled)
    .bind(&user.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user.id.clone(),
        });
    }

    Ok(())
}

/// Enable or disable monitoring for a user.
pub async fn set_monitoring_enabled(pool: &SqlitePool, id: &str, enabled: bool) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET monitoring_enabled = ?
        WHERE id = ?
        "#,
    )
    .bind(enabled)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a user by ID.
pub async fn delete_user(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List all users.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, chat_id, monitoring_enabled, created_at
        FROM users
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}
