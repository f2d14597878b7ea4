//! Metadata repository for database operations
//!
//! A single-row-per-key store; the refresh pipeline uses it to remember the
//! `latest_updated_at` watermark between runs.

use crate::db::connection::DatabasePool;
use crate::db::models::Metadata;
use sqlx::sqlite::SqliteConnection;

/// Metadata repository for the key/value table
pub struct MetadataRepository;

impl MetadataRepository {
    /// Get a metadata value by key
    pub async fn get(pool: &DatabasePool, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row = sqlx::query_as::<_, Metadata>("SELECT key, value FROM metadata WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|m| m.value))
    }

    /// Create or overwrite a metadata entry.
    ///
    /// Runs on a connection so the refresh transaction can own it.
    pub async fn set(
        conn: &mut SqliteConnection,
        key: &str,
        value: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO metadata (key, value) VALUES (?, ?)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::metadata::LATEST_UPDATED_AT;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    async fn setup_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let pool = setup_db().await;

        let value = MetadataRepository::get(&pool, LATEST_UPDATED_AT).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let pool = setup_db().await;

        {
            let mut conn = pool.acquire().await.unwrap();
            MetadataRepository::set(&mut conn, LATEST_UPDATED_AT, "2025-01-01T00:00:00Z")
                .await
                .unwrap();
        }

        let value = MetadataRepository::get(&pool, LATEST_UPDATED_AT).await.unwrap();
        assert_eq!(value.as_deref(), Some("2025-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let pool = setup_db().await;

        {
            let mut conn = pool.acquire().await.unwrap();
            MetadataRepository::set(&mut conn, LATEST_UPDATED_AT, "2025-01-01T00:00:00Z")
                .await
                .unwrap();
            MetadataRepository::set(&mut conn, LATEST_UPDATED_AT, "2025-02-01T00:00:00Z")
                .await
                .unwrap();
        }

        let value = MetadataRepository::get(&pool, LATEST_UPDATED_AT).await.unwrap();
        assert_eq!(value.as_deref(), Some("2025-02-01T00:00:00Z"));
    }
}
