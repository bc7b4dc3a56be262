//! Posted-offer store.
//!
//! A single SQLite table holding the ids of offers already published to the
//! channel. Ids are never removed.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info, Instrument};

use crate::errors::{AppError, AppResult};
use crate::observability::store_span;

/// Persistent set of published offer ids
#[derive(Debug, Clone)]
pub struct PostedStore {
    pool: SqlitePool,
}

impl PostedStore {
    /// Open (creating if needed) the store at `path`
    pub async fn open(path: &str) -> AppResult<Self> {
        info!(path = %path, "Opening posted-offer store");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        Self::connect(options).await
    }

    /// Open a private in-memory store
    pub async fn open_in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> AppResult<Self> {
        // One connection: an in-memory database is private to its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open posted-offer store: {}", e)))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> AppResult<()> {
        sqlx::query("CREATE TABLE IF NOT EXISTS posted (offer_id TEXT PRIMARY KEY)")
            .execute(&self.pool)
            .instrument(store_span("init_schema"))
            .await
            .map_err(|e| AppError::Database(format!("Failed to create posted table: {}", e)))?;

        debug!("Posted-offer schema ready");
        Ok(())
    }

    /// Whether `offer_id` was published before
    pub async fn contains(&self, offer_id: &str) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM posted WHERE offer_id = ?")
            .bind(offer_id)
            .fetch_optional(&self.pool)
            .instrument(store_span("contains"))
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up offer {}: {}", offer_id, e)))?;

        Ok(row.is_some())
    }

    /// Record `offer_id` as published.
    ///
    /// Returns `false` when the id was already present.
    pub async fn record(&self, offer_id: &str) -> AppResult<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO posted (offer_id) VALUES (?)")
            .bind(offer_id)
            .execute(&self.pool)
            .instrument(store_span("record"))
            .await
            .map_err(|e| AppError::Database(format!("Failed to record offer {}: {}", offer_id, e)))?;

        let inserted = result.rows_affected() > 0;
        debug!(offer_id = %offer_id, inserted, "Offer recorded");
        Ok(inserted)
    }

    /// Number of recorded ids
    pub async fn count(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM posted")
            .fetch_one(&self.pool)
            .instrument(store_span("count"))
            .await?;

        Ok(row.get(0))
    }

    /// Close the underlying pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
