//! Local cache persistence.
//!
//! The full aggregate is persisted as a single opaque JSON blob under one
//! fixed key in a SQLite key/value table, standing in for the browser's
//! local storage. Write failures are swallowed (data loss on the next
//! reload is accepted); read failures are treated as "absent".

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::models::AppData;

/// The one fixed key the aggregate snapshot lives under.
pub const SNAPSHOT_KEY: &str = "facdir.appData";

/// Initialize the cache database connection pool and run migrations.
pub async fn init_cache(cache_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = cache_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", cache_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Create the key/value table if it does not exist.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Single-blob snapshot store for the aggregate.
#[derive(Clone)]
pub struct CacheStore {
    pool: SqlitePool,
}

impl CacheStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist the aggregate snapshot. Failures are logged and swallowed:
    /// the cache is an optimization, never a reason to fail an operation.
    pub async fn save(&self, data: &AppData) {
        let blob = match serde_json::to_string(data) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!("Failed to serialize cache snapshot: {}", e);
                return;
            }
        };

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(SNAPSHOT_KEY)
        .bind(&blob)
        .bind(&now)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!("Failed to persist cache snapshot: {}", e);
        }
    }

    /// Load the aggregate snapshot. Any read or parse failure is treated as
    /// an absent cache.
    pub async fn load(&self) -> Option<AppData> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(SNAPSHOT_KEY)
            .fetch_optional(&self.pool)
            .await;

        let blob: String = match row {
            Ok(Some(row)) => row.get("value"),
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!("Cache read failed, treating as absent: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&blob) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::debug!("Cache blob malformed, treating as absent: {}", e);
                None
            }
        }
    }
}
