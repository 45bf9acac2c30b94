//! Connection pool and schema for the relational store.
//!
//! The schema is created idempotently at startup. There is no migration history;
//! the `patients` table is the only persisted entity.

use crate::constants::DEFAULT_MAX_CONNECTIONS;
use crate::repositories::StoreResult;
pub use sqlx::sqlite::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

const SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT UNIQUE,
    phone TEXT,
    date_of_birth TEXT,
    gender TEXT,
    address TEXT,
    emergency_contact TEXT,
    medical_info TEXT,
    preferences TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
    "#,
    "CREATE INDEX IF NOT EXISTS idx_patients_last_name ON patients(last_name)",
];

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Open a pool for `database_url`, creating the database file if needed.
///
/// In-memory databases live only as long as their connection, so they get a single
/// connection that is never idled out or recycled.
pub async fn connect(database_url: &str) -> StoreResult<SqlitePool> {
    let memory = is_memory_url(database_url);
    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool_options = if memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options = options.journal_mode(SqliteJournalMode::Wal);
        SqlitePoolOptions::new().max_connections(DEFAULT_MAX_CONNECTIONS)
    };

    let pool = pool_options.connect_with(options).await?;
    tracing::debug!(memory, "opened sqlite pool");
    Ok(pool)
}

/// Create the `patients` table and its indexes if they do not exist.
pub async fn ensure_schema(pool: &SqlitePool) -> StoreResult<()> {
    let mut tx = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(*statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let pool = connect("sqlite::memory:").await.expect("pool should open");
        ensure_schema(&pool).await.expect("first run should succeed");
        ensure_schema(&pool).await.expect("second run should succeed");

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'patients'",
        )
        .fetch_one(&pool)
        .await
        .expect("query should succeed");
        assert_eq!(count, 1);
    }

    #[test]
    fn detects_memory_urls() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite://file?mode=memory&cache=shared"));
        assert!(!is_memory_url("sqlite://clinic.db"));
    }
}
