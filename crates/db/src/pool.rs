//! SQLite connection pool.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::DbError;

/// Type alias for the shared SQLite pool used across the whole application.
pub type DbPool = SqlitePool;

/// Create a new connection pool from the given `database_url`.
///
/// The database file is created if it does not exist yet.  `max_connections`
/// controls the pool ceiling; in-memory databases must use `1` since every
/// connection would otherwise see its own empty database.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, DbError> {
    info!("Connecting to database (max_connections={})", max_connections);
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Run embedded SQLx migrations located in `./migrations` (relative to the
/// workspace root at build time).
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    info!("Running database migrations");
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Connect and migrate in one step.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<DbPool, DbError> {
    let pool = create_pool(database_url, max_connections).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_create_contributions_table() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name = 'contributions'",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(tables.len(), 1);
    }

    #[tokio::test]
    async fn migrations_are_rerunnable() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        run_migrations(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn file_database_is_created_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map_contributions.db");
        let url = format!("sqlite://{}", path.display());

        let _pool = connect(&url, 2).await.unwrap();
        assert!(path.exists());
    }
}
