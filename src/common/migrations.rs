// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
///
/// Tables are created if missing. Setting `RESET_DB=true` drops them first,
/// which throws away every user and search event.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("⚠️  RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("✅ Dropped old tables");
    } else {
        info!("ℹ️  Skipping table drop (RESET_DB not set). Tables will be created if they don't exist.");
    }

    create_schema(pool).await?;

    info!("✅ Database migration completed successfully!");
    Ok(())
}

/// Create the schema without touching existing data
pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    create_user_tables(pool).await?;
    create_search_tables(pool).await?;
    create_indexes(pool).await?;
    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for table in ["search_events", "users"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_user_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            provider TEXT NOT NULL,
            provider_user_id TEXT NOT NULL,
            name TEXT,
            email TEXT,
            avatar TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (provider, provider_user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_search_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // No foreign key on user_id: events reference users but never own them,
    // and dev-mode users have no row.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS search_events (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            term TEXT NOT NULL CHECK (length(trim(term)) > 0),
            timestamp TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_search_events_term ON search_events(term)",
        "CREATE INDEX IF NOT EXISTS idx_search_events_user_time ON search_events(user_id, timestamp)",
    ];

    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

/// In-memory database with the production schema applied.
///
/// Every connection to `sqlite::memory:` opens its own database, so the pool
/// is pinned to a single connection.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    create_schema(&pool).await.unwrap();
    pool
}
