//! SQLite connection pool management
//!
//! Provides utilities for creating the pool and the tables each service uses.

use booking_core::{AppError, AppResult};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{info, warn};

/// Default maximum number of connections in the pool
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT: u64 = 30;

/// Create a SQLite connection pool
///
/// # Arguments
///
/// * `database_url` - SQLite connection URL (e.g., "sqlite://room.db?mode=rwc")
/// * `max_connections` - Maximum number of connections in the pool (None = default)
///
/// An in-memory URL is pinned to a single connection that never expires, so
/// every query sees the same database.
pub async fn create_pool(
    database_url: &str,
    max_connections: Option<u32>,
) -> AppResult<SqlitePool> {
    info!("Creating database connection pool");

    let in_memory = database_url.contains(":memory:");
    let max_conns = if in_memory {
        1
    } else {
        max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    };

    let mut options = SqlitePoolOptions::new()
        .max_connections(max_conns)
        .acquire_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT));
    if in_memory {
        options = options.idle_timeout(None).max_lifetime(None);
    }

    let pool = options.connect(database_url).await.map_err(|e| {
        warn!("Failed to create database pool: {}", e);
        AppError::Pool(format!("Failed to connect to database: {}", e))
    })?;

    info!(
        "Database pool created successfully with {} max connections",
        max_conns
    );

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::Database(format!("Database health check failed: {}", e)))?;

    Ok(pool)
}

/// Create the rooms, activities and reservations tables if missing
pub async fn create_schema(pool: &SqlitePool) -> AppResult<()> {
    const STATEMENTS: [&str; 4] = [
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            name TEXT PRIMARY KEY NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS activities (
            name TEXT PRIMARY KEY NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS reservations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            room_name TEXT NOT NULL,
            activity_name TEXT,
            day INTEGER NOT NULL,
            hour INTEGER NOT NULL,
            duration INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_reservations_room_day
            ON reservations (room_name, day)
        "#,
    ];

    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await.map_err(|e| {
            warn!("Failed to create schema: {}", e);
            AppError::Database(format!("Failed to create schema: {}", e))
        })?;
    }

    info!("Database schema ready");
    Ok(())
}
