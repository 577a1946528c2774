//! Room repository implementation

use async_trait::async_trait;
use booking_core::{models::Room, traits::RoomRepository, AppError, AppResult};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, error, instrument};

/// SQLite implementation of RoomRepository
pub struct SqliteRoomRepository {
    pool: SqlitePool,
}

impl SqliteRoomRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for SqliteRoomRepository {
    #[instrument(skip(self, room), fields(room = %room.name))]
    async fn create(&self, room: &Room) -> AppResult<Room> {
        debug!("Creating room: {}", room.name);

        let result = sqlx::query("INSERT OR IGNORE INTO rooms (name, created_at) VALUES (?, ?)")
            .bind(&room.name)
            .bind(room.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating room {}: {}", room.name, e);
                AppError::Database(format!("Failed to create room: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::AlreadyExists(format!("room {}", room.name)));
        }

        Ok(room.clone())
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>("SELECT name, created_at FROM rooms WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding room {}: {}", name, e);
                AppError::Database(format!("Failed to find room: {}", e))
            })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn delete(&self, name: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM rooms WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting room {}: {}", name, e);
                AppError::Database(format!("Failed to delete room: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count rooms: {}", e)))?;

        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    name: String,
    created_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            name: row.name,
            created_at: row.created_at,
        }
    }
}
