//! Activity repository implementation

use async_trait::async_trait;
use booking_core::{models::Activity, traits::ActivityRepository, AppError, AppResult};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{error, instrument};

/// SQLite implementation of ActivityRepository
pub struct SqliteActivityRepository {
    pool: SqlitePool,
}

impl SqliteActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRepository for SqliteActivityRepository {
    #[instrument(skip(self, activity), fields(activity = %activity.name))]
    async fn create(&self, activity: &Activity) -> AppResult<Activity> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO activities (name, created_at) VALUES (?, ?)")
                .bind(&activity.name)
                .bind(activity.created_at)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error creating activity {}: {}", activity.name, e);
                    AppError::Database(format!("Failed to create activity: {}", e))
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::AlreadyExists(format!(
                "activity {}",
                activity.name
            )));
        }

        Ok(activity.clone())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Activity>> {
        let row = sqlx::query_as::<_, ActivityRow>(
            "SELECT name, created_at FROM activities WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding activity {}: {}", name, e);
            AppError::Database(format!("Failed to find activity: {}", e))
        })?;

        Ok(row.map(|row| Activity {
            name: row.name,
            created_at: row.created_at,
        }))
    }

    #[instrument(skip(self))]
    async fn delete(&self, name: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM activities WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting activity {}: {}", name, e);
                AppError::Database(format!("Failed to delete activity: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activities")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count activities: {}", e)))?;

        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    name: String,
    created_at: DateTime<Utc>,
}
