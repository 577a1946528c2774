//! Reservation repository implementation
//!
//! Stores both Room-service slot holds and Reservation-service bookings; the
//! two differ only in whether `activity_name` is set.

use async_trait::async_trait;
use booking_core::{
    models::{NewReservation, Reservation, ReservationFilter},
    traits::ReservationRepository,
    AppError, AppResult,
};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, error, instrument};

const COLUMNS: &str = "id, room_name, activity_name, day, hour, duration, created_at";

/// SQLite implementation of ReservationRepository
pub struct SqliteReservationRepository {
    pool: SqlitePool,
}

impl SqliteReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for SqliteReservationRepository {
    #[instrument(skip(self, reservation), fields(room = %reservation.room_name, slot = %reservation.slot))]
    async fn create(&self, reservation: &NewReservation) -> AppResult<Reservation> {
        debug!("Creating reservation");

        let sql = format!(
            "INSERT INTO reservations (room_name, activity_name, day, hour, duration, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(&reservation.room_name)
            .bind(&reservation.activity_name)
            .bind(reservation.slot.day)
            .bind(reservation.slot.hour)
            .bind(reservation.slot.duration)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating reservation: {}", e);
                AppError::Database(format!("Failed to create reservation: {}", e))
            })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Reservation>> {
        let sql = format!("SELECT {} FROM reservations WHERE id = ?", COLUMNS);
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding reservation {}: {}", id, e);
                AppError::Database(format!("Failed to find reservation: {}", e))
            })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find(&self, filter: &ReservationFilter) -> AppResult<Vec<Reservation>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM reservations WHERE 1 = 1", COLUMNS));

        if let Some(room) = &filter.room_name {
            query.push(" AND room_name = ").push_bind(room.clone());
        }
        if let Some(day) = filter.day {
            query.push(" AND day = ").push_bind(day);
        }
        if let Some(activity) = &filter.activity_name {
            query.push(" AND activity_name = ").push_bind(activity.clone());
        }
        query.push(" ORDER BY id");

        let rows = query
            .build_query_as::<ReservationRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding reservations: {}", e);
                AppError::Database(format!("Failed to fetch reservations: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting reservation {}: {}", id, e);
                AppError::Database(format!("Failed to delete reservation: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_by_room(&self, room_name: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM reservations WHERE room_name = ?")
            .bind(room_name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting holds of {}: {}", room_name, e);
                AppError::Database(format!("Failed to delete reservations: {}", e))
            })?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reservations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count reservations: {}", e)))?;

        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: i64,
    room_name: String,
    activity_name: Option<String>,
    day: i32,
    hour: i32,
    duration: i32,
    created_at: DateTime<Utc>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            id: row.id,
            room_name: row.room_name,
            activity_name: row.activity_name,
            day: row.day,
            hour: row.hour,
            duration: row.duration,
            created_at: row.created_at,
        }
    }
}
