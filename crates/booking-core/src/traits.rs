//! Repository traits for the keyed stores
//!
//! Each service owns one or more stores supporting create, delete and
//! predicate-filtered find. Implementations live in `booking-db`.

use crate::error::AppError;
use crate::models::{Activity, NewReservation, Reservation, ReservationFilter, Room};
use async_trait::async_trait;

/// Room store
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Insert a room; fails with `AlreadyExists` if the name is taken
    async fn create(&self, room: &Room) -> Result<Room, AppError>;

    /// Find room by name
    async fn find_by_name(&self, name: &str) -> Result<Option<Room>, AppError>;

    /// Hard-delete a room; returns false when no such room existed
    async fn delete(&self, name: &str) -> Result<bool, AppError>;

    /// Count stored rooms
    async fn count(&self) -> Result<i64, AppError>;

    async fn exists(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.find_by_name(name).await?.is_some())
    }
}

/// Activity store
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Insert an activity; fails with `AlreadyExists` if the name is taken
    async fn create(&self, activity: &Activity) -> Result<Activity, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Activity>, AppError>;

    /// Hard-delete an activity; returns false when no such activity existed
    async fn delete(&self, name: &str) -> Result<bool, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    async fn exists(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.find_by_name(name).await?.is_some())
    }
}

/// Reservation store (slot holds in the Room service, bookings in the
/// Reservation service)
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a reservation; the store assigns a monotonic id
    async fn create(&self, reservation: &NewReservation) -> Result<Reservation, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Reservation>, AppError>;

    /// Find reservations matching the filter, ordered by id
    async fn find(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, AppError>;

    /// Delete by id; returns false when no such reservation existed
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Delete every reservation of a room; returns the number removed
    async fn delete_by_room(&self, room_name: &str) -> Result<u64, AppError>;

    async fn count(&self) -> Result<i64, AppError>;
}
