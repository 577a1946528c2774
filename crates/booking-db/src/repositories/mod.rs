//! Repository implementations
//!
//! Concrete implementations of the repository traits defined in booking-core,
//! using sqlx for SQLite access.

pub mod activity_repo;
pub mod reservation_repo;
pub mod room_repo;

pub use activity_repo::SqliteActivityRepository;
pub use reservation_repo::SqliteReservationRepository;
pub use room_repo::SqliteRoomRepository;

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = crate::create_pool("sqlite::memory:", None).await.unwrap();
    crate::create_schema(&pool).await.unwrap();
    pool
}
