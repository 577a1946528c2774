//! Booking Store Layer
//!
//! Repository implementations of the `booking-core` store traits:
//!
//! - In-memory repositories (default, one per service process)
//! - SQLite repositories via sqlx, selected when `database.url` is set
//! - Connection pool creation and schema setup

pub mod memory;
pub mod pool;
pub mod repositories;

pub use memory::{MemoryActivityRepository, MemoryReservationRepository, MemoryRoomRepository};
pub use pool::{create_pool, create_schema};
pub use repositories::*;

// Re-export commonly used types
pub use booking_core::{AppError, AppResult};
pub use sqlx::SqlitePool;
