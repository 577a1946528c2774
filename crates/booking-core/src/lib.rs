//! Booking Core Library
//!
//! Foundational types shared by the Room, Activity and Reservation services:
//!
//! - Domain models (Room, Activity, Reservation, Slot)
//! - Repository traits for the keyed stores
//! - `BookingValidator` for the business-hours window
//! - Unified error handling with status-code mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;
pub mod validation;

pub use config::AppConfig;
pub use error::AppError;
pub use validation::BookingValidator;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
