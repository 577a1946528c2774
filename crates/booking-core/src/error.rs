//! Unified error handling for the booking services
//!
//! Every failure a service can report is a variant of [`AppError`]. Each
//! variant knows the wire status it is answered with by default; handlers
//! override the default where an endpoint documents a different code.

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Store Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    /// Stored records overlap; the availability set cannot be derived.
    #[error("Data inconsistency: {0}")]
    DataInconsistency(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==================== Resource Errors ====================
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Activity not found: {0}")]
    ActivityNotFound(String),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Slot conflict: {0}")]
    SlotConflict(String),

    // ==================== Wire Errors ====================
    /// Malformed inbound message or body.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Peer unreachable, connection failure or timeout.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Peer answered with a status outside the documented set.
    #[error("Upstream error: {0}")]
    Upstream(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the default wire status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            AppError::Validation(_)
            | AppError::InvalidRange(_)
            | AppError::MissingField(_)
            | AppError::Protocol(_)
            | AppError::Serialization(_) => 400,

            // 403 Forbidden
            AppError::AlreadyExists(_) | AppError::SlotConflict(_) => 403,

            // 404 Not Found
            AppError::RoomNotFound(_)
            | AppError::ActivityNotFound(_)
            | AppError::ReservationNotFound(_) => 404,

            // 502 Bad Gateway
            AppError::Transport(_) | AppError::Upstream(_) => 502,

            // 500 Internal Server Error
            _ => 500,
        }
    }

    /// Returns the error code used in logs and response titles
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::DataInconsistency(_) => "data_inconsistency",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidRange(_) => "invalid_range",
            AppError::MissingField(_) => "missing_field",
            AppError::RoomNotFound(_) => "room_not_found",
            AppError::ActivityNotFound(_) => "activity_not_found",
            AppError::ReservationNotFound(_) => "reservation_not_found",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::SlotConflict(_) => "slot_conflict",
            AppError::Protocol(_) => "protocol_error",
            AppError::Transport(_) => "transport_error",
            AppError::Upstream(_) => "upstream_error",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// True for the not-found family, whatever the resource
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::RoomNotFound(_)
                | AppError::ActivityNotFound(_)
                | AppError::ReservationNotFound(_)
        )
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
