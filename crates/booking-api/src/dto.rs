//! Request DTOs
//!
//! Typed views of the request fields each endpoint accepts. Fields come from
//! the query string or a JSON body; aliases used by older clients are listed
//! after the canonical name.

use booking_core::{models::Slot, AppError, AppResult};
use booking_net::Params;
use booking_services::ReservationRequest;
use validator::Validate;

/// Field aliases for a room name on the Room service
pub const ROOM_NAME: &[&str] = &["name", "room_name"];

/// Field aliases for an activity name on the Activity service
pub const ACTIVITY_NAME: &[&str] = &["name", "activity_name"];

/// Request naming a single room or activity
#[derive(Debug, Clone, Validate)]
pub struct NameRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

impl NameRequest {
    pub fn from_params(params: &Params, aliases: &[&str]) -> AppResult<Self> {
        let request = Self {
            name: params.require_str(aliases)?.trim().to_string(),
        };
        request.validate()?;
        Ok(request)
    }
}

/// Room name plus day
#[derive(Debug, Clone, Validate)]
pub struct DayRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    pub day: i32,
}

impl DayRequest {
    pub fn from_params(params: &Params, aliases: &[&str]) -> AppResult<Self> {
        let request = Self {
            name: params.require_str(aliases)?.trim().to_string(),
            day: params.require_i32(&["day"])?,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Room name plus slot, for `/reserve` and `/release` on the Room service
#[derive(Debug, Clone, Validate)]
pub struct SlotRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    pub day: i32,
    pub hour: i32,
    pub duration: i32,
}

impl SlotRequest {
    pub fn from_params(params: &Params) -> AppResult<Self> {
        let request = Self {
            name: params.require_str(ROOM_NAME)?.trim().to_string(),
            day: params.require_i32(&["day"])?,
            hour: params.require_i32(&["hour"])?,
            duration: params.require_i32(&["duration"])?,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn slot(&self) -> Slot {
        Slot::new(self.day, self.hour, self.duration)
    }
}

/// Reservation service `/reserve`
#[derive(Debug, Clone, Validate)]
pub struct BookingRequest {
    #[validate(length(min = 1, message = "room is required"))]
    pub room: String,

    #[validate(length(min = 1, message = "activity is required"))]
    pub activity: String,

    pub day: i32,
    pub hour: i32,
    pub duration: i32,
}

impl BookingRequest {
    pub fn from_params(params: &Params) -> AppResult<Self> {
        let request = Self {
            room: params.require_str(&["room", "room_name"])?.trim().to_string(),
            activity: params
                .require_str(&["activity", "activity_name"])?
                .trim()
                .to_string(),
            day: params.require_i32(&["day"])?,
            hour: params.require_i32(&["hour"])?,
            duration: params.require_i32(&["duration"])?,
        };
        request.validate()?;
        Ok(request)
    }
}

impl From<BookingRequest> for ReservationRequest {
    fn from(request: BookingRequest) -> Self {
        ReservationRequest::new(
            request.room,
            request.activity,
            Slot::new(request.day, request.hour, request.duration),
        )
    }
}

/// Reservation service `/display`
#[derive(Debug, Clone, Validate)]
pub struct DisplayRequest {
    #[validate(range(min = 1, message = "id must be positive"))]
    pub id: i64,
}

impl DisplayRequest {
    pub fn from_params(params: &Params) -> AppResult<Self> {
        let raw = params.require_str(&["id"])?;
        let id = raw
            .trim()
            .parse()
            .map_err(|_| AppError::Validation(format!("id must be an integer, got '{}'", raw)))?;
        let request = Self { id };
        request.validate()?;
        Ok(request)
    }
}
