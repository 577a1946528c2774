//! Business-hours validation
//!
//! Reservations may start on any day 1..=7 at any hour 9..=17 and must end
//! by the close of business at 17:00.

use crate::error::AppError;
use crate::models::Slot;
use crate::AppResult;

/// First bookable day of the week
pub const FIRST_DAY: i32 = 1;

/// Last bookable day of the week
pub const LAST_DAY: i32 = 7;

/// First start-hour label of the business day
pub const OPENING_HOUR: i32 = 9;

/// Last start-hour label and the hour every booking must end by
pub const CLOSING_HOUR: i32 = 17;

/// Start-hour labels of one business day, in order
pub const BUSINESS_HOURS: [i32; 9] = [9, 10, 11, 12, 13, 14, 15, 16, 17];

/// Pure validation of a reservation's shape
pub struct BookingValidator;

impl BookingValidator {
    /// Check `day`, `hour` and `duration` against the business-hours window.
    ///
    /// The first violated constraint is reported as `AppError::InvalidRange`.
    pub fn validate(day: i32, hour: i32, duration: i32) -> AppResult<()> {
        if !(FIRST_DAY..=LAST_DAY).contains(&day) {
            return Err(AppError::InvalidRange(format!(
                "day value of reservation should be {} to {}, got {}",
                FIRST_DAY, LAST_DAY, day
            )));
        }

        if !(OPENING_HOUR..=CLOSING_HOUR).contains(&hour) {
            return Err(AppError::InvalidRange(format!(
                "hour value of reservation should be {} to {}, got {}",
                OPENING_HOUR, CLOSING_HOUR, hour
            )));
        }

        if duration < 1 {
            return Err(AppError::InvalidRange(format!(
                "duration should be at least 1 hour, got {}",
                duration
            )));
        }

        // hour is within the window here, so the subtraction cannot overflow
        if duration > CLOSING_HOUR - hour {
            return Err(AppError::InvalidRange(format!(
                "reservation at {}:00 for {}h ends after {}:00",
                hour, duration, CLOSING_HOUR
            )));
        }

        Ok(())
    }

    pub fn validate_slot(slot: &Slot) -> AppResult<()> {
        Self::validate(slot.day, slot.hour, slot.duration)
    }
}
