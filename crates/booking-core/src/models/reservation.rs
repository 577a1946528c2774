//! Reservation and slot models
//!
//! A reservation claims the half-open hour range `[hour, hour + duration)` of
//! one room on one day of the week. The Room service stores such records as
//! slot holds (no activity attached); the Reservation service stores them as
//! bookings (activity always present).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Contiguous range of business hours on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// Day of the week, 1 through 7
    pub day: i32,

    /// First reserved hour
    pub hour: i32,

    /// Number of reserved hours
    pub duration: i32,
}

impl Slot {
    pub fn new(day: i32, hour: i32, duration: i32) -> Self {
        Self {
            day,
            hour,
            duration,
        }
    }

    /// Hour at which the slot ends (exclusive); saturates for unvalidated slots
    pub fn end(&self) -> i32 {
        self.hour.saturating_add(self.duration)
    }

    /// Hours claimed by the slot
    pub fn hours(&self) -> Range<i32> {
        self.hour..self.end()
    }

    /// Check whether two slots claim a common hour on the same day
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.day == other.day && self.hour < other.end() && other.hour < self.end()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} {}:00-{}:00", self.day, self.hour, self.end())
    }
}

/// Reservation record as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Store-assigned, monotonic identifier
    pub id: i64,

    pub room_name: String,

    /// Activity the room is booked for; `None` for Room-service holds
    pub activity_name: Option<String>,

    pub day: i32,
    pub hour: i32,
    pub duration: i32,

    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn slot(&self) -> Slot {
        Slot::new(self.day, self.hour, self.duration)
    }
}

/// Reservation about to be inserted; the store assigns `id` and `created_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub room_name: String,
    pub activity_name: Option<String>,
    pub slot: Slot,
}

impl NewReservation {
    /// Slot hold recorded by the Room service
    pub fn hold(room_name: impl Into<String>, slot: Slot) -> Self {
        Self {
            room_name: room_name.into(),
            activity_name: None,
            slot,
        }
    }

    /// Booking recorded by the Reservation service
    pub fn booking(
        room_name: impl Into<String>,
        activity_name: impl Into<String>,
        slot: Slot,
    ) -> Self {
        Self {
            room_name: room_name.into(),
            activity_name: Some(activity_name.into()),
            slot,
        }
    }
}

/// Predicate for filtered finds; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    pub room_name: Option<String>,
    pub day: Option<i32>,
    pub activity_name: Option<String>,
}

impl ReservationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room(mut self, room_name: impl Into<String>) -> Self {
        self.room_name = Some(room_name.into());
        self
    }

    pub fn day(mut self, day: i32) -> Self {
        self.day = Some(day);
        self
    }

    pub fn activity(mut self, activity_name: impl Into<String>) -> Self {
        self.activity_name = Some(activity_name.into());
        self
    }

    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.room_name
            .as_deref()
            .map_or(true, |room| reservation.room_name == room)
            && self.day.map_or(true, |day| reservation.day == day)
            && self.activity_name.as_deref().map_or(true, |activity| {
                reservation.activity_name.as_deref() == Some(activity)
            })
    }
}
