//! Room model
//!
//! A room is identified by its unique name. Its reservations are stored
//! separately and keyed by `room_name`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bookable room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room name (primary key)
    pub name: String,

    /// When the room was added
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Create a new room stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}
