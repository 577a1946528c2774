//! Activity model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named activity a room can be reserved for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique activity name (primary key)
    pub name: String,

    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}
