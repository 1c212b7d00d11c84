use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user, read-only to the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Display name
    pub name: String,
}

impl User {
    /// Creates a new user with a random identifier
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}

/// A single user-item rating. Unique per (user, item); upserts replace the
/// previous value and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub user_id: Uuid,
    pub item_id: u32,
    /// Rating value in [1, 5]
    pub value: f64,
    pub rated_at: DateTime<Utc>,
}

impl Rating {
    /// Creates a rating stamped with the current time
    pub fn new(user_id: Uuid, item_id: u32, value: f64) -> Self {
        Self {
            user_id,
            item_id,
            value,
            rated_at: Utc::now(),
        }
    }
}
