use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Rating, User};

/// Seed file layout for the ratings store
#[derive(Debug, Deserialize)]
struct RatingsSeed {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    ratings: Vec<Rating>,
}

/// In-memory users and ratings store.
///
/// Ratings are unique per (user, item); recording a rating for an existing
/// pair replaces the previous value and timestamp.
#[derive(Debug, Default)]
pub struct RatingStore {
    users: HashMap<Uuid, User>,
    ratings: HashMap<(Uuid, u32), Rating>,
}

impl RatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads users and ratings from a JSON seed file
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let seed: RatingsSeed = serde_json::from_str(&raw)?;
        let mut store = Self::new();
        for user in seed.users {
            store.users.insert(user.id, user);
        }
        for rating in seed.ratings {
            store.ratings.insert((rating.user_id, rating.item_id), rating);
        }
        Ok(store)
    }

    pub fn add_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn user_exists(&self, user_id: Uuid) -> bool {
        self.users.contains_key(&user_id)
    }

    /// Upserts a rating for a (user, item) pair
    pub fn record(&mut self, rating: Rating) {
        self.ratings.insert((rating.user_id, rating.item_id), rating);
    }

    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }

    /// All ratings, ordered by (user id, item id) so that consumers see a
    /// stable snapshot regardless of map iteration order
    pub fn snapshot(&self) -> Vec<Rating> {
        let mut ratings: Vec<Rating> = self.ratings.values().cloned().collect();
        ratings.sort_by(|a, b| (a.user_id, a.item_id).cmp(&(b.user_id, b.item_id)));
        ratings
    }

    /// One user's ratings, ordered by item id
    pub fn for_user(&self, user_id: Uuid) -> Vec<Rating> {
        let mut ratings: Vec<Rating> = self
            .ratings
            .values()
            .filter(|rating| rating.user_id == user_id)
            .cloned()
            .collect();
        ratings.sort_by_key(|rating| rating.item_id);
        ratings
    }
}
