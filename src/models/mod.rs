use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod item;
mod rating;

pub use item::{ContextTags, MenuItem, TimeOfDay, Weather};
pub use rating::{Rating, User};

use crate::services::explainer::Explanation;

// ============================================================================
// Recommendation API Types
// ============================================================================

/// Request for a personalized menu bundle
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendRequest {
    pub user_id: Uuid,
    /// Total spending budget, must be > 0
    pub budget: f64,
    /// Preferred cuisine; categories the cuisine lacks are filled from the
    /// "International" cuisine
    pub cuisine: String,
    /// Categories the user opted into, must be non-empty
    pub categories: Vec<String>,
    /// Ordered category priority for budget allocation; defaults to the
    /// order of `categories` when absent
    #[serde(default)]
    pub category_priority: Vec<String>,
    /// When true, every requested category must appear in the result or
    /// the request is rejected as infeasible
    #[serde(default)]
    pub require_each_category: bool,
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
}

/// One recommended menu item as returned to the client
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedItem {
    pub item_id: u32,
    pub item_name: String,
    pub description: String,
    pub price: f64,
    pub cuisine: String,
    pub category: String,
    pub predicted_rating: f64,
    pub composite_score: f64,
}

/// Response for a recommendation request
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub success: bool,
    pub recommendations: Vec<RecommendedItem>,
    /// Per-item score attribution, keyed by item id
    pub explanations: HashMap<u32, Explanation>,
    pub total_cost: f64,
}

// ============================================================================
// Rating & Training API Types
// ============================================================================

/// Request to record a rating
#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub user_id: Uuid,
    pub item_id: u32,
    /// Rating value in [1, 5]
    pub rating: f64,
}

/// Generic success/message response for train and rate
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

/// Status of one persisted model artifact
#[derive(Debug, Serialize)]
pub struct ModelArtifact {
    pub exists: bool,
    pub path: String,
    pub size: u64,
}

/// Response for the model info endpoint
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub success: bool,
    pub models: HashMap<String, ModelArtifact>,
}

// ============================================================================
// Catalog & User API Types
// ============================================================================

/// Request to add a menu item to the catalog
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub cuisine: String,
    pub category: String,
    #[serde(default)]
    pub tags: ContextTags,
}

/// Request to register a user
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
}

/// One entry of a user's rating history, joined with item details
#[derive(Debug, Serialize)]
pub struct UserRatingEntry {
    pub item_id: u32,
    pub item_name: String,
    pub category: String,
    pub cuisine: String,
    pub rating: f64,
    pub rated_at: chrono::DateTime<chrono::Utc>,
}

/// Category listing for a cuisine, split into what the cuisine natively
/// offers and what the International cuisine supplements
#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryListing {
    pub cuisine: String,
    pub native_categories: Vec<String>,
    pub supplemented_categories: Vec<String>,
    pub total_categories: Vec<String>,
}
