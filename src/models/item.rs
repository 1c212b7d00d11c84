use serde::{Deserialize, Serialize};

/// Time-of-day bucket for contextual scoring
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

/// Weather condition for contextual scoring
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Rainy,
    Cloudy,
}

/// Situational applicability flags carried by each menu item.
///
/// An item is considered a match for a request when the flag for the
/// requested time-of-day (resp. weather) is set. Catalogs that predate the
/// cloudy flag simply leave it absent; it defaults to false.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextTags {
    #[serde(default)]
    pub is_morning: bool,
    #[serde(default)]
    pub is_afternoon: bool,
    #[serde(default)]
    pub is_evening: bool,
    #[serde(default)]
    pub is_sunny: bool,
    #[serde(default)]
    pub is_rainy: bool,
    #[serde(default)]
    pub is_cloudy: bool,
}

impl ContextTags {
    /// Whether the item applies to the given time-of-day bucket
    pub fn matches_time(&self, time: TimeOfDay) -> bool {
        match time {
            TimeOfDay::Morning => self.is_morning,
            TimeOfDay::Afternoon => self.is_afternoon,
            TimeOfDay::Evening => self.is_evening,
        }
    }

    /// Whether the item applies to the given weather condition
    pub fn matches_weather(&self, weather: Weather) -> bool {
        match weather {
            Weather::Sunny => self.is_sunny,
            Weather::Rainy => self.is_rainy,
            Weather::Cloudy => self.is_cloudy,
        }
    }
}

/// A single menu item from the catalog.
///
/// Immutable for the engine's purposes; the catalog store owns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    /// Unique identifier for the item
    pub id: u32,
    /// Display name, possibly carrying a portion-size suffix
    /// (e.g. "Sweet Corn Soup (L)")
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in catalog currency units, strictly positive
    pub price: f64,
    /// Cuisine label (e.g. "Chinese", "International")
    pub cuisine: String,
    /// Category label (e.g. "Main Course", "Soup")
    pub category: String,
    /// Situational applicability flags
    #[serde(default)]
    pub tags: ContextTags,
}
