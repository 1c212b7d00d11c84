use crate::config::Config;
use crate::models::{MenuItem, TimeOfDay, Weather};
use crate::services::context;
use crate::store::{family_key, portion_key};

/// Engine scoring weights; configuration, never user input
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub time_weight: f64,
    pub weather_weight: f64,
    /// Reward per currency unit of price; positive so that selections use
    /// the budget they were given instead of leaving it on the table
    pub price_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            time_weight: 0.5,
            weather_weight: 0.5,
            price_weight: 0.02,
        }
    }
}

impl From<&Config> for ScoringWeights {
    fn from(config: &Config) -> Self {
        Self {
            time_weight: config.time_weight,
            weather_weight: config.weather_weight,
            price_weight: config.price_weight,
        }
    }
}

/// A scored menu item, built fresh per recommendation request and discarded
/// with the response
#[derive(Debug, Clone)]
pub struct Candidate {
    pub item: MenuItem,
    pub predicted_rating: f64,
    pub time_match: f64,
    pub weather_match: f64,
    pub composite_score: f64,
    /// Portion-size exclusivity group key
    pub portion_key: String,
    /// Dish-family diversity group key
    pub family_key: String,
}

impl Candidate {
    /// Scores one item for a request.
    ///
    /// composite = predicted_rating
    ///           + time_weight * time_match
    ///           + weather_weight * weather_match
    ///           + price_weight * price
    ///
    /// The price term is kept separable so the explainer can attribute it
    /// independently; the score is monotone in the rating and both context
    /// indicators, and identical inputs always score identically.
    pub fn score(
        item: MenuItem,
        predicted_rating: f64,
        time: TimeOfDay,
        weather: Weather,
        weights: &ScoringWeights,
    ) -> Self {
        let time_match = context::time_match(&item.tags, time);
        let weather_match = context::weather_match(&item.tags, weather);
        let composite_score = predicted_rating
            + weights.time_weight * time_match
            + weights.weather_weight * weather_match
            + weights.price_weight * item.price;

        let portion_key = portion_key(&item.name);
        let family_key = family_key(&item.name);

        Self {
            item,
            predicted_rating,
            time_match,
            weather_match,
            composite_score,
            portion_key,
            family_key,
        }
    }
}
