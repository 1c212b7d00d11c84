use std::collections::BTreeMap;

use serde::Serialize;

use crate::services::scoring::{Candidate, ScoringWeights};

/// Contribution keys, in the order they are reported
pub const USER_HISTORY: &str = "user_history";
pub const TIME_OF_DAY: &str = "time_of_day";
pub const WEATHER: &str = "weather";
pub const PRICE: &str = "price";

/// Additive decomposition of one candidate's composite score.
///
/// `base` plus the signed contributions reproduces `composite_score`; the
/// equality is a tested invariant, not a display approximation.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    /// Population score of the item (the cold-start estimate)
    pub base: f64,
    /// Named signed deltas on top of the base
    pub contributions: BTreeMap<String, f64>,
    pub composite_score: f64,
    /// One-sentence rendering for display
    pub summary: String,
}

/// Explains a scored candidate against the item's population score.
///
/// Each contribution is the marginal effect of its term in the scoring
/// formula; the user-history contribution is the gap between the
/// personalized prediction and the population score, which is exactly 0.0
/// when the prediction fell back to the population estimate.
pub fn explain(candidate: &Candidate, population_score: f64, weights: &ScoringWeights) -> Explanation {
    let user_history = candidate.predicted_rating - population_score;
    let time_of_day = weights.time_weight * candidate.time_match;
    let weather = weights.weather_weight * candidate.weather_match;
    let price = weights.price_weight * candidate.item.price;

    let mut contributions = BTreeMap::new();
    contributions.insert(USER_HISTORY.to_string(), user_history);
    contributions.insert(TIME_OF_DAY.to_string(), time_of_day);
    contributions.insert(WEATHER.to_string(), weather);
    contributions.insert(PRICE.to_string(), price);

    let summary = summarize(&candidate.item.name, population_score, &contributions);

    Explanation {
        base: population_score,
        contributions,
        composite_score: candidate.composite_score,
        summary,
    }
}

fn label(key: &str) -> &'static str {
    match key {
        USER_HISTORY => "your rating history",
        TIME_OF_DAY => "the time of day",
        WEATHER => "the weather",
        PRICE => "budget use",
        _ => "other factors",
    }
}

/// Renders the two strongest non-zero contributions into a sentence
fn summarize(item_name: &str, base: f64, contributions: &BTreeMap<String, f64>) -> String {
    let mut ranked: Vec<(&str, f64)> = contributions
        .iter()
        .filter(|(_, &v)| v != 0.0)
        .map(|(k, &v)| (k.as_str(), v))
        .collect();
    ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()).then(a.0.cmp(b.0)));

    match ranked.as_slice() {
        [] => format!("{} matches the popular baseline of {:.2}.", item_name, base),
        [(key, value)] => format!(
            "{} scores {:+.2} from {} on a base of {:.2}.",
            item_name,
            value,
            label(key),
            base
        ),
        [(first_key, first), (second_key, second), ..] => format!(
            "{} is driven by {} ({:+.2}) and {} ({:+.2}) on a base of {:.2}.",
            item_name,
            label(first_key),
            first,
            label(second_key),
            second,
            base
        ),
    }
}
