use crate::models::{ContextTags, TimeOfDay, Weather};

/// Binary indicator for an item's time-of-day applicability
pub fn time_match(tags: &ContextTags, time: TimeOfDay) -> f64 {
    if tags.matches_time(time) {
        1.0
    } else {
        0.0
    }
}

/// Binary indicator for an item's weather applicability
pub fn weather_match(tags: &ContextTags, weather: Weather) -> f64 {
    if tags.matches_weather(weather) {
        1.0
    } else {
        0.0
    }
}

/// Combined contextual fit in [0, 1]: the average of the time-of-day and
/// weather indicators. Pure and stateless; each dimension is binary, so
/// there are no ties to break.
pub fn context_score(tags: &ContextTags, time: TimeOfDay, weather: Weather) -> f64 {
    (time_match(tags, time) + weather_match(tags, weather)) / 2.0
}
