use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::models::{RecommendRequest, RecommendedItem};
use crate::services::explainer::{self, Explanation};
use crate::services::rating_model::{RatingModel, NEUTRAL_RATING};
use crate::services::scoring::{Candidate, ScoringWeights};
use crate::services::selector;
use crate::store::Catalog;

/// Everything a recommendation request produces
#[derive(Debug)]
pub struct Recommendation {
    pub items: Vec<RecommendedItem>,
    pub explanations: HashMap<u32, Explanation>,
    pub total_cost: f64,
}

/// Runs the full recommendation pipeline for one request: assemble
/// candidates from the catalog, predict ratings, score, select under the
/// budget, and explain every selected item.
///
/// Works without a trained model; predictions then use the neutral rating.
pub fn recommend(
    catalog: &Catalog,
    model: Option<&RatingModel>,
    weights: &ScoringWeights,
    request: &RecommendRequest,
) -> AppResult<Recommendation> {
    if request.budget <= 0.0 {
        return Err(AppError::InvalidBudget);
    }
    if request.categories.is_empty() {
        return Err(AppError::NoCategorySelected);
    }

    let eligible = catalog.candidate_items(&request.cuisine, &request.categories);
    tracing::debug!(
        cuisine = %request.cuisine,
        eligible = eligible.len(),
        "Assembled candidate items"
    );

    let mut candidates = Vec::with_capacity(eligible.len());
    for item in eligible {
        let predicted = predict_with_fallback(model, request, item.id)?;
        candidates.push(Candidate::score(
            item,
            predicted,
            request.time_of_day,
            request.weather,
            weights,
        ));
    }

    let selection = selector::select(
        candidates,
        request.budget,
        &request.categories,
        &request.category_priority,
        request.require_each_category,
    )?;

    let mut items = Vec::with_capacity(selection.items.len());
    let mut explanations = HashMap::with_capacity(selection.items.len());
    for candidate in &selection.items {
        let population = population_score(model, candidate.item.id);
        explanations.insert(
            candidate.item.id,
            explainer::explain(candidate, population, weights),
        );
        items.push(RecommendedItem {
            item_id: candidate.item.id,
            item_name: candidate.item.name.clone(),
            description: candidate.item.description.clone(),
            price: candidate.item.price,
            cuisine: candidate.item.cuisine.clone(),
            category: candidate.item.category.clone(),
            predicted_rating: candidate.predicted_rating,
            composite_score: candidate.composite_score,
        });
    }

    tracing::info!(
        user_id = %request.user_id,
        selected = items.len(),
        total_cost = selection.total_cost,
        budget = request.budget,
        "Recommendation computed"
    );

    Ok(Recommendation {
        items,
        explanations,
        total_cost: selection.total_cost,
    })
}

/// Predicts a rating, resolving the cold-start cases: no model yet means
/// the neutral rating, and an item the model has never seen (added to the
/// catalog after training) falls back to its population score.
fn predict_with_fallback(
    model: Option<&RatingModel>,
    request: &RecommendRequest,
    item_id: u32,
) -> AppResult<f64> {
    let Some(model) = model else {
        return Ok(NEUTRAL_RATING);
    };
    match model.predict(request.user_id, item_id) {
        Ok(predicted) => Ok(predicted),
        Err(AppError::UnknownItem(_)) => Ok(model.population_score(item_id)),
        Err(e) => Err(e),
    }
}

fn population_score(model: Option<&RatingModel>, item_id: u32) -> f64 {
    model
        .map(|m| m.population_score(item_id))
        .unwrap_or(NEUTRAL_RATING)
}
