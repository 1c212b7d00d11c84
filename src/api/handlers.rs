use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Path as UrlPath, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    CategoryListing, CreateItemRequest, CreateUserRequest, InfoResponse, MenuItem, ModelArtifact,
    RateRequest, Rating, RecommendRequest, RecommendResponse, StatusResponse, User,
    UserRatingEntry,
};
use crate::services::rating_model::{RatingModel, MODEL_ARTIFACT};
use crate::services::recommender;
use crate::services::scoring::ScoringWeights;

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Rebuilds the rating model from the current ratings store.
///
/// The replacement model is built on a blocking thread from a snapshot of
/// the stores, persisted, and then swapped in; prediction reads keep using
/// the previous snapshot until the swap. Retraining is idempotent.
pub async fn train(State(state): State<AppState>) -> AppResult<Json<StatusResponse>> {
    let snapshot = state.ratings.read().await.snapshot();
    let item_ids = state.catalog.read().await.item_ids();
    let model_dir = state.config.model_dir.clone();

    let model = tokio::task::spawn_blocking(move || -> AppResult<RatingModel> {
        let model = RatingModel::train(&snapshot, &item_ids)?;
        let path = model.save(&model_dir)?;
        tracing::info!(path = %path.display(), "Model artifact persisted");
        Ok(model)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Training task panicked: {e}")))??;

    let message = format!(
        "Model trained on {} users and {} items",
        model.rated_user_count(),
        model.rated_item_count()
    );
    *state.model.write().await = Some(Arc::new(model));

    tracing::info!("{message}");
    Ok(Json(StatusResponse {
        success: true,
        message,
    }))
}

/// Computes a personalized menu bundle under the request's budget
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<RecommendResponse>> {
    tracing::info!(
        user_id = %request.user_id,
        budget = request.budget,
        cuisine = %request.cuisine,
        categories = ?request.categories,
        "Processing recommendation request"
    );

    let model = state.model.read().await.clone();
    let catalog = state.catalog.read().await;
    let weights = ScoringWeights::from(state.config.as_ref());

    let result = recommender::recommend(&catalog, model.as_deref(), &weights, &request)?;

    Ok(Json(RecommendResponse {
        success: true,
        recommendations: result.items,
        explanations: result.explanations,
        total_cost: result.total_cost,
    }))
}

/// Records (or overwrites) one user's rating of one item.
/// Does not retrain the model; call /api/train for that.
pub async fn rate(
    State(state): State<AppState>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<StatusResponse>> {
    if !(1.0..=5.0).contains(&request.rating) {
        return Err(AppError::InvalidRating(request.rating));
    }
    if !state.catalog.read().await.contains(request.item_id) {
        return Err(AppError::UnknownItem(request.item_id));
    }

    let mut ratings = state.ratings.write().await;
    if !ratings.user_exists(request.user_id) {
        return Err(AppError::UnknownUser(request.user_id));
    }
    ratings.record(Rating::new(request.user_id, request.item_id, request.rating));

    Ok(Json(StatusResponse {
        success: true,
        message: format!("Recorded rating {} for item {}", request.rating, request.item_id),
    }))
}

/// Reports the status of persisted model artifacts
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let path = Path::new(&state.config.model_dir).join(MODEL_ARTIFACT);
    let (exists, size) = match std::fs::metadata(&path) {
        Ok(metadata) => (true, metadata.len()),
        Err(_) => (false, 0),
    };

    let mut models = HashMap::new();
    models.insert(
        "rating".to_string(),
        ModelArtifact {
            exists,
            path: path.display().to_string(),
            size,
        },
    );

    Json(InfoResponse {
        success: true,
        models,
    })
}

/// Get all catalog items
pub async fn get_items(State(state): State<AppState>) -> Json<Vec<MenuItem>> {
    let catalog = state.catalog.read().await;
    Json(catalog.all())
}

/// Add a menu item to the catalog
pub async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    if request.price <= 0.0 {
        return Err(AppError::InvalidPrice(request.price));
    }
    let mut catalog = state.catalog.write().await;
    let item = catalog.insert(request);
    Ok((StatusCode::CREATED, Json(item)))
}

/// Register a user so they can rate items
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> (StatusCode, Json<User>) {
    let user = User::new(request.name);
    state.ratings.write().await.add_user(user.clone());
    (StatusCode::CREATED, Json(user))
}

/// One user's rating history joined with item details
pub async fn get_user_ratings(
    State(state): State<AppState>,
    UrlPath(user_id): UrlPath<Uuid>,
) -> AppResult<Json<Vec<UserRatingEntry>>> {
    let ratings = state.ratings.read().await;
    if !ratings.user_exists(user_id) {
        return Err(AppError::UnknownUser(user_id));
    }
    let catalog = state.catalog.read().await;

    let entries = ratings
        .for_user(user_id)
        .into_iter()
        .filter_map(|rating| {
            catalog.get(rating.item_id).map(|item| UserRatingEntry {
                item_id: item.id,
                item_name: item.name.clone(),
                category: item.category.clone(),
                cuisine: item.cuisine.clone(),
                rating: rating.value,
                rated_at: rating.rated_at,
            })
        })
        .collect();

    Ok(Json(entries))
}

/// Distinct cuisines present in the catalog
pub async fn get_cuisines(State(state): State<AppState>) -> Json<Vec<String>> {
    let catalog = state.catalog.read().await;
    Json(catalog.cuisines())
}

#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    pub cuisine: String,
}

/// Categories for a cuisine, including International supplements
pub async fn get_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoriesQuery>,
) -> Json<CategoryListing> {
    let catalog = state.catalog.read().await;
    Json(catalog.category_listing(&query.cuisine))
}
