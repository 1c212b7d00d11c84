use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Engine and catalog routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // Engine operations
        .route("/train", post(handlers::train))
        .route("/recommend", post(handlers::recommend))
        .route("/rate", post(handlers::rate))
        .route("/info", get(handlers::info))
        // Catalog
        .route("/items", get(handlers::get_items))
        .route("/items", post(handlers::create_item))
        .route("/cuisines", get(handlers::get_cuisines))
        .route("/categories", get(handlers::get_categories))
        // Users & ratings history
        .route("/users", post(handlers::create_user))
        .route("/users/:user_id/ratings", get(handlers::get_user_ratings))
}
