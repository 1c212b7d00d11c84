use std::path::Path;

use tracing_subscriber::EnvFilter;

use bento_api::api::{create_router, AppState};
use bento_api::config::Config;
use bento_api::store::{Catalog, RatingStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let state = AppState::new(config.clone());

    seed_stores(&state, &config).await?;

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!("Listening on http://{}:{}", config.host, config.port);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Seeds the in-memory stores from the configured JSON files when present
async fn seed_stores(state: &AppState, config: &Config) -> anyhow::Result<()> {
    if Path::new(&config.catalog_path).exists() {
        let catalog = Catalog::from_json_file(&config.catalog_path)?;
        tracing::info!(items = catalog.len(), path = %config.catalog_path, "Catalog seeded");
        *state.catalog.write().await = catalog;
    } else {
        tracing::warn!(path = %config.catalog_path, "No catalog seed file, starting empty");
    }

    if Path::new(&config.ratings_path).exists() {
        let ratings = RatingStore::from_json_file(&config.ratings_path)?;
        tracing::info!(ratings = ratings.rating_count(), path = %config.ratings_path, "Ratings seeded");
        *state.ratings.write().await = ratings;
    }

    Ok(())
}
