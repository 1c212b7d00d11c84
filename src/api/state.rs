use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::services::rating_model::RatingModel;
use crate::store::{Catalog, RatingStore};

/// Shared application state.
///
/// The catalog and ratings stores are request-plumbing; the model slot is
/// the engine's one piece of shared mutable state. Training builds a full
/// replacement off-lock and swaps the `Arc` in, so concurrent readers
/// either see the previous snapshot or the new one, never a partial model.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<Catalog>>,
    pub ratings: Arc<RwLock<RatingStore>>,
    pub model: Arc<RwLock<Option<Arc<RatingModel>>>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates state with empty stores and no trained model
    pub fn new(config: Config) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Catalog::new())),
            ratings: Arc::new(RwLock::new(RatingStore::new())),
            model: Arc::new(RwLock::new(None)),
            config: Arc::new(config),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
