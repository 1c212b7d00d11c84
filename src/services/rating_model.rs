use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Rating;

/// Fallback rating when no history exists at all
pub const NEUTRAL_RATING: f64 = 3.0;

/// File name of the persisted model artifact
pub const MODEL_ARTIFACT: &str = "rating_model.json";

/// User-user collaborative filtering model.
///
/// Built wholesale by `train` from a ratings snapshot; prediction is a pure
/// function of the fitted state. Retraining replaces the model entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingModel {
    user_index: HashMap<Uuid, usize>,
    item_index: HashMap<u32, usize>,
    /// Dense user x item rating matrix; 0.0 marks an unobserved pair
    matrix: Vec<Vec<f64>>,
    /// Pairwise user cosine similarity over raw rating rows
    similarity: Vec<Vec<f64>>,
    /// Mean observed rating per item column, None when never rated
    item_means: Vec<Option<f64>>,
    /// Mean over all observed ratings
    global_mean: f64,
    /// Every item id the catalog knew at training time
    known_items: HashSet<u32>,
}

impl RatingModel {
    /// Fits a model from a ratings snapshot and the catalog's item ids.
    ///
    /// Fails with `InsufficientData` when the snapshot is empty. Users and
    /// items are indexed in sorted order so identical snapshots produce
    /// identical models.
    pub fn train(ratings: &[Rating], catalog_items: &[u32]) -> AppResult<Self> {
        if ratings.is_empty() {
            return Err(AppError::InsufficientData);
        }

        let users: BTreeSet<Uuid> = ratings.iter().map(|r| r.user_id).collect();
        let items: BTreeSet<u32> = ratings.iter().map(|r| r.item_id).collect();

        let user_index: HashMap<Uuid, usize> =
            users.iter().enumerate().map(|(i, &u)| (u, i)).collect();
        let item_index: HashMap<u32, usize> =
            items.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let mut matrix = vec![vec![0.0; item_index.len()]; user_index.len()];
        let mut total = 0.0;
        for rating in ratings {
            let row = user_index[&rating.user_id];
            let col = item_index[&rating.item_id];
            matrix[row][col] = rating.value;
            total += rating.value;
        }
        let global_mean = total / ratings.len() as f64;

        let item_means = (0..item_index.len())
            .map(|col| {
                let observed: Vec<f64> = matrix
                    .iter()
                    .map(|row| row[col])
                    .filter(|&v| v > 0.0)
                    .collect();
                if observed.is_empty() {
                    None
                } else {
                    Some(observed.iter().sum::<f64>() / observed.len() as f64)
                }
            })
            .collect();

        let similarity = cosine_similarity(&matrix);

        let mut known_items: HashSet<u32> = catalog_items.iter().copied().collect();
        known_items.extend(items);

        Ok(Self {
            user_index,
            item_index,
            matrix,
            similarity,
            item_means,
            global_mean,
            known_items,
        })
    }

    /// Predicts a rating for a (user, item) pair, clamped to [1, 5].
    ///
    /// A rating the user already gave is returned as-is; otherwise the
    /// prediction is the similarity-weighted average over users with
    /// positive similarity who rated the item, falling back to the item's
    /// population score when no such neighborhood exists.
    pub fn predict(&self, user_id: Uuid, item_id: u32) -> AppResult<f64> {
        if !self.known_items.contains(&item_id) {
            return Err(AppError::UnknownItem(item_id));
        }

        let Some(&row) = self.user_index.get(&user_id) else {
            return Ok(clamp_rating(self.population_score(item_id)));
        };
        let Some(&col) = self.item_index.get(&item_id) else {
            return Ok(clamp_rating(self.population_score(item_id)));
        };

        if self.matrix[row][col] > 0.0 {
            return Ok(clamp_rating(self.matrix[row][col]));
        }

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for (other, other_row) in self.matrix.iter().enumerate() {
            if other == row || other_row[col] <= 0.0 {
                continue;
            }
            let sim = self.similarity[row][other];
            if sim > 0.0 {
                weighted_sum += sim * other_row[col];
                weight_total += sim;
            }
        }

        if weight_total > 0.0 {
            Ok(clamp_rating(weighted_sum / weight_total))
        } else {
            Ok(clamp_rating(self.population_score(item_id)))
        }
    }

    /// Population estimate for an item: its mean observed rating, else the
    /// global mean. This is the cold-start prediction and the base value
    /// score attributions are measured against.
    pub fn population_score(&self, item_id: u32) -> f64 {
        self.item_index
            .get(&item_id)
            .and_then(|&col| self.item_means[col])
            .unwrap_or(self.global_mean)
    }

    pub fn rated_user_count(&self) -> usize {
        self.user_index.len()
    }

    pub fn rated_item_count(&self) -> usize {
        self.item_index.len()
    }

    /// Persists the fitted model as a JSON artifact under `dir`
    pub fn save(&self, dir: impl AsRef<Path>) -> AppResult<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(MODEL_ARTIFACT);
        let json = serde_json::to_string(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

fn clamp_rating(value: f64) -> f64 {
    value.clamp(1.0, 5.0)
}

/// Pairwise cosine similarity between matrix rows
fn cosine_similarity(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let norms: Vec<f64> = matrix
        .iter()
        .map(|row| row.iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect();

    let n = matrix.len();
    let mut similarity = vec![vec![0.0; n]; n];
    for a in 0..n {
        for b in a..n {
            let denom = norms[a] * norms[b];
            let sim = if denom > 0.0 {
                let dot: f64 = matrix[a].iter().zip(&matrix[b]).map(|(x, y)| x * y).sum();
                dot / denom
            } else {
                0.0
            };
            similarity[a][b] = sim;
            similarity[b][a] = sim;
        }
    }
    similarity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn rating(user: u128, item: u32, value: f64) -> Rating {
        Rating::new(uid(user), item, value)
    }

    fn fixture() -> RatingModel {
        // Users 1 and 2 agree on items 10/11; user 2 also rated item 12.
        let ratings = vec![
            rating(1, 10, 5.0),
            rating(1, 11, 4.0),
            rating(2, 10, 5.0),
            rating(2, 11, 4.0),
            rating(2, 12, 5.0),
            rating(3, 12, 1.0),
        ];
        RatingModel::train(&ratings, &[10, 11, 12, 13, 14]).unwrap()
    }

    #[test]
    fn test_train_empty_is_insufficient_data() {
        let result = RatingModel::train(&[], &[1, 2, 3]);
        assert!(matches!(result, Err(AppError::InsufficientData)));
    }

    #[test]
    fn test_predict_returns_own_rating() {
        let model = fixture();
        assert_eq!(model.predict(uid(1), 10).unwrap(), 5.0);
    }

    #[test]
    fn test_predict_uses_similar_users() {
        let model = fixture();
        // User 1 never rated item 12; user 2 (very similar) gave it 5.0 and
        // user 3 (dissimilar but positive-similarity-free) gave it 1.0.
        // User 3 shares no items with user 1, so cosine similarity is 0 and
        // only user 2's rating counts.
        let predicted = model.predict(uid(1), 12).unwrap();
        assert!((predicted - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_predict_in_valid_range() {
        let model = fixture();
        for user in 1..=4u128 {
            for item in [10, 11, 12, 13, 14] {
                let predicted = model.predict(uid(user), item).unwrap();
                assert!((1.0..=5.0).contains(&predicted));
                assert!(predicted.is_finite());
            }
        }
    }

    #[test]
    fn test_cold_start_unknown_user_gets_item_mean() {
        let model = fixture();
        // Item 10 was rated 5.0 twice.
        let predicted = model.predict(uid(99), 10).unwrap();
        assert!((predicted - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_cold_start_unrated_item_gets_global_mean() {
        let model = fixture();
        let global_mean = (5.0 + 4.0 + 5.0 + 4.0 + 5.0 + 1.0) / 6.0;
        let predicted = model.predict(uid(1), 13).unwrap();
        assert!((predicted - global_mean).abs() < 1e-9);
        assert!((model.population_score(13) - global_mean).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_item_is_rejected() {
        let model = fixture();
        assert!(matches!(
            model.predict(uid(1), 999),
            Err(AppError::UnknownItem(999))
        ));
    }

    #[test]
    fn test_retraining_is_deterministic() {
        let ratings = vec![
            rating(5, 20, 2.0),
            rating(6, 20, 4.0),
            rating(6, 21, 3.0),
        ];
        let a = RatingModel::train(&ratings, &[20, 21]).unwrap();
        let b = RatingModel::train(&ratings, &[20, 21]).unwrap();
        assert_eq!(a.predict(uid(5), 21).unwrap(), b.predict(uid(5), 21).unwrap());
    }

    #[test]
    fn test_artifact_roundtrip() {
        let model = fixture();
        let json = serde_json::to_string(&model).unwrap();
        let back: RatingModel = serde_json::from_str(&json).unwrap();
        assert_eq!(
            model.predict(uid(1), 12).unwrap(),
            back.predict(uid(1), 12).unwrap()
        );
    }
}
