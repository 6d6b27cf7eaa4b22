//! Collaborative filtering via precomputed latent factors.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::model::{Context, FactorVector, Item, ItemId, User};

use super::error::ScoringError;
use super::scorer::SignalScorer;
use super::types::{ScoreRange, ScoreVector, Signal};

/// Item-factor table exported by the factorization model.
pub type ItemFactors = HashMap<ItemId, FactorVector>;

/// Scores items by the dot product of user and item latent factors.
///
/// The item table is shared across requests; the user vector is looked up by the
/// service per request. Without a user vector the scorer has no opinion.
#[derive(Debug, Clone)]
pub struct MatrixFactorizationScorer {
    item_factors: Arc<ItemFactors>,
    user_factors: Option<FactorVector>,
}

impl MatrixFactorizationScorer {
    pub fn new(item_factors: Arc<ItemFactors>, user_factors: Option<FactorVector>) -> Self {
        Self {
            item_factors,
            user_factors,
        }
    }

    pub fn has_user_factors(&self) -> bool {
        self.user_factors.is_some()
    }

    pub fn item_factor_count(&self) -> usize {
        self.item_factors.len()
    }

    fn user_vector(&self, user: &User) -> Result<&[f32], ScoringError> {
        self.user_factors
            .as_deref()
            .ok_or_else(|| ScoringError::MissingFactors {
                user_id: user.id.clone(),
            })
    }
}

impl SignalScorer for MatrixFactorizationScorer {
    fn signal(&self) -> Signal {
        Signal::MatrixFactorization
    }

    fn score(&self, user: &User, candidates: &[Item], _context: &Context) -> ScoreVector {
        let mut vector = ScoreVector::empty(self.signal(), ScoreRange::Unbounded);

        let user_vector = match self.user_vector(user) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "cold-start user, skipping matrix factorization");
                return vector;
            }
        };

        for item in candidates {
            let Some(item_vector) = self.item_factors.get(&item.id) else {
                continue;
            };
            if item_vector.len() != user_vector.len() {
                let e = ScoringError::DimensionMismatch {
                    item_id: item.id.clone(),
                    expected: user_vector.len(),
                    actual: item_vector.len(),
                };
                debug!(error = %e, "skipping item");
                continue;
            }
            vector.insert(item.id.clone(), dot(user_vector, item_vector));
        }

        vector
    }
}

#[inline]
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
