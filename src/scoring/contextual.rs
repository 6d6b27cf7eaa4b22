//! Request-context affinity (season and device).

use std::collections::HashSet;

use crate::constants::DEFAULT_CONTEXT_BOOST;
use crate::model::{Context, Item, User};

use super::scorer::SignalScorer;
use super::types::{NormalizedScoreVector, ScoreRange, ScoreVector, Signal};

/// Context signal and post-normalization context booster.
///
/// As a [`SignalScorer`] it scores the fraction of supplied context dimensions an item
/// matches (season flag, device affinity). As a modifier, [`adjust`](Self::adjust)
/// multiplies context-matching items by `1 + boost` and clamps to `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct ContextualAdjuster {
    boost: f32,
}

impl Default for ContextualAdjuster {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_BOOST)
    }
}

impl ContextualAdjuster {
    /// Creates an adjuster. Negative or NaN boosts are treated as `0.0`.
    pub fn new(boost: f32) -> Self {
        Self {
            boost: boost.max(0.0),
        }
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }

    /// Boosts the scores of context-matching candidates inside `vector`.
    ///
    /// Items of `vector` that are not among `candidates` are left untouched, as is
    /// everything when the context carries neither season nor device.
    pub fn adjust(
        &self,
        vector: NormalizedScoreVector,
        candidates: &[Item],
        context: &Context,
    ) -> NormalizedScoreVector {
        if self.boost == 0.0 || context.dimensions() == 0 || vector.is_empty() {
            return vector;
        }

        let matching: HashSet<&str> = candidates
            .iter()
            .filter(|item| item.matches_context(context))
            .map(|item| item.id.as_str())
            .collect();

        let factor = 1.0 + self.boost;
        let (signal, mut scores) = vector.into_parts();
        for (item_id, score) in scores.iter_mut() {
            if matching.contains(item_id.as_str()) {
                *score *= factor;
            }
        }

        NormalizedScoreVector::from_unit_scores(signal, scores)
    }
}

impl SignalScorer for ContextualAdjuster {
    fn signal(&self) -> Signal {
        Signal::Contextual
    }

    fn score(&self, _user: &User, candidates: &[Item], context: &Context) -> ScoreVector {
        let mut vector = ScoreVector::empty(self.signal(), ScoreRange::Unit);
        let dimensions = context.dimensions();
        if dimensions == 0 {
            return vector;
        }

        for item in candidates {
            let season = context.season().is_some_and(|s| item.matches_season(s));
            let device = context.device().is_some_and(|d| item.matches_device(d));
            let matches = usize::from(season) + usize::from(device);
            vector.insert(item.id.clone(), matches as f32 / dimensions as f32);
        }
        vector
    }
}
