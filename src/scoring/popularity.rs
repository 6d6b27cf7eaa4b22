//! Global popularity, identical for every user.

use crate::model::{Context, Item, User};

use super::scorer::SignalScorer;
use super::types::{ScoreRange, ScoreVector, Signal};

/// Scores items by their interaction count relative to the most popular candidate.
///
/// Never empty for a non-empty candidate set, which makes it the baseline signal that
/// keeps cold-start users from receiving nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PopularityScorer;

impl PopularityScorer {
    pub fn new() -> Self {
        Self
    }
}

impl SignalScorer for PopularityScorer {
    fn signal(&self) -> Signal {
        Signal::Popularity
    }

    fn score(&self, _user: &User, candidates: &[Item], _context: &Context) -> ScoreVector {
        let mut vector = ScoreVector::empty(self.signal(), ScoreRange::Unit);
        let max = candidates.iter().map(|i| i.popularity).max().unwrap_or(0);

        for item in candidates {
            let score = if max == 0 {
                0.0
            } else {
                (item.popularity as f64 / max as f64) as f32
            };
            vector.insert(item.id.clone(), score);
        }
        vector
    }
}
