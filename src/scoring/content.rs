//! Content-based similarity between user preferences and item tags.

use std::collections::BTreeSet;

use crate::model::{Context, Item, User};

use super::scorer::SignalScorer;
use super::types::{ScoreRange, ScoreVector, Signal};

/// Scores items by Jaccard similarity of the user's preference tags and the item's tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentBasedScorer;

impl ContentBasedScorer {
    pub fn new() -> Self {
        Self
    }
}

impl SignalScorer for ContentBasedScorer {
    fn signal(&self) -> Signal {
        Signal::ContentBased
    }

    fn score(&self, user: &User, candidates: &[Item], _context: &Context) -> ScoreVector {
        let mut vector = ScoreVector::empty(self.signal(), ScoreRange::Unit);
        if user.preference_tags.is_empty() {
            return vector;
        }

        for item in candidates {
            vector.insert(item.id.clone(), jaccard(&user.preference_tags, &item.tags));
        }
        vector
    }
}

/// |a ∩ b| / |a ∪ b|; two empty sets have similarity `0.0`.
pub(crate) fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f32 / union as f32
}
