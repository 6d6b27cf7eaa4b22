use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SIGNAL_WEIGHT;
use crate::model::ItemId;
use crate::scoring::Signal;

use super::error::{CombineError, CombineResult};

/// Per-signal weights. Validated once, then immutable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightConfig {
    pub matrix_factorization: f32,
    pub content_based: f32,
    pub popularity: f32,
    pub contextual: f32,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            matrix_factorization: DEFAULT_SIGNAL_WEIGHT,
            content_based: DEFAULT_SIGNAL_WEIGHT,
            popularity: DEFAULT_SIGNAL_WEIGHT,
            contextual: DEFAULT_SIGNAL_WEIGHT,
        }
    }
}

impl WeightConfig {
    pub fn new(matrix_factorization: f32, content_based: f32, popularity: f32, contextual: f32) -> Self {
        Self {
            matrix_factorization,
            content_based,
            popularity,
            contextual,
        }
    }

    /// Returns the weight configured for `signal`.
    #[inline]
    pub fn get(&self, signal: Signal) -> f32 {
        match signal {
            Signal::MatrixFactorization => self.matrix_factorization,
            Signal::ContentBased => self.content_based,
            Signal::Popularity => self.popularity,
            Signal::Contextual => self.contextual,
        }
    }

    /// Sum of all weights.
    pub fn total(&self) -> f32 {
        Signal::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// Checks every weight is finite and non-negative, and at least one is positive.
    pub fn validate(&self) -> CombineResult<()> {
        for signal in Signal::ALL {
            let weight = self.get(signal);
            if !weight.is_finite() || weight < 0.0 {
                return Err(CombineError::InvalidWeightConfig {
                    reason: format!("weight for {signal} must be a non-negative number, got {weight}"),
                });
            }
        }
        if self.total() == 0.0 {
            return Err(CombineError::InvalidWeightConfig {
                reason: "at least one signal must have a positive weight".to_string(),
            });
        }
        Ok(())
    }
}

/// Weighted share of one signal in an entry's final score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalContribution {
    pub signal: Signal,
    pub weighted: f32,
}

/// One ranked recommendation with its per-signal breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub item_id: ItemId,
    pub score: f32,
    /// Ordered by [`Signal`]; contributions sum to `score`.
    pub contributions: Vec<SignalContribution>,
}

impl RecommendationEntry {
    /// Returns the contribution of `signal`, if that signal took part.
    pub fn contribution(&self, signal: Signal) -> Option<f32> {
        self.contributions
            .iter()
            .find(|c| c.signal == signal)
            .map(|c| c.weighted)
    }

    /// Signals that actually lifted this entry's score.
    pub fn supporting_signals(&self) -> impl Iterator<Item = Signal> + '_ {
        self.contributions
            .iter()
            .filter(|c| c.weighted > 0.0)
            .map(|c| c.signal)
    }

    /// Joins the explanation of every supporting signal.
    pub fn explanation(&self) -> String {
        self.supporting_signals()
            .map(|s| s.explanation())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Ranked recommendations, best first, unique by item id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationList {
    entries: Vec<RecommendationEntry>,
}

impl RecommendationList {
    pub fn new(entries: Vec<RecommendationEntry>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RecommendationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecommendationEntry> {
        self.entries.iter()
    }

    pub fn first(&self) -> Option<&RecommendationEntry> {
        self.entries.first()
    }

    pub fn item_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.item_id.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a RecommendationList {
    type Item = &'a RecommendationEntry;
    type IntoIter = std::slice::Iter<'a, RecommendationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
