use std::collections::HashMap;
use std::collections::hash_map::Iter;

use serde::{Deserialize, Serialize};

use crate::model::ItemId;

/// Identifies one recommendation signal.
///
/// The derived ordering fixes the order of per-signal contributions in results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    MatrixFactorization,
    ContentBased,
    Popularity,
    Contextual,
}

impl Signal {
    pub const ALL: [Signal; 4] = [
        Signal::MatrixFactorization,
        Signal::ContentBased,
        Signal::Popularity,
        Signal::Contextual,
    ];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::MatrixFactorization => "matrix_factorization",
            Signal::ContentBased => "content_based",
            Signal::Popularity => "popularity",
            Signal::Contextual => "contextual",
        }
    }

    /// Human-readable reason shown next to a recommendation this signal supported.
    pub fn explanation(&self) -> &'static str {
        match self {
            Signal::MatrixFactorization => {
                "Recommended because users similar to you purchased this."
            }
            Signal::ContentBased => "Recommended because it matches your interests.",
            Signal::Popularity => "Recommended because it's popular among other users.",
            Signal::Contextual => "Recommended because it suits your current season and device.",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared native range of a scorer's raw output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreRange {
    /// Any real value (e.g. dot products).
    Unbounded,
    /// `[0, 1]`.
    Unit,
    /// A known closed interval.
    Bounded { min: f32, max: f32 },
}

impl ScoreRange {
    /// Returns `true` if `value` lies inside the declared range.
    pub fn contains(&self, value: f32) -> bool {
        match *self {
            ScoreRange::Unbounded => !value.is_nan(),
            ScoreRange::Unit => (0.0..=1.0).contains(&value),
            ScoreRange::Bounded { min, max } => (min..=max).contains(&value),
        }
    }
}

/// Raw per-item scores produced by one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector {
    signal: Signal,
    range: ScoreRange,
    scores: HashMap<ItemId, f32>,
}

impl ScoreVector {
    /// Creates an empty vector ("signal has no opinion").
    pub fn empty(signal: Signal, range: ScoreRange) -> Self {
        Self {
            signal,
            range,
            scores: HashMap::new(),
        }
    }

    pub fn from_scores(signal: Signal, range: ScoreRange, scores: HashMap<ItemId, f32>) -> Self {
        Self {
            signal,
            range,
            scores,
        }
    }

    pub fn insert(&mut self, item_id: impl Into<ItemId>, score: f32) {
        self.scores.insert(item_id.into(), score);
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn range(&self) -> ScoreRange {
        self.range
    }

    pub fn get(&self, item_id: &str) -> Option<f32> {
        self.scores.get(item_id).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, ItemId, f32> {
        self.scores.iter()
    }

    pub(crate) fn into_parts(self) -> (Signal, HashMap<ItemId, f32>) {
        (self.signal, self.scores)
    }
}

/// Scores of one signal rescaled onto `[0, 1]`.
///
/// Only [`normalize`](super::normalize) and [`ContextualAdjuster::adjust`](super::ContextualAdjuster::adjust)
/// construct these, so every value is guaranteed to be inside the unit interval.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedScoreVector {
    signal: Signal,
    scores: HashMap<ItemId, f32>,
}

impl NormalizedScoreVector {
    /// Builds a vector from scores already in `[0, 1]`, clamping any stragglers.
    pub(crate) fn from_unit_scores(signal: Signal, mut scores: HashMap<ItemId, f32>) -> Self {
        for value in scores.values_mut() {
            *value = clamp_unit(*value);
        }
        Self { signal, scores }
    }

    pub fn empty(signal: Signal) -> Self {
        Self {
            signal,
            scores: HashMap::new(),
        }
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn get(&self, item_id: &str) -> Option<f32> {
        self.scores.get(item_id).copied()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.scores.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, ItemId, f32> {
        self.scores.iter()
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.scores.keys()
    }

    pub(crate) fn into_parts(self) -> (Signal, HashMap<ItemId, f32>) {
        (self.signal, self.scores)
    }
}

/// Clamps into `[0, 1]`, mapping NaN to `0.0`.
#[inline]
pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
