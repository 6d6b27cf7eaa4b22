use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::model::ItemId;
use crate::scoring::{NormalizedScoreVector, Signal};

use super::error::{CombineError, CombineResult};
use super::types::{RecommendationEntry, RecommendationList, SignalContribution, WeightConfig};

/// Merges normalized signal vectors into one ranked list.
#[derive(Debug, Clone)]
pub struct HybridCombiner {
    weights: WeightConfig,
}

impl HybridCombiner {
    /// Validates `weights` and builds a combiner.
    pub fn new(weights: &WeightConfig) -> CombineResult<Self> {
        weights.validate()?;
        Ok(Self { weights: *weights })
    }

    pub fn weights(&self) -> &WeightConfig {
        &self.weights
    }

    /// Combines `vectors` into at most `k` ranked entries.
    ///
    /// An item's final score is the weighted sum of its normalized scores divided by
    /// the total weight of the positively weighted signals that are *present* (have a
    /// non-empty vector), so signals with no opinion do not drag everything down. An
    /// item missing from a present signal counts as `0.0` for that signal.
    ///
    /// Ties are broken by higher raw popularity, then by item id ascending.
    pub fn combine(
        &self,
        vectors: &[NormalizedScoreVector],
        popularity: &HashMap<ItemId, u64>,
        k: usize,
    ) -> CombineResult<RecommendationList> {
        if k == 0 {
            return Err(CombineError::InvalidTopK);
        }

        let mut present: BTreeMap<Signal, &NormalizedScoreVector> = BTreeMap::new();
        for vector in vectors.iter().filter(|v| !v.is_empty()) {
            if present.insert(vector.signal(), vector).is_some() {
                warn!(signal = %vector.signal(), "duplicate signal vector, keeping the last one");
            }
        }

        let candidates: BTreeSet<&ItemId> = present.values().flat_map(|v| v.item_ids()).collect();
        if candidates.is_empty() {
            debug!("no signal produced candidates");
            return Err(CombineError::InsufficientSignal);
        }

        let weighted: Vec<(Signal, f32, &NormalizedScoreVector)> = present
            .iter()
            .map(|(signal, vector)| (*signal, self.weights.get(*signal), *vector))
            .filter(|(_, weight, _)| *weight > 0.0)
            .collect();
        let denominator: f64 = weighted.iter().map(|(_, w, _)| f64::from(*w)).sum();

        debug!(
            signals = present.len(),
            weighted_signals = weighted.len(),
            candidates = candidates.len(),
            denominator,
            k,
            "combining signals"
        );

        let mut entries: Vec<RecommendationEntry> = candidates
            .into_iter()
            .map(|item_id| {
                let mut sum = 0.0f64;
                let contributions: Vec<SignalContribution> = weighted
                    .iter()
                    .map(|(signal, weight, vector)| {
                        let raw = f64::from(*weight) * f64::from(vector.get(item_id).unwrap_or(0.0));
                        sum += raw;
                        SignalContribution {
                            signal: *signal,
                            weighted: share_of(raw, denominator) as f32,
                        }
                    })
                    .collect();
                // Ranked on the sum divided once, so equal sums compare equal.
                let score = (share_of(sum, denominator) as f32).clamp(0.0, 1.0);

                RecommendationEntry {
                    item_id: item_id.clone(),
                    score,
                    contributions,
                }
            })
            .collect();

        entries.sort_by(|a, b| rank_order(a, b, popularity));
        entries.truncate(k);

        Ok(RecommendationList::new(entries))
    }
}

fn share_of(value: f64, denominator: f64) -> f64 {
    if denominator > 0.0 { value / denominator } else { 0.0 }
}

fn rank_order(
    a: &RecommendationEntry,
    b: &RecommendationEntry,
    popularity: &HashMap<ItemId, u64>,
) -> Ordering {
    let pop = |id: &ItemId| popularity.get(id).copied().unwrap_or(0);

    b.score
        .total_cmp(&a.score)
        .then_with(|| pop(&b.item_id).cmp(&pop(&a.item_id)))
        .then_with(|| a.item_id.cmp(&b.item_id))
}
