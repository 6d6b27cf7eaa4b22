//! Min-max normalization onto `[0, 1]`.

use std::collections::HashMap;

use tracing::trace;

use super::types::{NormalizedScoreVector, ScoreVector};

/// Rescales `vector` onto `[0, 1]` with min-max scaling.
///
/// - Empty input yields an empty output.
/// - If every finite score is identical (including the single-item case), every item
///   maps to `1.0`: the signal considers all candidates equally good.
/// - Non-finite scores never poison the range: `+inf` maps to `1.0`, `-inf` and NaN
///   map to `0.0`.
///
/// Every input item appears in the output.
pub fn normalize(vector: ScoreVector) -> NormalizedScoreVector {
    let (signal, scores) = vector.into_parts();
    if scores.is_empty() {
        return NormalizedScoreVector::empty(signal);
    }

    let (min, max) = scores
        .values()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    // f64 keeps the span finite even for extreme f32 inputs.
    let span = f64::from(max) - f64::from(min);
    let degenerate = span.is_nan() || span <= 0.0;

    trace!(signal = %signal, items = scores.len(), min, max, "normalizing scores");

    let normalized: HashMap<_, _> = scores
        .into_iter()
        .map(|(item_id, score)| {
            let value = if score.is_nan() || score == f32::NEG_INFINITY {
                0.0
            } else if score == f32::INFINITY {
                1.0
            } else if degenerate {
                1.0
            } else {
                ((f64::from(score) - f64::from(min)) / span) as f32
            };
            (item_id, value)
        })
        .collect();

    NormalizedScoreVector::from_unit_scores(signal, normalized)
}
