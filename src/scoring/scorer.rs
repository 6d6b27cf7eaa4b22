use crate::model::{Context, Item, User};

use super::types::{ScoreVector, Signal};

/// One recommendation strategy.
///
/// Implementations must be deterministic for identical inputs (and identical
/// artifact state), free of side effects and I/O, and must only emit scores for
/// items in `candidates`. An empty result means "no opinion".
pub trait SignalScorer: Send + Sync {
    /// The signal this scorer produces.
    fn signal(&self) -> Signal;

    /// Scores `candidates` for `user` under `context`.
    fn score(&self, user: &User, candidates: &[Item], context: &Context) -> ScoreVector;
}
