//! Per-signal scoring and normalization.
//!
//! Each recommendation signal implements [`SignalScorer`]: a pure function from
//! `(user, candidates, context)` to a [`ScoreVector`] over a subset of the candidates.
//! Raw vectors live on incompatible scales, so [`normalize`] maps each one onto
//! `[0, 1]` before the [`HybridCombiner`](crate::combiner::HybridCombiner) sees it.
//!
//! # Absence is not failure
//!
//! A scorer with nothing to say (cold-start user without latent factors, user without
//! preference tags, context without season or device) returns an *empty* vector. The
//! combiner treats an empty vector as "signal not present" and re-normalizes the
//! weights of the remaining signals, so absence never penalizes candidates.
//!
//! # Contextual signal
//!
//! [`ContextualAdjuster`] plays two roles: it scores context affinity as a signal of
//! its own, and [`ContextualAdjuster::adjust`] boosts context-matching items inside
//! the other normalized vectors (clamped to `[0, 1]`).

pub mod content;
pub mod contextual;
pub mod error;
pub mod matrix_factorization;
pub mod normalize;
pub mod popularity;
pub mod scorer;
pub mod types;


pub use content::ContentBasedScorer;
pub use contextual::ContextualAdjuster;
pub use error::ScoringError;
pub use matrix_factorization::{ItemFactors, MatrixFactorizationScorer};
pub use normalize::normalize;
pub use popularity::PopularityScorer;
pub use scorer::SignalScorer;
pub use types::{NormalizedScoreVector, ScoreRange, ScoreVector, Signal};
