//! Weighted combination of normalized signal vectors into a ranked list.
//!
//! The [`HybridCombiner`] is built from a validated [`WeightConfig`] and is pure: the
//! same vectors, popularity counts and `k` always produce the same
//! [`RecommendationList`], entry order included.

pub mod error;
pub mod hybrid;
pub mod types;


pub use hybrid::HybridCombiner;
pub use error::{CombineError, CombineResult};
pub use types::{RecommendationEntry, RecommendationList, SignalContribution, WeightConfig};
