use thiserror::Error;

/// Errors returned by the [`HybridCombiner`](super::HybridCombiner).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CombineError {
    /// No signal produced any candidate.
    ///
    /// Callers are expected to include the popularity signal as a baseline, so in
    /// practice this only happens for an empty catalog.
    #[error("insufficient signal: no scorer produced any candidate")]
    InsufficientSignal,

    /// Weights are negative, non-finite, or all zero. Raised at construction only.
    #[error("invalid weight configuration: {reason}")]
    InvalidWeightConfig { reason: String },

    /// Requested zero results.
    #[error("top-k must be greater than zero")]
    InvalidTopK,
}

/// Convenience result type for combiner operations.
pub type CombineResult<T> = Result<T, CombineError>;
