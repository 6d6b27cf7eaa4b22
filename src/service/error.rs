use std::sync::Arc;

use thiserror::Error;

use crate::combiner::CombineError;
use crate::config::ConfigError;
use crate::provider::ProviderError;
use crate::scoring::Signal;

#[derive(Debug, Clone, Error, PartialEq)]
/// Errors returned by the [`RecommendationService`](super::RecommendationService).
pub enum ServiceError {
    /// Configuration was rejected at construction.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A data provider call failed.
    #[error("data provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Combination failed.
    #[error("combination failed: {0}")]
    Combine(#[from] CombineError),

    /// The computation did not finish within the request timeout.
    #[error("recommendation computation timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// A scorer task panicked or was cancelled.
    #[error("{signal} scorer failed: {reason}")]
    ScorerPanicked {
        /// Signal whose scorer failed.
        signal: Signal,
        /// Error message.
        reason: String,
    },
}

impl ServiceError {
    /// Unwraps an error shared between coalesced cache callers.
    pub(crate) fn from_shared(shared: Arc<ServiceError>) -> Self {
        Arc::try_unwrap(shared).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Returns `true` if no signal produced any candidate.
    pub fn is_no_signal(&self) -> bool {
        matches!(self, ServiceError::Combine(CombineError::InsufficientSignal))
    }
}

/// Convenience result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
