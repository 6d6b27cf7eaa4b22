//! Data provider error types.

use thiserror::Error;

/// Errors returned by a [`DataProvider`](super::DataProvider).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The backing data source could not be reached.
    #[error("data provider unavailable: {reason}")]
    Unavailable { reason: String },

    /// No user with this id exists.
    #[error("unknown user: {user_id}")]
    UnknownUser { user_id: String },
}

/// Result type for data provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
