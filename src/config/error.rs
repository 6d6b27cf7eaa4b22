//! Configuration error types.

use thiserror::Error;

use crate::combiner::CombineError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// An environment variable held a value that is not a number.
    #[error("failed to parse {name}='{value}' as a number")]
    InvalidNumber { name: &'static str, value: String },

    /// An environment variable held a value that is not a boolean.
    #[error("failed to parse {name}='{value}' as a boolean (expected true/false/1/0)")]
    InvalidBool { name: &'static str, value: String },

    /// A numeric option must be strictly positive.
    #[error("{name} must be greater than zero")]
    NotPositive { name: &'static str },

    /// The context boost must be a finite, non-negative number.
    #[error("context boost must be a non-negative number, got {value}")]
    InvalidBoost { value: f32 },

    /// Signal weights failed validation.
    #[error(transparent)]
    InvalidWeights(#[from] CombineError),
}
