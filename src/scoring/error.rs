use thiserror::Error;

/// Conditions a scorer can detect.
///
/// Scorers recover from these locally (the affected items or the whole vector are
/// left out); the variants exist so the condition can be logged with structure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoringError {
    /// The user has no trained latent-factor vector (cold start).
    #[error("no latent factors for user '{user_id}'")]
    MissingFactors { user_id: String },

    /// User and item factor vectors disagree on dimensionality.
    #[error("factor dimension mismatch for item '{item_id}': expected {expected}, got {actual}")]
    DimensionMismatch {
        item_id: String,
        expected: usize,
        actual: usize,
    },
}
