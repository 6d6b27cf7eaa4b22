//! Recommendation service: the only component that talks to collaborators.
//!
//! Per request: load the user and candidates from the [`DataProvider`](crate::provider::DataProvider),
//! run every weighted scorer on the blocking pool, normalize, apply the contextual boost,
//! combine, and memoize the list under `(user, context fingerprint)`.

pub mod error;
pub mod recommender;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{ServiceError, ServiceResult};
pub use recommender::RecommendationService;
pub use types::{RecommendationStatus, Recommendations};
