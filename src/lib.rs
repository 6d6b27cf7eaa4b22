//! Blend: hybrid recommendation scoring and combination engine.
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`RecommendationService`], [`Recommendations`], [`RecommendationStatus`] - Request orchestration
//! - [`Config`], [`ConfigError`] - Environment configuration
//! - [`RecommendationList`], [`RecommendationEntry`] - Ranked output with per-signal contributions
//!
//! ## Scoring & Combination
//! - [`SignalScorer`] and its four implementations - Per-signal scores
//! - [`normalize`] - Min-max rescaling onto `[0, 1]`
//! - [`HybridCombiner`], [`WeightConfig`] - Weighted merge, tie-break and top-K
//!
//! ## Caching
//! - [`RecommendationCache`] - TTL memoization with per-key single-flight
//! - [`CacheStore`], [`RedisCacheStore`] - Optional shared store
//!
//! ## Collaborators
//! - [`DataProvider`], [`InMemoryDataProvider`] - Users, items and latent factors
//!
//! ## Test/Mock Support
//! [`InMemoryCacheStore`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod combiner;
pub mod config;
pub mod constants;
pub mod hashing;
pub mod model;
pub mod provider;
pub mod scoring;
pub mod service;

#[cfg(any(test, feature = "mock"))]
pub use cache::InMemoryCacheStore;
pub use cache::{
    CacheEntry, CacheKey, CacheLookup, CacheStatus, CacheStore, CacheStoreError,
    CacheStoreResult, RecommendationCache, RedisCacheStore,
};
pub use combiner::{
    CombineError, CombineResult, HybridCombiner, RecommendationEntry, RecommendationList,
    SignalContribution, WeightConfig,
};
pub use config::{Config, ConfigError};
pub use hashing::{context_fingerprint, hash_to_u64};
pub use model::{Context, FactorVector, Interaction, Item, ItemId, User, UserId};
pub use provider::{DataProvider, InMemoryDataProvider, ProviderError, ProviderResult};
pub use scoring::{
    ContentBasedScorer, ContextualAdjuster, ItemFactors, MatrixFactorizationScorer,
    NormalizedScoreVector, PopularityScorer, ScoreRange, ScoreVector, ScoringError, Signal,
    SignalScorer, normalize,
};
pub use service::{
    RecommendationService, RecommendationStatus, Recommendations, ServiceError, ServiceResult,
};
