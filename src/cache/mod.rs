//! Recommendation cache: in-process TTL memoization plus an optional external store.

pub mod error;
pub mod recommendation;
pub mod store;
pub mod types;


pub use error::{CacheStoreError, CacheStoreResult};
pub use recommendation::RecommendationCache;
#[cfg(any(test, feature = "mock"))]
pub use store::InMemoryCacheStore;
pub use store::{CacheStore, RedisCacheStore};
pub use types::{CacheEntry, CacheKey, CacheLookup, CacheStatus};
