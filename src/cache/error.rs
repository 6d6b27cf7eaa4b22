use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by a [`CacheStore`](super::CacheStore).
pub enum CacheStoreError {
    /// Redis command or connection failure.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Entry could not be encoded or decoded.
    #[error("cache entry serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store is not reachable.
    #[error("cache store unavailable: {reason}")]
    Unavailable {
        /// Error message.
        reason: String,
    },
}

/// Convenience result type for cache store operations.
pub type CacheStoreResult<T> = Result<T, CacheStoreError>;
