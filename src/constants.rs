//! Cross-cutting, shared constants.
//!
//! Defaults live here so that [`Config`](crate::config::Config), the cache, and the
//! service agree without re-declaring literals.

/// Default number of recommendations returned per request.
pub const DEFAULT_TOP_K: usize = 10;

/// Default time-to-live for cached recommendation lists.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default max number of in-process cache entries.
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Default multiplicative boost applied to context-matching items (`1 + boost`).
pub const DEFAULT_CONTEXT_BOOST: f32 = 0.2;

/// Default per-request computation timeout.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;

/// Default weight for each of the four signals (even split).
pub const DEFAULT_SIGNAL_WEIGHT: f32 = 0.25;

/// Prefix of every cache key written to the external cache store.
pub const CACHE_KEY_PREFIX: &str = "recommendations";
