//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `BLEND_*` environment variables. Values
//! that are set but malformed are errors, never silently replaced by the default.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::combiner::WeightConfig;
use crate::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS, DEFAULT_CONTEXT_BOOST,
    DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_TOP_K,
};

/// Engine configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `BLEND_*` overrides on top of defaults, then
/// [`Config::validate`] once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Per-signal weights. Default: `0.25` each.
    pub weights: WeightConfig,

    /// Lifetime of a cached recommendation list. Default: 300 s.
    pub cache_ttl: Duration,

    /// Number of recommendations per request. Default: `10`.
    pub top_k: usize,

    /// Max entries in the in-process cache. Default: `10_000`.
    pub cache_capacity: u64,

    /// Boost applied to context-matching items (`score * (1 + boost)`). Default: `0.2`.
    pub context_boost: f32,

    /// Upper bound for one recommendation computation. Default: 2 s.
    pub request_timeout: Duration,

    /// Drop items the user already interacted with. Default: `true`.
    pub exclude_interacted: bool,

    /// External cache store (Redis) URL. Unset means in-process caching only.
    pub redis_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weights: WeightConfig::default(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            top_k: DEFAULT_TOP_K,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            context_boost: DEFAULT_CONTEXT_BOOST,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            exclude_interacted: true,
            redis_url: None,
        }
    }
}

impl Config {
    const ENV_WEIGHT_MF: &'static str = "BLEND_WEIGHT_MATRIX_FACTORIZATION";
    const ENV_WEIGHT_CONTENT: &'static str = "BLEND_WEIGHT_CONTENT_BASED";
    const ENV_WEIGHT_POPULARITY: &'static str = "BLEND_WEIGHT_POPULARITY";
    const ENV_WEIGHT_CONTEXTUAL: &'static str = "BLEND_WEIGHT_CONTEXTUAL";
    const ENV_CACHE_TTL_SECS: &'static str = "BLEND_CACHE_TTL_SECS";
    const ENV_TOP_K: &'static str = "BLEND_TOP_K";
    const ENV_CACHE_CAPACITY: &'static str = "BLEND_CACHE_CAPACITY";
    const ENV_CONTEXT_BOOST: &'static str = "BLEND_CONTEXT_BOOST";
    const ENV_REQUEST_TIMEOUT_MS: &'static str = "BLEND_REQUEST_TIMEOUT_MS";
    const ENV_EXCLUDE_INTERACTED: &'static str = "BLEND_EXCLUDE_INTERACTED";
    const ENV_REDIS_URL: &'static str = "BLEND_REDIS_URL";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let weights = WeightConfig {
            matrix_factorization: Self::parse_number_from_env(
                Self::ENV_WEIGHT_MF,
                defaults.weights.matrix_factorization,
            )?,
            content_based: Self::parse_number_from_env(
                Self::ENV_WEIGHT_CONTENT,
                defaults.weights.content_based,
            )?,
            popularity: Self::parse_number_from_env(
                Self::ENV_WEIGHT_POPULARITY,
                defaults.weights.popularity,
            )?,
            contextual: Self::parse_number_from_env(
                Self::ENV_WEIGHT_CONTEXTUAL,
                defaults.weights.contextual,
            )?,
        };
        let cache_ttl = Duration::from_secs(Self::parse_number_from_env(
            Self::ENV_CACHE_TTL_SECS,
            defaults.cache_ttl.as_secs(),
        )?);
        let top_k = Self::parse_number_from_env(Self::ENV_TOP_K, defaults.top_k)?;
        let cache_capacity =
            Self::parse_number_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity)?;
        let context_boost =
            Self::parse_number_from_env(Self::ENV_CONTEXT_BOOST, defaults.context_boost)?;
        let request_timeout = Duration::from_millis(Self::parse_number_from_env(
            Self::ENV_REQUEST_TIMEOUT_MS,
            defaults.request_timeout.as_millis() as u64,
        )?);
        let exclude_interacted =
            Self::parse_bool_from_env(Self::ENV_EXCLUDE_INTERACTED, defaults.exclude_interacted)?;
        let redis_url = Self::parse_optional_string_from_env(Self::ENV_REDIS_URL);

        Ok(Self {
            weights,
            cache_ttl,
            top_k,
            cache_capacity,
            context_boost,
            request_timeout,
            exclude_interacted,
            redis_url,
        })
    }

    /// Validates invariants. A failure here is fatal to startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;

        if self.cache_ttl.is_zero() {
            return Err(ConfigError::NotPositive {
                name: Self::ENV_CACHE_TTL_SECS,
            });
        }
        if self.top_k == 0 {
            return Err(ConfigError::NotPositive {
                name: Self::ENV_TOP_K,
            });
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::NotPositive {
                name: Self::ENV_CACHE_CAPACITY,
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::NotPositive {
                name: Self::ENV_REQUEST_TIMEOUT_MS,
            });
        }
        if !self.context_boost.is_finite() || self.context_boost < 0.0 {
            return Err(ConfigError::InvalidBoost {
                value: self.context_boost,
            });
        }

        Ok(())
    }

    /// Returns `true` if an external cache store is configured.
    pub fn has_cache_store(&self) -> bool {
        self.redis_url.is_some()
    }

    fn parse_number_from_env<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
        match env::var(name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name, value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(name) {
            Ok(value) => match value.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(ConfigError::InvalidBool { name, value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(name: &str) -> Option<String> {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
