use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::combiner::RecommendationList;
use crate::constants::CACHE_KEY_PREFIX;
use crate::hashing::context_fingerprint;
use crate::model::{Context, UserId};

/// Identity of one cached recommendation list: a user under a context fingerprint.
///
/// The string form `recommendations:{user_id}:{fingerprint:016x}` is the cache store key.
/// `user_id` is escaped so that no user's prefix is a prefix of another user's keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub user_id: UserId,
    pub fingerprint: u64,
}

impl CacheKey {
    pub fn new(user_id: impl Into<UserId>, fingerprint: u64) -> Self {
        Self {
            user_id: user_id.into(),
            fingerprint,
        }
    }

    /// Builds the key for `user_id` under `context` (timestamp is not part of the key).
    pub fn for_request(user_id: &str, context: &Context) -> Self {
        Self::new(user_id, context_fingerprint(context))
    }

    /// Store-key prefix shared by every entry of `user_id`.
    pub fn user_prefix(user_id: &str) -> String {
        format!("{CACHE_KEY_PREFIX}:{}:", escape_segment(user_id))
    }

    /// Returns the cache store key.
    pub fn store_key(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{CACHE_KEY_PREFIX}:{}:{:016x}",
            escape_segment(&self.user_id),
            self.fingerprint
        )
    }
}

/// Percent-encodes the key separator, `%` itself and glob metacharacters.
fn escape_segment(segment: &str) -> String {
    let mut escaped = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '%' | ':' | '*' | '?' | '[' | ']' | '\\' => {
                escaped.push_str(&format!("%{:02X}", c as u32));
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A computed list together with its validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub list: RecommendationList,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry stamped now that expires after `ttl`.
    pub fn new(key: CacheKey, list: RecommendationList, ttl: Duration) -> Self {
        Self::created_at(key, list, Utc::now(), ttl)
    }

    pub fn created_at(
        key: CacheKey,
        list: RecommendationList,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|delta| created_at.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            key,
            list,
            created_at,
            expires_at,
        }
    }

    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Time left before expiry, or `None` once expired.
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.expires_at - now)
            .to_std()
            .ok()
            .filter(|d| !d.is_zero())
    }
}

/// Where a lookup was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// In-process entry (or a computation shared with a concurrent caller).
    Hit,
    /// Adopted from the external cache store.
    StoreHit,
    /// Computed by this call.
    Miss,
}

impl CacheStatus {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::StoreHit => "STORE_HIT",
            CacheStatus::Miss => "MISS",
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        !matches!(self, CacheStatus::Miss)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of [`RecommendationCache::get_or_compute`](super::RecommendationCache::get_or_compute).
#[derive(Debug, Clone)]
pub struct CacheLookup {
    entry: std::sync::Arc<CacheEntry>,
    status: CacheStatus,
}

impl CacheLookup {
    pub(crate) fn new(entry: std::sync::Arc<CacheEntry>, status: CacheStatus) -> Self {
        Self { entry, status }
    }

    #[inline]
    pub fn status(&self) -> CacheStatus {
        self.status
    }

    #[inline]
    pub fn entry(&self) -> &CacheEntry {
        &self.entry
    }

    #[inline]
    pub fn list(&self) -> &RecommendationList {
        &self.entry.list
    }

    pub fn into_list(self) -> RecommendationList {
        match std::sync::Arc::try_unwrap(self.entry) {
            Ok(entry) => entry.list,
            Err(shared) => shared.list.clone(),
        }
    }
}
