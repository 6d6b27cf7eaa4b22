//! TTL memoization of recommendation lists with per-key single-flight.
//!
//! Lookup order: in-process entry, then the optional [`CacheStore`], then `compute`.
//! Concurrent callers on one key share a single computation through moka's entry API;
//! a failed computation inserts nothing and every waiter sees the same error.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use moka::Expiry;
use moka::future::Cache;
use tracing::{debug, warn};

use super::store::CacheStore;
use super::types::{CacheEntry, CacheKey, CacheLookup, CacheStatus};
use crate::combiner::RecommendationList;

/// Expires each entry at its own `expires_at`.
struct EntryExpiry;

impl Expiry<CacheKey, Arc<CacheEntry>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &Arc<CacheEntry>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.remaining_ttl(Utc::now()).unwrap_or(Duration::ZERO))
    }
}

/// In-process recommendation cache, optionally written through to a [`CacheStore`].
pub struct RecommendationCache {
    entries: Cache<CacheKey, Arc<CacheEntry>>,
    store: Option<Arc<dyn CacheStore>>,
    ttl: Duration,
}

impl RecommendationCache {
    /// Creates a cache bounded to `capacity` entries, each living for `ttl`.
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .expire_after(EntryExpiry)
                .build(),
            store: None,
            ttl,
        }
    }

    /// Attaches an external store consulted on in-process misses.
    pub fn with_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the list for `key`, computing it at most once across concurrent callers.
    pub async fn get_or_compute<F, E>(
        &self,
        key: CacheKey,
        compute: F,
    ) -> Result<CacheLookup, Arc<E>>
    where
        F: Future<Output = Result<RecommendationList, E>>,
        E: Send + Sync + 'static,
    {
        if let Some(existing) = self.entries.get(&key).await {
            if existing.is_expired() {
                debug!(key = %key, "Dropping expired cache entry");
                self.entries.invalidate(&key).await;
            }
        }

        let mut from_store = false;
        let init = async {
            if let Some(entry) = self.load_from_store(&key).await {
                from_store = true;
                return Ok(Arc::new(entry));
            }

            let list = compute.await?;
            let entry = CacheEntry::new(key.clone(), list, self.ttl);
            self.write_to_store(&entry).await;
            Ok::<_, E>(Arc::new(entry))
        };

        let entry = self.entries.entry(key.clone()).or_try_insert_with(init).await?;

        let status = if !entry.is_fresh() {
            CacheStatus::Hit
        } else if from_store {
            CacheStatus::StoreHit
        } else {
            CacheStatus::Miss
        };
        debug!(key = %key, status = %status, "Recommendation cache lookup");

        Ok(CacheLookup::new(entry.into_value(), status))
    }

    /// Returns the in-process entry for `key` if present and not expired.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.entries
            .get(key)
            .await
            .filter(|entry| !entry.is_expired())
    }

    /// Removes `key` from the in-process cache and the store.
    pub async fn invalidate(&self, key: &CacheKey) {
        self.entries.invalidate(key).await;
        if let Some(store) = &self.store {
            if let Err(e) = store.delete(&key.store_key()).await {
                warn!(key = %key, error = %e, "Cache store delete failed");
            }
        }
    }

    /// Removes every entry of `user_id`. Returns the number of in-process entries removed.
    pub async fn invalidate_user(&self, user_id: &str) -> usize {
        let keys: Vec<Arc<CacheKey>> = self
            .entries
            .iter()
            .filter(|(k, _)| k.user_id == user_id)
            .map(|(k, _)| k)
            .collect();

        for key in &keys {
            self.entries.invalidate(key.as_ref()).await;
        }

        if let Some(store) = &self.store {
            match store.delete_prefix(&CacheKey::user_prefix(user_id)).await {
                Ok(deleted) => debug!(user_id = %user_id, deleted, "Cleared user from cache store"),
                Err(e) => warn!(user_id = %user_id, error = %e, "Cache store clear failed"),
            }
        }

        keys.len()
    }

    /// Approximate number of in-process entries.
    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    /// Runs pending eviction and expiry maintenance.
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }

    async fn load_from_store(&self, key: &CacheKey) -> Option<CacheEntry> {
        let store = self.store.as_ref()?;

        let raw = match store.get(&key.store_key()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache store read failed, computing locally");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) if entry.key == *key && !entry.is_expired() => Some(entry),
            Ok(_) => {
                debug!(key = %key, "Ignoring stale cache store entry");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Undecodable cache store entry");
                None
            }
        }
    }

    async fn write_to_store(&self, entry: &CacheEntry) {
        let Some(store) = &self.store else {
            return;
        };

        let ttl_secs = entry
            .remaining_ttl(Utc::now())
            .map(|d| d.as_secs().max(1))
            .unwrap_or(1);

        let result = match serde_json::to_string(entry) {
            Ok(json) => store.set(&entry.key.store_key(), &json, ttl_secs).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            warn!(key = %entry.key, error = %e, "Cache store write failed");
        }
    }
}

impl std::fmt::Debug for RecommendationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationCache")
            .field("entries", &self.entries.entry_count())
            .field("ttl", &self.ttl)
            .field("has_store", &self.store.is_some())
            .finish()
    }
}
