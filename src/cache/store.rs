//! External cache store shared across processes.
//!
//! Values are opaque strings (JSON-encoded [`CacheEntry`](super::CacheEntry)). Every
//! failure is reported to the caller, which logs it and carries on without the store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::debug;

use super::error::{CacheStoreError, CacheStoreResult};

const SCAN_BATCH: usize = 100;

#[async_trait]
/// Key/value store with per-key TTL.
pub trait CacheStore: Send + Sync {
    /// Returns the value stored at `key`, if any.
    async fn get(&self, key: &str) -> CacheStoreResult<Option<String>>;
    /// Stores `value` at `key` for `ttl_secs` seconds.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheStoreResult<()>;
    /// Deletes `key`. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> CacheStoreResult<bool>;
    /// Deletes every key starting with `prefix`. Returns the number deleted.
    async fn delete_prefix(&self, prefix: &str) -> CacheStoreResult<usize>;
}

/// Redis-backed store.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: ConnectionManager,
}

impl RedisCacheStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Opens a managed connection to `url` (e.g. `redis://127.0.0.1:6379/0`).
    pub async fn connect(url: &str) -> CacheStoreResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        debug!(url = %url, "Connected to cache store");
        Ok(Self::new(conn))
    }
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> CacheStoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheStoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_secs.max(1))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheStoreResult<bool> {
        let mut conn = self.conn.clone();
        let removed: usize = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(removed > 0)
    }

    async fn delete_prefix(&self, prefix: &str) -> CacheStoreResult<usize> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", glob_escape(prefix));
        let mut cursor: u64 = 0;
        let mut deleted = 0usize;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let removed: usize = redis::cmd("DEL").arg(&keys).query_async(&mut conn).await?;
                deleted += removed;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(prefix = %prefix, deleted, "Cache store prefix delete");
        Ok(deleted)
    }
}

/// Escapes Redis glob metacharacters so `pattern` matches literally.
pub(super) fn glob_escape(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(any(test, feature = "mock"))]
pub use mock::InMemoryCacheStore;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::CacheStore;
    use crate::cache::error::{CacheStoreError, CacheStoreResult};

    /// In-process stand-in for an external store. TTLs are recorded, not enforced.
    #[derive(Debug, Default)]
    pub struct InMemoryCacheStore {
        values: Mutex<BTreeMap<String, (String, u64)>>,
        failing: AtomicBool,
        gets: AtomicUsize,
        sets: AtomicUsize,
        prefix_deletes: AtomicUsize,
    }

    impl InMemoryCacheStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every operation fail with [`CacheStoreError::Unavailable`].
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn raw(&self, key: &str) -> Option<String> {
            self.values.lock().get(key).map(|(v, _)| v.clone())
        }

        pub fn ttl_secs(&self, key: &str) -> Option<u64> {
            self.values.lock().get(key).map(|(_, ttl)| *ttl)
        }

        pub fn insert_raw(&self, key: &str, value: &str, ttl_secs: u64) {
            self.values
                .lock()
                .insert(key.to_string(), (value.to_string(), ttl_secs));
        }

        pub fn len(&self) -> usize {
            self.values.lock().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub fn get_count(&self) -> usize {
            self.gets.load(Ordering::SeqCst)
        }

        pub fn set_count(&self) -> usize {
            self.sets.load(Ordering::SeqCst)
        }

        pub fn prefix_delete_count(&self) -> usize {
            self.prefix_deletes.load(Ordering::SeqCst)
        }

        fn check(&self) -> CacheStoreResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(CacheStoreError::Unavailable {
                    reason: "store marked failing".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CacheStore for InMemoryCacheStore {
        async fn get(&self, key: &str) -> CacheStoreResult<Option<String>> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self.raw(key))
        }

        async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheStoreResult<()> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            self.insert_raw(key, value, ttl_secs);
            Ok(())
        }

        async fn delete(&self, key: &str) -> CacheStoreResult<bool> {
            self.check()?;
            Ok(self.values.lock().remove(key).is_some())
        }

        async fn delete_prefix(&self, prefix: &str) -> CacheStoreResult<usize> {
            self.prefix_deletes.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let mut values = self.values.lock();
            let before = values.len();
            values.retain(|k, _| !k.starts_with(prefix));
            Ok(before - values.len())
        }
    }
}
