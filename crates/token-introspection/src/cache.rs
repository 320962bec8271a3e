//! Expiry-aware validation cache.
//!
//! [`ValidationCache`] layers introspection semantics over a plain
//! key-value [`KvCache`]:
//!
//! - Only active results are stored
//! - Entries are checked against the clock on every read; expired entries
//!   are invalidated and reported as a miss
//! - Store failures are logged and swallowed; caching never fails a
//!   validation
//!
//! Keys are the hex SHA-256 digest of the token so raw bearer tokens are
//! never used as cache keys.

use crate::clock::{Clock, SystemClock};
use crate::errors::CacheError;
use crate::models::IntrospectionResult;
use crate::observability::metrics;
use ring::digest::{digest, SHA256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Key-value store for cached introspection results.
///
/// Implementations must be safe for concurrent use; the validation cache
/// adds no locking of its own.
#[async_trait::async_trait]
pub trait KvCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<IntrospectionResult>;

    /// Insert or overwrite the entry for `key`.
    async fn put(&self, key: String, value: IntrospectionResult) -> Result<(), CacheError>;

    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;

    async fn has_key(&self, key: &str) -> bool;
}

/// Default entry cap of [`InMemoryKvCache::new`].
pub const DEFAULT_MAX_CACHE_ENTRIES: usize = 10_000;

/// In-process [`KvCache`] backed by a `HashMap`.
///
/// Bounded to `max_entries`. Expired entries are only removed when
/// [`ValidationCache`] reads them, so tokens that are never presented again
/// stay until the cap is reached; a write of a new key into a full cache
/// evicts the entry closest to expiry.
#[derive(Debug)]
pub struct InMemoryKvCache {
    entries: RwLock<HashMap<String, IntrospectionResult>>,
    max_entries: usize,
}

impl Default for InMemoryKvCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryKvCache {
    /// Cache holding at most [`DEFAULT_MAX_CACHE_ENTRIES`] entries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_CACHE_ENTRIES)
    }

    /// Cache holding at most `max_entries` entries (minimum 1).
    #[must_use]
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl KvCache for InMemoryKvCache {
    async fn get(&self, key: &str) -> Option<IntrospectionResult> {
        self.entries.read().await.get(key).cloned()
    }

    async fn put(&self, key: String, value: IntrospectionResult) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            // Entries without an expiry are evicted last.
            let soonest = entries
                .iter()
                .min_by_key(|(_, v)| v.expires_at().unwrap_or(i64::MAX))
                .map(|(k, _)| k.clone());
            if let Some(evicted) = soonest {
                entries.remove(&evicted);
                debug!(
                    target: "introspection.cache",
                    max_entries = self.max_entries,
                    "Cache full, evicted entry closest to expiry"
                );
            }
        }

        entries.insert(key, value);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn has_key(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Fresh cached result; no introspection needed.
    Hit(IntrospectionResult),
    Miss,
}

/// Expiry-aware cache of active introspection results.
///
/// Cheap to clone; clones share the underlying store.
#[derive(Clone)]
pub struct ValidationCache {
    store: Arc<dyn KvCache>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ValidationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationCache").finish_non_exhaustive()
    }
}

impl ValidationCache {
    /// Wrap `store`, checking expiry against the system clock.
    #[must_use]
    pub fn new(store: Arc<dyn KvCache>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(store: Arc<dyn KvCache>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Cache backed by a fresh [`InMemoryKvCache`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryKvCache::new()))
    }

    /// Store key for `token`: lowercase hex SHA-256 of the token bytes.
    #[must_use]
    pub fn cache_key(token: &str) -> String {
        hex::encode(digest(&SHA256, token.as_bytes()))
    }

    /// Look up a fresh result for `token`.
    ///
    /// An entry whose expiry has passed is invalidated and reported as a
    /// miss. An entry without an expiry is treated as fresh.
    pub async fn lookup(&self, token: &str) -> CacheLookup {
        let key = Self::cache_key(token);

        if !self.store.has_key(&key).await {
            metrics::record_cache_lookup("miss");
            return CacheLookup::Miss;
        }

        // Entry may have been removed between has_key and get.
        let Some(result) = self.store.get(&key).await else {
            metrics::record_cache_lookup("miss");
            return CacheLookup::Miss;
        };

        let now = self.clock.now_epoch_seconds();
        if !result.is_expired_at(now) {
            debug!(target: "introspection.cache", "Validation cache hit");
            metrics::record_cache_lookup("hit");
            return CacheLookup::Hit(result);
        }

        debug!(
            target: "introspection.cache",
            expires_at = ?result.expires_at(),
            now,
            "Cached result expired, invalidating"
        );
        if let Err(e) = self.store.invalidate(&key).await {
            // Next lookup retries the invalidation.
            warn!(target: "introspection.cache", error = %e, "Failed to invalidate expired cache entry");
        }
        metrics::record_cache_lookup("expired");
        CacheLookup::Miss
    }

    /// Store an active result for `token`, overwriting any prior entry.
    ///
    /// Inactive results are never cached. Store failures are logged and
    /// otherwise ignored.
    pub async fn store(&self, token: &str, result: &IntrospectionResult) {
        if !result.is_active() {
            debug!(target: "introspection.cache", "Refusing to cache inactive result");
            return;
        }

        match self
            .store
            .put(Self::cache_key(token), result.clone())
            .await
        {
            Ok(()) => {
                debug!(
                    target: "introspection.cache",
                    expires_at = ?result.expires_at(),
                    "Cached introspection result"
                );
            }
            Err(e) => {
                // Caching is best-effort: the caller still gets the result.
                warn!(target: "introspection.cache", error = %e, "Failed to cache introspection result, continuing");
                metrics::record_cache_write_failure();
            }
        }
    }
}

/// Mock cache stores for testing.
pub mod mock {
    use super::KvCache;
    use crate::errors::CacheError;
    use crate::models::IntrospectionResult;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that holds nothing and rejects every write.
    #[derive(Debug, Default)]
    pub struct FailingKvCache {
        put_attempts: AtomicUsize,
    }

    impl FailingKvCache {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of rejected writes.
        pub fn put_attempts(&self) -> usize {
            self.put_attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl KvCache for FailingKvCache {
        async fn get(&self, _key: &str) -> Option<IntrospectionResult> {
            None
        }

        async fn put(&self, _key: String, _value: IntrospectionResult) -> Result<(), CacheError> {
            self.put_attempts.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::Write("mock store rejects writes".to_string()))
        }

        async fn invalidate(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("mock store unavailable".to_string()))
        }

        async fn has_key(&self, _key: &str) -> bool {
            false
        }
    }
}
