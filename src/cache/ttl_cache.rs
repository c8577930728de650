//! Time-based cache with read-time TTL and a memoization wrapper.
//!
//! Entries only record when they were written. Freshness is decided when an
//! entry is read, against the TTL the reader passes (or the cache default),
//! so the same entry can be fresh for one caller and stale for another.
//! Stale entries are dropped lazily by the read that finds them; there is no
//! background sweep.

use crate::config::CacheConfig;
use crate::observability::{CacheObserver, CacheOutcome, TracingObserver};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// TTL used when neither the caller nor the constructor supplies one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

const DEFAULT_NAME: &str = "ttl_cache";

/// A cache entry with a timestamp.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
        }
    }

    /// A zero TTL is never fresh.
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        !ttl.is_zero() && now.saturating_duration_since(self.inserted_at) <= ttl
    }
}

/// A thread-safe, process-local cache keyed by string fingerprints.
///
/// Cloning is cheap and yields a handle onto the same entries, so one cache
/// can be handed to every service that needs it.
///
/// The memoization wrapper does **not** deduplicate concurrent misses: two
/// callers missing on the same key both run their computation and the later
/// write wins. Use [`SingleFlightCache`](super::SingleFlightCache) when
/// duplicate work must be avoided.
///
/// For large values, store an `Arc` so reads don't deep-copy:
/// ```
/// use pitch_cache::TtlCache;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let cache: TtlCache<Arc<Vec<u8>>> = TtlCache::new(Duration::from_secs(60));
/// cache.set("report:42", Arc::new(vec![0u8; 1024]));
/// assert_eq!(cache.get("report:42").map(|v| v.len()), Some(1024));
/// ```
#[derive(Clone)]
pub struct TtlCache<V> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
    default_ttl: Duration,
    name: Arc<str>,
    observer: Arc<dyn CacheObserver>,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self::named(DEFAULT_NAME, default_ttl)
    }

    /// Create a cache whose name appears in log events.
    pub fn named(name: impl Into<String>, default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
            name: Arc::from(name.into()),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Create a cache using the configured default TTL.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.default_ttl)
    }

    /// Replace the observer that receives hit/miss signals.
    pub fn with_observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Get a value if it exists and is fresh under the default TTL.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_with_ttl(key, self.default_ttl)
    }

    /// Get a value if it exists and is no older than `ttl`.
    ///
    /// An entry found to be stale is removed before `None` is returned.
    pub fn get_with_ttl(&self, key: &str, ttl: Duration) -> Option<V> {
        let now = Instant::now();

        {
            let entries = self.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.is_fresh(ttl, now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        // Another writer may have refreshed the entry between the two locks.
        let mut entries = self.write();
        if let Some(entry) = entries.get(key) {
            if entry.is_fresh(ttl, now) {
                return Some(entry.value.clone());
            }
            entries.remove(key);
            tracing::trace!(cache = %self.name, key = %key, "Expired entry removed");
        }

        None
    }

    /// Insert or replace the value for `key`, stamping it with the current time.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.write().insert(key.into(), CacheEntry::new(value));
    }

    /// Remove every entry whose key contains `fragment` as a literal substring.
    ///
    /// An empty fragment would match everything and is ignored; use
    /// [`clear`](Self::clear) to drop all entries.
    pub fn invalidate(&self, fragment: &str) {
        if fragment.is_empty() {
            tracing::warn!(cache = %self.name, "Ignoring invalidation with empty key fragment");
            return;
        }

        let removed = {
            let mut entries = self.write();
            let before = entries.len();
            entries.retain(|key, _| !key.contains(fragment));
            before - entries.len()
        };

        tracing::debug!(
            cache = %self.name,
            fragment = %fragment,
            removed = removed,
            "Cache entries invalidated"
        );
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// Uses the default TTL. See [`get_or_compute_with_ttl`](Self::get_or_compute_with_ttl).
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_or_compute_with_ttl(key, self.default_ttl, compute)
            .await
    }

    /// Return the cached value for `key` if no older than `ttl`, otherwise run
    /// `compute`, store its result and return it.
    ///
    /// `compute` runs without any lock held. If it fails, nothing is stored
    /// and its error is returned as-is.
    pub async fn get_or_compute_with_ttl<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.lookup(key, ttl) {
            return Ok(value);
        }

        let value = compute().await.inspect_err(|_| self.log_compute_failure(key))?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Synchronous counterpart of [`get_or_compute`](Self::get_or_compute).
    pub fn get_or_compute_blocking<F, E>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        self.get_or_compute_blocking_with_ttl(key, self.default_ttl, compute)
    }

    /// Synchronous counterpart of
    /// [`get_or_compute_with_ttl`](Self::get_or_compute_with_ttl).
    pub fn get_or_compute_blocking_with_ttl<F, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.lookup(key, ttl) {
            return Ok(value);
        }

        let value = compute().inspect_err(|_| self.log_compute_failure(key))?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Number of entries held, including stale ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// TTL applied when callers don't pass one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Name used in log events.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `get_with_ttl` plus the hit/miss signal.
    fn lookup(&self, key: &str, ttl: Duration) -> Option<V> {
        let value = self.get_with_ttl(key, ttl);
        let outcome = if value.is_some() {
            CacheOutcome::Hit
        } else {
            CacheOutcome::Miss
        };
        self.notify(key, outcome);
        value
    }

    pub(crate) fn notify(&self, key: &str, outcome: CacheOutcome) {
        self.observer.on_access(&self.name, key, outcome);
    }

    pub(crate) fn log_compute_failure(&self, key: &str) {
        tracing::debug!(cache = %self.name, key = %key, "Computation failed, nothing cached");
    }

    // The map is only mutated through single HashMap calls, so a panic in
    // another thread can't leave it half-updated and poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V: Clone> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("default_ttl", &self.default_ttl)
            .field("entries", &self.len())
            .finish()
    }
}
