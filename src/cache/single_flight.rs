//! Opt-in deduplication of concurrent misses.
//!
//! [`TtlCache`] lets every caller that misses run its own computation. This
//! wrapper serializes misses per key: the first caller computes while later
//! callers for the same key wait, then find the fresh value in the cache.
//! Callers on different keys never wait on each other.

use super::ttl_cache::TtlCache;
use crate::observability::{CacheObserver, CacheOutcome};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type FlightRegistry = Arc<Mutex<HashMap<String, FlightSlot>>>;

/// A key's flight lock and the number of callers holding or awaiting it.
struct FlightSlot {
    lock: Arc<AsyncMutex<()>>,
    callers: usize,
}

/// A [`TtlCache`] whose memoization wrapper computes each key at most once
/// at a time.
#[derive(Clone)]
pub struct SingleFlightCache<V> {
    inner: TtlCache<V>,
    flights: FlightRegistry,
}

/// One caller's membership in a key's flight.
///
/// Registered before waiting on the lock, so a caller dropped while still
/// waiting leaves the registry as well.
struct Flight {
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
    flights: FlightRegistry,
}

impl Flight {
    async fn join(flights: &FlightRegistry, key: &str) -> Self {
        let lock = {
            let mut registry = flights.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = registry.entry(key.to_string()).or_insert_with(|| FlightSlot {
                lock: Arc::new(AsyncMutex::new(())),
                callers: 0,
            });
            slot.callers += 1;
            slot.lock.clone()
        };

        let mut flight = Self {
            key: key.to_string(),
            guard: None,
            flights: flights.clone(),
        };
        flight.guard = Some(lock.lock_owned().await);
        flight
    }
}

impl Drop for Flight {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut registry = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = registry.get_mut(&self.key) {
            slot.callers = slot.callers.saturating_sub(1);
            if slot.callers == 0 {
                registry.remove(&self.key);
            }
        }
    }
}

impl<V: Clone> SingleFlightCache<V> {
    /// Create a deduplicating cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self::wrap(TtlCache::new(default_ttl))
    }

    /// Add deduplication on top of an existing cache.
    ///
    /// The wrapped cache keeps working; callers going through it directly
    /// bypass deduplication.
    pub fn wrap(inner: TtlCache<V>) -> Self {
        Self {
            inner,
            flights: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Replace the observer that receives hit/miss signals.
    pub fn with_observer(self, observer: Arc<dyn CacheObserver>) -> Self {
        Self {
            inner: self.inner.with_observer(observer),
            flights: self.flights,
        }
    }

    /// The wrapped cache.
    pub fn inner(&self) -> &TtlCache<V> {
        &self.inner
    }

    /// Read a fresh value under the default TTL.
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key)
    }

    /// Read a value no older than `ttl`.
    pub fn get_with_ttl(&self, key: &str, ttl: Duration) -> Option<V> {
        self.inner.get_with_ttl(key, ttl)
    }

    /// Insert or replace the value for `key`.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.inner.set(key, value);
    }

    /// Remove every entry whose key contains `fragment`.
    pub fn invalidate(&self, fragment: &str) {
        self.inner.invalidate(fragment);
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Deduplicating memoization with the default TTL.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let ttl = self.inner.default_ttl();
        self.get_or_compute_with_ttl(key, ttl, compute).await
    }

    /// Deduplicating memoization.
    ///
    /// On a miss the caller takes the key's flight lock, checks the cache
    /// again, and only computes if the value is still absent. A failed
    /// computation stores nothing, so the next waiter computes in turn.
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
        if let Some(value) = self.inner.get_with_ttl(key, ttl) {
            self.inner.notify(key, CacheOutcome::Hit);
            return Ok(value);
        }

        let _flight = Flight::join(&self.flights, key).await;

        self.inner
            .get_or_compute_with_ttl(key, ttl, compute)
            .await
    }

    /// Number of keys currently being computed or waited on.
    pub fn in_flight(&self) -> usize {
        self.flights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<V: Clone> std::fmt::Debug for SingleFlightCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlightCache")
            .field("inner", &self.inner)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
