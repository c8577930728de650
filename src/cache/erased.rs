//! Type-erased cache for heterogeneous values.
//!
//! One [`ErasedCache`] can hold values of different types under different key
//! namespaces. Callers name the type they expect on every read; a read with
//! the wrong type behaves like a miss.

use super::ttl_cache::TtlCache;
use crate::observability::{CacheObserver, CacheOutcome};
use std::any::{type_name, Any};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

type ErasedValue = Arc<dyn Any + Send + Sync>;

/// A [`TtlCache`] storing `Arc<dyn Any>` with checked downcasts.
#[derive(Clone, Debug, Default)]
pub struct ErasedCache {
    inner: TtlCache<ErasedValue>,
}

impl ErasedCache {
    /// Create an erased cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: TtlCache::new(default_ttl),
        }
    }

    /// Create an erased cache whose log events carry `name`.
    pub fn named(name: impl Into<String>, default_ttl: Duration) -> Self {
        Self {
            inner: TtlCache::named(name, default_ttl),
        }
    }

    /// Replace the observer that receives hit/miss signals.
    pub fn with_observer(self, observer: Arc<dyn CacheObserver>) -> Self {
        Self {
            inner: self.inner.with_observer(observer),
        }
    }

    /// Store `value` under `key`, replacing whatever was there.
    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.inner.set(key, Arc::new(value));
    }

    /// Read a fresh value of type `T` under the default TTL.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.get_with_ttl(key, self.inner.default_ttl())
    }

    /// Read a value of type `T` no older than `ttl`.
    ///
    /// A value stored under a different type yields `None` and is left in place.
    pub fn get_with_ttl<T: Any + Send + Sync>(&self, key: &str, ttl: Duration) -> Option<Arc<T>> {
        self.inner
            .get_with_ttl(key, ttl)
            .and_then(|value| self.downcast(key, value))
    }

    /// Remove every entry whose key contains `fragment`.
    pub fn invalidate(&self, fragment: &str) {
        self.inner.invalidate(fragment);
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Number of entries held, including stale ones.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Memoize a computation producing `T` under the default TTL.
    pub async fn get_or_compute<T, F, Fut, E>(&self, key: &str, compute: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let ttl = self.inner.default_ttl();
        self.get_or_compute_with_ttl(key, ttl, compute).await
    }

    /// Memoize a computation producing `T`.
    ///
    /// A cached value of another type counts as a miss and is overwritten.
    pub async fn get_or_compute_with_ttl<T, F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get_with_ttl::<T>(key, ttl) {
            self.inner.notify(key, CacheOutcome::Hit);
            return Ok(value);
        }
        self.inner.notify(key, CacheOutcome::Miss);

        let value = Arc::new(
            compute()
                .await
                .inspect_err(|_| self.inner.log_compute_failure(key))?,
        );
        self.inner.set(key, value.clone() as ErasedValue);
        Ok(value)
    }

    fn downcast<T: Any + Send + Sync>(&self, key: &str, value: ErasedValue) -> Option<Arc<T>> {
        match value.downcast::<T>() {
            Ok(typed) => Some(typed),
            Err(_) => {
                tracing::warn!(
                    cache = %self.inner.name(),
                    key = %key,
                    expected = type_name::<T>(),
                    "Cached value has a different type"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Score(u8);

    #[test]
    fn test_heterogeneous_values() {
        let cache = ErasedCache::new(Duration::from_secs(60));
        cache.set("score:acme", Score(87));
        cache.set("summary:acme", "Solid team".to_string());

        assert_eq!(cache.get::<Score>("score:acme").as_deref(), Some(&Score(87)));
        assert_eq!(
            cache.get::<String>("summary:acme").as_deref().map(String::as_str),
            Some("Solid team")
        );
    }

    #[test]
    fn test_wrong_type_reads_as_miss_and_keeps_entry() {
        let cache = ErasedCache::new(Duration::from_secs(60));
        cache.set("score:acme", Score(87));

        assert!(cache.get::<String>("score:acme").is_none());
        assert_eq!(cache.len(), 1);
        assert!(cache.get::<Score>("score:acme").is_some());
    }

    #[tokio::test]
    async fn test_get_or_compute_replaces_mistyped_entry() {
        let cache = ErasedCache::new(Duration::from_secs(60));
        cache.set("k", 1u32);

        let value = cache
            .get_or_compute("k", || async { Ok::<_, String>("text".to_string()) })
            .await
            .unwrap();

        assert_eq!(value.as_str(), "text");
        assert!(cache.get::<u32>("k").is_none());
    }

    #[tokio::test]
    async fn test_get_or_compute_error_not_cached() {
        let cache = ErasedCache::new(Duration::from_secs(60));

        let result = cache
            .get_or_compute::<u32, _, _, _>("k", || async { Err("nope") })
            .await;

        assert_eq!(result, Err("nope"));
        assert!(cache.is_empty());
    }
}
