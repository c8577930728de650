//! Hit/miss signalling and log setup.

use crate::config::CacheConfig;
use std::fmt;
use tracing_subscriber::EnvFilter;

/// Outcome of a memoized lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// The value was served from the cache.
    Hit,
    /// The value was absent or stale and had to be computed.
    Miss,
}

impl fmt::Display for CacheOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "hit"),
            Self::Miss => write!(f, "miss"),
        }
    }
}

/// Receives the hit/miss signal emitted by `get_or_compute`.
///
/// Implementations must be cheap: they are called on every memoized lookup,
/// although never while the cache's mapping is locked.
pub trait CacheObserver: Send + Sync {
    fn on_access(&self, cache: &str, key: &str, outcome: CacheOutcome);
}

/// Default observer that writes the signal as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CacheObserver for TracingObserver {
    fn on_access(&self, cache: &str, key: &str, outcome: CacheOutcome) {
        match outcome {
            CacheOutcome::Hit => tracing::debug!(cache = %cache, key = %key, "Cache hit"),
            CacheOutcome::Miss => tracing::debug!(cache = %cache, key = %key, "Cache miss"),
        }
    }
}

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `config.log_level` is used. Calling
/// this more than once is harmless, later calls leave the first subscriber in
/// place.
pub fn init_tracing(config: &CacheConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
