//! Caching utilities.
//!
//! [`TtlCache`] is the core: a process-local string-keyed cache whose
//! freshness is decided at read time, plus a memoization wrapper.
//! [`SingleFlightCache`] adds opt-in deduplication of concurrent misses and
//! [`ErasedCache`] holds values of mixed types.

pub mod erased;
pub mod key;
pub mod single_flight;
pub mod ttl_cache;

pub use erased::ErasedCache;
pub use key::{cache_key, fingerprint};
pub use single_flight::SingleFlightCache;
pub use ttl_cache::{TtlCache, DEFAULT_TTL};
