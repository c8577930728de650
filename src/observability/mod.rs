//! Observability for cache consumers.
//!
//! The cache emits a hit/miss signal from its memoization wrapper through a
//! [`CacheObserver`]. The default observer forwards it to `tracing`; tests and
//! callers can plug in their own.

pub mod observer;

pub use observer::{init_tracing, CacheObserver, CacheOutcome, TracingObserver};
