//! Pitch Cache - an in-process TTL cache with memoization.
//!
//! Avoids recomputing expensive calls (AI pitch analyses, external API
//! requests) within a short time window. Entries live in memory only and are
//! keyed by caller-chosen string fingerprints.
//!
//! # Architecture
//!
//! - **cache**: `TtlCache` plus the opt-in `SingleFlightCache` and the
//!   type-erased `ErasedCache`, and key fingerprint helpers
//! - **observability**: hit/miss signalling and log setup
//! - **config**: configuration from environment variables
//! - **error**: error types for configuration and analysis
//! - **models**: pitch analysis requests and results
//! - **services**: an analysis service memoizing a slow analyzer
//!
//! # Example
//!
//! ```
//! use pitch_cache::TtlCache;
//! use std::time::Duration;
//!
//! # tokio_test_block_on(async {
//! let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
//! let value = cache
//!     .get_or_compute("answer", || async { Ok::<_, std::io::Error>(42) })
//!     .await?;
//! assert_eq!(value, 42);
//! assert_eq!(cache.get("answer"), Some(42));
//! # Ok::<_, std::io::Error>(())
//! # }).unwrap();
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod services;

pub use cache::{cache_key, ErasedCache, SingleFlightCache, TtlCache, DEFAULT_TTL};
pub use config::CacheConfig;
pub use error::{AnalysisError, ConfigError};
pub use models::{PitchAnalysis, PitchAnalysisRequest};
pub use observability::{init_tracing, CacheObserver, CacheOutcome, TracingObserver};
pub use services::{AnalysisService, AnalysisServiceImpl, BlockingPitchAnalyzer, PitchAnalyzer};
