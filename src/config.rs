//! Configuration for the cache layer.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file. Every setting has a default so the cache works without any
//! configuration at all.

use crate::cache::DEFAULT_TTL;
use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::time::Duration;

/// Configuration for cache instances and logging.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied when a caller does not pass one (default: 60 seconds)
    pub default_ttl: Duration,

    /// TTL for memoized pitch analyses (default: same as `default_ttl`)
    pub analysis_ttl: Duration,

    /// Log level (default: "error")
    pub log_level: String,
}

impl CacheConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `CACHE_DEFAULT_TTL_SECS`: default TTL in seconds (default: 60)
    /// - `ANALYSIS_CACHE_TTL_SECS`: analysis TTL in seconds (default: the default TTL)
    /// - `LOG_LEVEL`: logging level (default: "error")
    pub fn from_env() -> ConfigResult<Self> {
        // dotenvy does not print to stdout, and a missing file is fine
        let _ = dotenvy::dotenv();

        let default_ttl_secs = Self::parse_env_u64("CACHE_DEFAULT_TTL_SECS", DEFAULT_TTL.as_secs())?;
        let analysis_ttl_secs = Self::parse_env_u64("ANALYSIS_CACHE_TTL_SECS", default_ttl_secs)?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "error".to_string());
        if log_level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "LOG_LEVEL".to_string(),
                reason: "Cannot be empty".to_string(),
            });
        }

        Ok(CacheConfig {
            default_ttl: Duration::from_secs(default_ttl_secs),
            analysis_ttl: Duration::from_secs(analysis_ttl_secs),
            log_level,
        })
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a non-negative number of seconds, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            default_ttl: DEFAULT_TTL,
            analysis_ttl: DEFAULT_TTL,
            log_level: "error".to_string(),
        }
    }
}
