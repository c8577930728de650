//! Error types for the cache layer and its consumers.
//!
//! The cache itself never fails: a missing or stale key is a normal `None`,
//! and errors raised by a memoized computation are handed back unchanged.
//! The types here cover configuration and the analysis service.

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Errors raised while producing a pitch analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The request failed validation before reaching the analyzer
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream analyzer (AI model, external API) failed
    #[error("Upstream analyzer failed: {0}")]
    Upstream(String),

    /// Request parameters could not be fingerprinted
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenience type alias for Results with AnalysisError
pub type AnalysisResult<T> = Result<T, AnalysisError>;
