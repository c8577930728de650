//! Data models for the values the cache memoizes.

pub mod analysis;

pub use analysis::{PitchAnalysis, PitchAnalysisRequest};
