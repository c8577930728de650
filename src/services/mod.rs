//! Application service layer.
//!
//! Services own their caches explicitly (no process-wide instance) and treat
//! them purely as an optimization over the underlying computation.

mod analysis_service;

pub use analysis_service::{
    AnalysisService, AnalysisServiceImpl, BlockingPitchAnalyzer, PitchAnalyzer,
};
