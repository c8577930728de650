pub mod mock_analyzer;

#[allow(unused_imports)]
pub use mock_analyzer::MockPitchAnalyzer;
