//! Pitch analysis request and result models.

use serde::{Deserialize, Serialize};

/// A request to analyze a startup pitch.
///
/// Every field takes part in the cache fingerprint, so two requests only
/// share a cached analysis when they are identical.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PitchAnalysisRequest {
    /// Startup the pitch belongs to
    pub startup_id: String,

    /// Pitch text submitted for analysis
    pub pitch_text: String,

    /// Optional area to focus on (e.g. "market", "team")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

impl PitchAnalysisRequest {
    pub fn new(startup_id: impl Into<String>, pitch_text: impl Into<String>) -> Self {
        Self {
            startup_id: startup_id.into(),
            pitch_text: pitch_text.into(),
            focus: None,
        }
    }

    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = Some(focus.into());
        self
    }
}

/// The result of analyzing a pitch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PitchAnalysis {
    /// Short narrative summary
    pub summary: String,

    /// Overall score, 0-100
    pub score: u8,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub risks: Vec<String>,
}
