use async_trait::async_trait;
use pitch_cache::error::{AnalysisError, AnalysisResult};
use pitch_cache::models::{PitchAnalysis, PitchAnalysisRequest};
use pitch_cache::services::PitchAnalyzer;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock analyzer for testing.
///
/// Scores each startup from a preset table, counts calls per startup, and can
/// be told to fail or to take a while.
#[allow(dead_code)]
#[derive(Clone)]
pub struct MockPitchAnalyzer {
    scores: Arc<Mutex<HashMap<String, u8>>>,
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
    failure: Arc<Mutex<Option<String>>>,
    delay: Duration,
}

#[allow(dead_code)]
impl MockPitchAnalyzer {
    pub fn new() -> Self {
        Self {
            scores: Arc::new(Mutex::new(HashMap::new())),
            call_counts: Arc::new(Mutex::new(HashMap::new())),
            failure: Arc::new(Mutex::new(None)),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_score(&self, startup_id: &str, score: u8) {
        let mut scores = self.scores.lock().unwrap();
        scores.insert(startup_id.to_string(), score);
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn get_call_count(&self, startup_id: &str) -> usize {
        let counts = self.call_counts.lock().unwrap();
        *counts.get(startup_id).unwrap_or(&0)
    }

    pub fn total_calls(&self) -> usize {
        self.call_counts.lock().unwrap().values().sum()
    }

    fn track_call(&self, startup_id: &str) {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(startup_id.to_string()).or_insert(0) += 1;
    }
}

impl Default for MockPitchAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PitchAnalyzer for MockPitchAnalyzer {
    async fn analyze(&self, request: &PitchAnalysisRequest) -> AnalysisResult<PitchAnalysis> {
        self.track_call(&request.startup_id);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(AnalysisError::Upstream(message));
        }

        let score = self
            .scores
            .lock()
            .unwrap()
            .get(&request.startup_id)
            .copied()
            .unwrap_or(50);

        Ok(PitchAnalysis {
            summary: format!("{} ({} chars)", request.startup_id, request.pitch_text.len()),
            score,
            strengths: vec!["Clear problem statement".to_string()],
            risks: Vec::new(),
        })
    }
}
