//! Pitch analysis service layer.
//!
//! Wraps an expensive [`PitchAnalyzer`] (an AI model or external API) with a
//! [`TtlCache`] so identical requests inside the TTL window reuse the
//! previous result. The cache is only an optimization: every miss falls back
//! to the analyzer.

use crate::cache::{cache_key, TtlCache};
use crate::config::CacheConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{PitchAnalysis, PitchAnalysisRequest};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Produces analyses for pitches. Implementations are expected to be slow.
#[async_trait]
pub trait PitchAnalyzer: Send + Sync {
    async fn analyze(&self, request: &PitchAnalysisRequest) -> AnalysisResult<PitchAnalysis>;
}

type BlockingAnalyzeFn =
    dyn Fn(&PitchAnalysisRequest) -> AnalysisResult<PitchAnalysis> + Send + Sync;

/// Adapts a synchronous analyzer by running it on tokio's blocking pool.
#[derive(Clone)]
pub struct BlockingPitchAnalyzer {
    analyze_fn: Arc<BlockingAnalyzeFn>,
}

impl BlockingPitchAnalyzer {
    pub fn new<F>(analyze_fn: F) -> Self
    where
        F: Fn(&PitchAnalysisRequest) -> AnalysisResult<PitchAnalysis> + Send + Sync + 'static,
    {
        Self {
            analyze_fn: Arc::new(analyze_fn),
        }
    }
}

#[async_trait]
impl PitchAnalyzer for BlockingPitchAnalyzer {
    async fn analyze(&self, request: &PitchAnalysisRequest) -> AnalysisResult<PitchAnalysis> {
        let analyze_fn = self.analyze_fn.clone();
        let request = request.clone();

        tokio::task::spawn_blocking(move || analyze_fn(&request))
            .await
            .map_err(|e| AnalysisError::Upstream(format!("Task join error: {}", e)))?
    }
}

/// Analysis operations exposed to request handlers.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Analyze a pitch, reusing a cached analysis of an identical request.
    async fn analyze(&self, request: &PitchAnalysisRequest) -> AnalysisResult<Arc<PitchAnalysis>>;

    /// Drop every cached analysis for a startup.
    ///
    /// Should be called after the startup's pitch or profile changes.
    fn invalidate_startup(&self, startup_id: &str);

    /// Drop all cached analyses.
    fn clear(&self);
}

/// Default implementation of AnalysisService.
pub struct AnalysisServiceImpl {
    analyzer: Arc<dyn PitchAnalyzer>,
    cache: TtlCache<Arc<PitchAnalysis>>,
    ttl: Duration,
}

/// Validation helper functions.
impl AnalysisServiceImpl {
    fn validate_startup_id(startup_id: &str) -> Result<(), String> {
        if startup_id.trim().is_empty() {
            return Err("Startup ID cannot be empty".to_string());
        }
        if startup_id.contains(':') {
            return Err("Startup ID cannot contain ':'".to_string());
        }
        Ok(())
    }

    fn validate_request(request: &PitchAnalysisRequest) -> Result<(), String> {
        Self::validate_startup_id(&request.startup_id)?;
        if request.pitch_text.trim().is_empty() {
            return Err("Pitch text cannot be empty".to_string());
        }
        Ok(())
    }

    /// Namespace shared by every analysis of one startup.
    fn startup_namespace(startup_id: &str) -> String {
        format!("startup:{}:", startup_id)
    }
}

impl AnalysisServiceImpl {
    /// Create a new analysis service.
    ///
    /// # Arguments
    /// * `analyzer` - The expensive analysis backend
    /// * `cache` - Cache holding analyses; may be shared with other services
    /// * `ttl` - How long an analysis stays reusable
    pub fn new(
        analyzer: Arc<dyn PitchAnalyzer>,
        cache: TtlCache<Arc<PitchAnalysis>>,
        ttl: Duration,
    ) -> Self {
        Self {
            analyzer,
            cache,
            ttl,
        }
    }

    /// Create a service with its own cache, sized from configuration.
    pub fn from_config(analyzer: Arc<dyn PitchAnalyzer>, config: &CacheConfig) -> Self {
        let cache = TtlCache::named("pitch_analysis", config.analysis_ttl);
        Self::new(analyzer, cache, config.analysis_ttl)
    }

    /// Cache key for a request: `analysis:startup:{id}:{fingerprint}`.
    pub fn cache_key_for(request: &PitchAnalysisRequest) -> AnalysisResult<String> {
        let namespace = format!(
            "analysis:{}",
            Self::startup_namespace(&request.startup_id).trim_end_matches(':')
        );
        Ok(cache_key(&namespace, request)?)
    }

    /// The cache backing this service.
    pub fn cache(&self) -> &TtlCache<Arc<PitchAnalysis>> {
        &self.cache
    }
}

#[async_trait]
impl AnalysisService for AnalysisServiceImpl {
    async fn analyze(&self, request: &PitchAnalysisRequest) -> AnalysisResult<Arc<PitchAnalysis>> {
        Self::validate_request(request).map_err(AnalysisError::InvalidRequest)?;

        let key = Self::cache_key_for(request)?;
        let analyzer = self.analyzer.clone();

        self.cache
            .get_or_compute_with_ttl(&key, self.ttl, || async move {
                let start = std::time::Instant::now();
                let analysis = analyzer.analyze(request).await?;
                tracing::info!(
                    startup_id = %request.startup_id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    score = analysis.score,
                    "Pitch analysis computed"
                );
                Ok::<_, AnalysisError>(Arc::new(analysis))
            })
            .await
    }

    fn invalidate_startup(&self, startup_id: &str) {
        if let Err(e) = Self::validate_startup_id(startup_id) {
            tracing::warn!(startup_id = %startup_id, error = %e, "Skipping cache invalidation");
            return;
        }
        self.cache.invalidate(&Self::startup_namespace(startup_id));
    }

    fn clear(&self) {
        self.cache.clear();
    }
}
