use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use super::domain::{ConcernObservation, Language, RecommendedIngredient};
use super::engine::{RecommendationEngine, RecommendationOptions, DEFAULT_MAX_RESULTS};
use super::intake::{AnalyzerReport, IntakeError, SkinAnalysis};

pub const API_VERSION: &str = "1.0";
/// Analysis responses always carry this many ingredients, whatever the configured default.
pub const ANALYSIS_MAX_RESULTS: usize = DEFAULT_MAX_RESULTS;

/// Body of `POST /api/v1/recommendations`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub concerns: Vec<ConcernObservation>,
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub max_results: Option<i64>,
}

/// Body of `POST /api/v1/analysis`. `report` may be the analyzer's raw text or its JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub report: Value,
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    pub recommended_ingredients: Vec<RecommendedIngredient>,
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    #[serde(flatten)]
    pub analysis: SkinAnalysis,
    pub recommended_ingredients: Vec<RecommendedIngredient>,
    pub fallback: bool,
    pub processing_time_ms: u64,
}

/// Success envelope shared by the recommendation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, meta: ResponseMeta) -> Self {
        Self {
            success: true,
            data,
            meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMeta {
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub rules_version: String,
}

/// Facade pairing the engine with service-wide defaults.
#[derive(Debug, Clone)]
pub struct RecommendationService {
    engine: Arc<RecommendationEngine>,
    defaults: RecommendationOptions,
}

impl RecommendationService {
    pub fn new(engine: Arc<RecommendationEngine>, defaults: RecommendationOptions) -> Self {
        Self { engine, defaults }
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    pub fn defaults(&self) -> RecommendationOptions {
        self.defaults
    }

    pub fn options_for(
        &self,
        language: Option<Language>,
        max_results: Option<i64>,
    ) -> RecommendationOptions {
        RecommendationOptions {
            language: language.unwrap_or(self.defaults.language),
            max_results: max_results
                .map(|requested| usize::try_from(requested.max(0)).unwrap_or(usize::MAX))
                .unwrap_or(self.defaults.max_results),
        }
    }

    pub fn recommend(&self, request: &RecommendationRequest) -> RecommendationReport {
        let options = self.options_for(request.language, request.max_results);
        let plan = self.engine.plan(&request.concerns, &options);
        let (recommended_ingredients, fallback) = (plan.ingredients, plan.fallback);

        info!(
            concerns = request.concerns.len(),
            returned = recommended_ingredients.len(),
            language = %options.language,
            fallback,
            "recommendations computed"
        );

        RecommendationReport {
            recommended_ingredients,
            fallback,
        }
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, IntakeError> {
        let started = Instant::now();

        let raw = match &request.report {
            Value::Null => return Err(IntakeError::EmptyReport),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };

        let analysis = AnalyzerReport::parse(&raw).map_err(|error| {
            warn!(code = error.code(), %error, "analyzer report rejected");
            error
        })?;

        let options = RecommendationOptions::new(
            request.language.unwrap_or(self.defaults.language),
            ANALYSIS_MAX_RESULTS,
        );
        let plan = self.engine.plan(&analysis.observations(), &options);
        let (recommended_ingredients, fallback) = (plan.ingredients, plan.fallback);
        let analysis_id = Uuid::new_v4();

        info!(
            %analysis_id,
            concerns = analysis.concerns.len(),
            returned = recommended_ingredients.len(),
            fallback,
            "analysis recommendations computed"
        );

        Ok(AnalysisReport {
            analysis_id,
            analysis,
            recommended_ingredients,
            fallback,
            processing_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }

    pub fn meta(&self) -> ResponseMeta {
        ResponseMeta {
            timestamp: Utc::now(),
            version: API_VERSION,
            rules_version: self.engine.table().version().to_string(),
        }
    }
}

impl Default for RecommendationService {
    fn default() -> Self {
        Self::new(
            Arc::new(RecommendationEngine::standard()),
            RecommendationOptions::default(),
        )
    }
}
