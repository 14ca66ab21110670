//! Ingredient recommendations for scored skin concerns.
//!
//! [`RuleTable`] holds the static concern-to-ingredient mapping, [`RecommendationEngine`]
//! scores and ranks candidates, and [`AnalyzerReport`] validates vision analyzer output
//! before it reaches the engine.

pub mod domain;
pub mod engine;
pub mod intake;
pub mod router;
pub mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CombinationBonusRule, ConcernObservation, ConcernPair, ConcernType, IngredientRule, Language,
    LocalizedText, RecommendedIngredient, Severity, SkinConcern,
};
pub use engine::{
    is_maintenance, maintenance_plan, RecommendationEngine, RecommendationOptions,
    Recommendations, DEFAULT_MAX_RESULTS, SIGNIFICANCE_THRESHOLD, SYNERGY_MULTIPLIER,
};
pub use intake::{AnalyzerReport, DetectedConcern, IntakeError, SkinAnalysis};
pub use router::recommendation_router;
pub use rules::{RuleTable, RuleTableDocument, RuleTableError, STANDARD_RULES_VERSION};
pub use service::{
    AnalysisReport, AnalysisRequest, ApiResponse, RecommendationReport, RecommendationRequest,
    RecommendationService, ResponseMeta, ANALYSIS_MAX_RESULTS,
};
