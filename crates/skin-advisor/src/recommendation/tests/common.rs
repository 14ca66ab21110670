use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::recommendation::{
    ConcernObservation, ConcernType, IngredientRule, Language, LocalizedText,
    RecommendationEngine, RecommendationOptions, RecommendationService, RecommendedIngredient,
    RuleTable, SkinConcern,
};

pub(super) fn engine() -> RecommendationEngine {
    RecommendationEngine::standard()
}

pub(super) fn observe(kind: SkinConcern, score: f64) -> ConcernObservation {
    ConcernObservation::new(kind, score)
}

pub(super) fn options(language: Language, max_results: usize) -> RecommendationOptions {
    RecommendationOptions::new(language, max_results)
}

pub(super) fn english(max_results: usize) -> RecommendationOptions {
    options(Language::En, max_results)
}

/// Per-rule weight applied by the engine.
pub(super) fn contribution(score: f64, priority: u8) -> f64 {
    score * f64::from(6 - i16::from(priority)) / 5.0
}

pub(super) fn round2(value: f64) -> f64 {
    (value.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

pub(super) fn names(recommendations: &[RecommendedIngredient]) -> Vec<&str> {
    recommendations
        .iter()
        .map(|item| item.canonical_name.as_str())
        .collect()
}

pub(super) fn find<'a>(
    recommendations: &'a [RecommendedIngredient],
    canonical_name: &str,
) -> &'a RecommendedIngredient {
    recommendations
        .iter()
        .find(|item| item.canonical_name == canonical_name)
        .unwrap_or_else(|| panic!("{canonical_name} missing from {recommendations:?}"))
}

pub(super) fn concern_keys(item: &RecommendedIngredient) -> Vec<&str> {
    item.concerns_addressed
        .iter()
        .map(ConcernType::as_str)
        .collect()
}

/// Two single-rule buckets whose ingredients always score identically.
pub(super) fn twin_table() -> RuleTable {
    let mut buckets = BTreeMap::new();
    for (kind, ingredient) in [
        (SkinConcern::Dullness, "Ingredient A"),
        (SkinConcern::OilySkin, "Ingredient B"),
    ] {
        buckets.insert(
            ConcernType::from(kind),
            vec![IngredientRule {
                canonical_name: ingredient.to_string(),
                localized_names: LocalizedText::english(ingredient),
                priority: 1,
                concerns_addressed: vec![kind.into()],
                rationale: LocalizedText::english("test rationale"),
            }],
        );
    }
    RuleTable::new("twin", buckets, Vec::new()).expect("valid twin table")
}

pub(super) fn service() -> Arc<RecommendationService> {
    Arc::new(RecommendationService::default())
}

pub(super) fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
