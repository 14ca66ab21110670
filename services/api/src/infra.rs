use metrics_exporter_prometheus::PrometheusHandle;
use skin_advisor::config::AdvisorConfig;
use skin_advisor::error::AppError;
use skin_advisor::recommendation::{
    ConcernObservation, RecommendationEngine, RecommendationService, RuleTable,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the override table when `ADVISOR_RULES_PATH` is set, otherwise the built-in one.
pub(crate) fn load_rule_table(config: &AdvisorConfig) -> Result<RuleTable, AppError> {
    match &config.rules_path {
        Some(path) => {
            let table = RuleTable::from_path(path)?;
            info!(
                path = %path.display(),
                version = table.version(),
                "loaded ingredient rules override"
            );
            Ok(table)
        }
        None => Ok(RuleTable::standard()),
    }
}

pub(crate) fn build_service(config: &AdvisorConfig) -> Result<RecommendationService, AppError> {
    let table = load_rule_table(config)?;
    let engine = RecommendationEngine::new(Arc::new(table));
    Ok(RecommendationService::new(Arc::new(engine), config.options()))
}

/// Parses `type=score` pairs given on the command line.
pub(crate) fn parse_concern(raw: &str) -> Result<ConcernObservation, String> {
    let (concern, score) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TYPE=SCORE, got '{raw}'"))?;

    let concern = concern.trim();
    if concern.is_empty() {
        return Err(format!("missing concern type in '{raw}'"));
    }

    let score: f64 = score
        .trim()
        .parse()
        .map_err(|err| format!("failed to parse score in '{raw}' ({err})"))?;
    if !score.is_finite() {
        return Err(format!("score in '{raw}' must be a finite number"));
    }

    Ok(ConcernObservation::new(concern, score))
}
