use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::{ConcernObservation, ConcernType, Severity};

/// Structural problems found in an analyzer report before it reaches the engine.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("analyzer report is empty")]
    EmptyReport,
    #[error("photo quality is insufficient for analysis: {message}")]
    PoorPhotoQuality { message: String },
    #[error("analyzer report is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("concern #{index} is missing a type")]
    MissingConcernType { index: usize },
    #[error("concern '{concern}' has a non-finite score")]
    NonFiniteScore { concern: ConcernType },
    #[error("concern '{0}' is reported more than once")]
    DuplicateConcern(ConcernType),
}

impl IntakeError {
    /// Stable code surfaced in API error envelopes.
    pub const fn code(&self) -> &'static str {
        match self {
            IntakeError::EmptyReport => "INVALID_REQUEST",
            IntakeError::PoorPhotoQuality { .. } => "POOR_PHOTO_QUALITY",
            IntakeError::Malformed(_)
            | IntakeError::MissingConcernType { .. }
            | IntakeError::NonFiniteScore { .. }
            | IntakeError::DuplicateConcern(_) => "INVALID_ANALYSIS",
        }
    }
}

const DEFAULT_QUALITY_MESSAGE: &str = "Photo quality is insufficient for analysis";

/// Concern as reported by the vision analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedConcern {
    #[serde(rename = "type")]
    pub concern: ConcernType,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_deserializing)]
    pub severity: Option<Severity>,
}

/// Validated analyzer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinAnalysis {
    pub concerns: Vec<DetectedConcern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_age_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_notes: Option<String>,
}

impl SkinAnalysis {
    /// Rejects structurally unusable concerns and recomputes severities from scores.
    pub fn validate(mut self) -> Result<Self, IntakeError> {
        let mut seen = HashSet::new();

        for (index, detected) in self.concerns.iter_mut().enumerate() {
            if detected.concern.as_str().trim().is_empty() {
                return Err(IntakeError::MissingConcernType { index });
            }
            if !detected.score.is_finite() {
                return Err(IntakeError::NonFiniteScore {
                    concern: detected.concern.clone(),
                });
            }
            if !seen.insert(detected.concern.clone()) {
                return Err(IntakeError::DuplicateConcern(detected.concern.clone()));
            }
            detected.severity = Some(Severity::from_score(detected.score));
        }

        Ok(self)
    }

    pub fn observations(&self) -> Vec<ConcernObservation> {
        self.concerns
            .iter()
            .map(|detected| ConcernObservation::new(detected.concern.clone(), detected.score))
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReport {
    Rejected {
        error: serde_json::Value,
        #[serde(default)]
        message: Option<String>,
    },
    Analysis(SkinAnalysis),
}

/// Parser for the vision analyzer's free-text JSON reply.
pub struct AnalyzerReport;

impl AnalyzerReport {
    pub fn parse(raw: &str) -> Result<SkinAnalysis, IntakeError> {
        let cleaned = strip_code_fences(raw);
        if cleaned.is_empty() {
            return Err(IntakeError::EmptyReport);
        }

        match serde_json::from_str::<RawReport>(&cleaned) {
            Ok(RawReport::Rejected { error, message }) if is_truthy(&error) => {
                Err(IntakeError::PoorPhotoQuality {
                    message: quality_message(&error, message),
                })
            }
            Ok(RawReport::Analysis(analysis)) => analysis.validate(),
            Ok(RawReport::Rejected { .. }) | Err(_) => {
                // Re-decode as an analysis so the caller sees the field-level reason.
                let analysis: SkinAnalysis = serde_json::from_str(&cleaned)?;
                analysis.validate()
            }
        }
    }
}

/// A verdict counts as a rejection unless its `error` is null, false, zero or blank.
fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(flag) => *flag,
        serde_json::Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(text) => !text.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

fn quality_message(error: &serde_json::Value, message: Option<String>) -> String {
    if let Some(text) = message.filter(|text| !text.trim().is_empty()) {
        return text;
    }
    match error.as_str().map(str::trim) {
        Some(reason) if !reason.is_empty() => format!("{DEFAULT_QUALITY_MESSAGE} ({reason})"),
        _ => DEFAULT_QUALITY_MESSAGE.to_string(),
    }
}

fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}
