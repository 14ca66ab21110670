use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Concern kinds the vision analyzer is prompted to score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinConcern {
    Dehydration,
    FineLines,
    Hyperpigmentation,
    EnlargedPores,
    AcneProne,
    RednessSensitivity,
    Dullness,
    OilySkin,
}

impl SkinConcern {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Dehydration,
            Self::FineLines,
            Self::Hyperpigmentation,
            Self::EnlargedPores,
            Self::AcneProne,
            Self::RednessSensitivity,
            Self::Dullness,
            Self::OilySkin,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Dehydration => "dehydration",
            Self::FineLines => "fine_lines",
            Self::Hyperpigmentation => "hyperpigmentation",
            Self::EnlargedPores => "enlarged_pores",
            Self::AcneProne => "acne_prone",
            Self::RednessSensitivity => "redness_sensitivity",
            Self::Dullness => "dullness",
            Self::OilySkin => "oily_skin",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dehydration => "Dehydration",
            Self::FineLines => "Fine Lines",
            Self::Hyperpigmentation => "Hyperpigmentation",
            Self::EnlargedPores => "Enlarged Pores",
            Self::AcneProne => "Acne Prone",
            Self::RednessSensitivity => "Redness & Sensitivity",
            Self::Dullness => "Dullness",
            Self::OilySkin => "Oily Skin",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|concern| concern.key() == key)
    }
}

/// Open identifier for a concern kind. Keys outside [`SkinConcern`] are carried
/// through untouched and simply match no rules.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConcernType(pub String);

impl ConcernType {
    pub const MAINTENANCE: &'static str = "maintenance";

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn maintenance() -> Self {
        Self(Self::MAINTENANCE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn known(&self) -> Option<SkinConcern> {
        SkinConcern::from_key(&self.0)
    }
}

impl From<SkinConcern> for ConcernType {
    fn from(value: SkinConcern) -> Self {
        Self(value.key().to_string())
    }
}

impl fmt::Display for ConcernType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display languages supported by the rule table. Unsupported tags resolve to English.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Language {
    #[default]
    En,
    Ko,
    Ja,
    Zh,
}

impl Language {
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "ko" => Self::Ko,
            "ja" => Self::Ja,
            "zh" => Self::Zh,
            _ => Self::En,
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ko => "ko",
            Self::Ja => "ja",
            Self::Zh => "zh",
        }
    }
}

impl From<String> for Language {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Text with a mandatory English value and optional translations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<Language, String>,
}

impl LocalizedText {
    pub fn english(en: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            translations: BTreeMap::new(),
        }
    }

    pub fn with(mut self, language: Language, text: impl Into<String>) -> Self {
        self.translations.insert(language, text.into());
        self
    }

    /// Returns the translation for `language`, or English when it is missing or blank.
    pub fn resolve(&self, language: Language) -> &str {
        if language == Language::En {
            return &self.en;
        }

        self.translations
            .get(&language)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(&self.en)
    }
}

/// One scored concern reported by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcernObservation {
    #[serde(rename = "type")]
    pub concern: ConcernType,
    pub score: f64,
}

impl ConcernObservation {
    pub fn new(concern: impl Into<ConcernType>, score: f64) -> Self {
        Self {
            concern: concern.into(),
            score,
        }
    }

    /// Score pinned to [0, 1]; NaN counts as zero.
    pub fn clamped_score(&self) -> f64 {
        clamp_unit(self.score)
    }
}

impl From<&str> for ConcernType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Candidate ingredient for a single concern bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRule {
    pub canonical_name: String,
    pub localized_names: LocalizedText,
    pub priority: u8,
    pub concerns_addressed: Vec<ConcernType>,
    pub rationale: LocalizedText,
}

/// Ingredients boosted when both concerns of the pair are significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationBonusRule {
    pub concerns: ConcernPair,
    pub ingredients: Vec<String>,
}

/// Unordered pair of concern types, stored with the smaller key first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(ConcernType, ConcernType)", into = "(ConcernType, ConcernType)")]
pub struct ConcernPair {
    first: ConcernType,
    second: ConcernType,
}

impl ConcernPair {
    pub fn new(a: impl Into<ConcernType>, b: impl Into<ConcernType>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn first(&self) -> &ConcernType {
        &self.first
    }

    pub fn second(&self) -> &ConcernType {
        &self.second
    }

    pub fn is_degenerate(&self) -> bool {
        self.first == self.second
    }
}

impl From<(ConcernType, ConcernType)> for ConcernPair {
    fn from((a, b): (ConcernType, ConcernType)) -> Self {
        Self::new(a, b)
    }
}

impl From<ConcernPair> for (ConcernType, ConcernType) {
    fn from(value: ConcernPair) -> Self {
        (value.first, value.second)
    }
}

impl fmt::Display for ConcernPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.first, self.second)
    }
}

/// Ranked engine output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedIngredient {
    pub canonical_name: String,
    pub localized_name: String,
    pub rank: usize,
    pub normalized_score: f64,
    pub rationale: String,
    pub concerns_addressed: Vec<ConcernType>,
}

/// Severity band attached to a detected concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minimal,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn from_score(score: f64) -> Self {
        let score = clamp_unit(score);
        if score < 0.3 {
            Self::Minimal
        } else if score < 0.4 {
            Self::Mild
        } else if score < 0.7 {
            Self::Moderate
        } else {
            Self::Severe
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Minimal => "Minimal",
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
        }
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
