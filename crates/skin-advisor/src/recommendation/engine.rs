use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    clamp_unit, ConcernObservation, ConcernType, IngredientRule, Language, LocalizedText,
    RecommendedIngredient,
};
use super::rules::{hyaluronic_acid_name, niacinamide_name, vitamin_c_name, RuleTable};

/// Minimum concern score that influences recommendations.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.3;
/// Multiplier applied once per qualifying concern pair.
pub const SYNERGY_MULTIPLIER: f64 = 1.3;
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Per-request knobs for [`RecommendationEngine::recommend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationOptions {
    pub language: Language,
    pub max_results: usize,
}

impl Default for RecommendationOptions {
    fn default() -> Self {
        Self {
            language: Language::En,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl RecommendationOptions {
    pub fn new(language: Language, max_results: usize) -> Self {
        Self {
            language,
            max_results,
        }
    }
}

/// Ranked ingredients plus whether they came from the maintenance plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    pub ingredients: Vec<RecommendedIngredient>,
    pub fallback: bool,
}

/// Pure scorer turning significant concerns into a ranked ingredient list.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    table: Arc<RuleTable>,
}

impl RecommendationEngine {
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self { table }
    }

    pub fn standard() -> Self {
        Self::new(Arc::new(RuleTable::standard()))
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn recommend(
        &self,
        observations: &[ConcernObservation],
        options: &RecommendationOptions,
    ) -> Vec<RecommendedIngredient> {
        self.plan(observations, options).ingredients
    }

    /// Like [`Self::recommend`], but also reports whether the maintenance plan was used.
    pub fn plan(
        &self,
        observations: &[ConcernObservation],
        options: &RecommendationOptions,
    ) -> Recommendations {
        if options.max_results == 0 {
            return Recommendations::default();
        }

        let significant = significant_concerns(observations);
        if significant.is_empty() {
            debug!(
                observed = observations.len(),
                "no significant concerns, returning maintenance plan"
            );
            return Recommendations {
                ingredients: maintenance_plan(options),
                fallback: true,
            };
        }

        debug!(
            significant = significant.len(),
            rules_version = self.table.version(),
            "scoring ingredient candidates"
        );

        let mut tally = ScoreTally::default();
        for (concern, score) in &significant {
            for rule in self.table.rules_for(concern) {
                let contribution = score * f64::from(6 - i16::from(rule.priority)) / 5.0;
                tally.add(rule, concern, contribution);
            }
        }

        for (index, (first, _)) in significant.iter().enumerate() {
            for (second, _) in &significant[index + 1..] {
                for ingredient in self.table.bonus_for(first, second) {
                    tally.boost(ingredient, SYNERGY_MULTIPLIER);
                }
            }
        }

        let ingredients = tally
            .ranked()
            .into_iter()
            .take(options.max_results)
            .enumerate()
            .map(|(index, entry)| RecommendedIngredient {
                canonical_name: entry.rule.canonical_name.clone(),
                localized_name: entry
                    .rule
                    .localized_names
                    .resolve(options.language)
                    .to_string(),
                rank: index + 1,
                normalized_score: normalize(entry.total),
                rationale: entry.rule.rationale.resolve(options.language).to_string(),
                concerns_addressed: entry.concerns,
            })
            .collect();

        Recommendations {
            ingredients,
            fallback: false,
        }
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Deduplicates by concern (last score wins, first position kept), clamps, drops
/// insignificant entries, then orders by score descending. Equal scores keep input order.
fn significant_concerns(observations: &[ConcernObservation]) -> Vec<(ConcernType, f64)> {
    let mut positions: HashMap<&ConcernType, usize> = HashMap::new();
    let mut latest: Vec<(ConcernType, f64)> = Vec::with_capacity(observations.len());

    for observation in observations {
        let score = observation.clamped_score();
        match positions.get(&observation.concern) {
            Some(&position) => {
                debug!(concern = %observation.concern, "duplicate concern, keeping latest score");
                latest[position].1 = score;
            }
            None => {
                positions.insert(&observation.concern, latest.len());
                latest.push((observation.concern.clone(), score));
            }
        }
    }

    let mut significant: Vec<_> = latest
        .into_iter()
        .filter(|(_, score)| *score >= SIGNIFICANCE_THRESHOLD)
        .collect();
    significant.sort_by(|a, b| b.1.total_cmp(&a.1));
    significant
}

struct TallyEntry<'a> {
    rule: &'a IngredientRule,
    total: f64,
    concerns: Vec<ConcernType>,
}

/// Insertion-ordered accumulator keyed by canonical ingredient name.
#[derive(Default)]
struct ScoreTally<'a> {
    entries: Vec<TallyEntry<'a>>,
    index: HashMap<&'a str, usize>,
}

impl<'a> ScoreTally<'a> {
    fn add(&mut self, rule: &'a IngredientRule, concern: &ConcernType, contribution: f64) {
        match self.index.get(rule.canonical_name.as_str()) {
            Some(&position) => {
                let entry = &mut self.entries[position];
                entry.total += contribution;
                if !entry.concerns.contains(concern) {
                    entry.concerns.push(concern.clone());
                }
            }
            None => {
                self.index
                    .insert(rule.canonical_name.as_str(), self.entries.len());
                self.entries.push(TallyEntry {
                    rule,
                    total: contribution,
                    concerns: vec![concern.clone()],
                });
            }
        }
    }

    fn boost(&mut self, ingredient: &str, multiplier: f64) {
        if let Some(&position) = self.index.get(ingredient) {
            self.entries[position].total *= multiplier;
        }
    }

    /// Highest total first; the stable sort keeps discovery order among ties.
    fn ranked(mut self) -> Vec<TallyEntry<'a>> {
        self.entries.sort_by(|a, b| b.total.total_cmp(&a.total));
        self.entries
    }
}

/// Clamp to [0, 1], then round half away from zero to two decimals.
fn normalize(total: f64) -> f64 {
    (clamp_unit(total) * 100.0).round() / 100.0
}

struct MaintenanceItem {
    name: LocalizedText,
    score: f64,
    rationale: LocalizedText,
}

fn maintenance_items() -> [MaintenanceItem; 3] {
    [
        MaintenanceItem {
            name: hyaluronic_acid_name(),
            score: 0.8,
            rationale: LocalizedText::english("Essential hydration for maintaining healthy skin")
                .with(Language::Ko, "건강한 피부 유지를 위한 기본 보습"),
        },
        MaintenanceItem {
            name: niacinamide_name(),
            score: 0.75,
            rationale: LocalizedText::english("All-around skin health and preventative care")
                .with(Language::Ko, "전반적인 피부 건강 및 예방 케어"),
        },
        MaintenanceItem {
            name: vitamin_c_name(),
            score: 0.7,
            rationale: LocalizedText::english("Antioxidant protection and radiance maintenance")
                .with(Language::Ko, "항산화 보호 및 피부 광채 유지"),
        },
    ]
}

/// Fixed general-care list used when no concern clears the threshold.
pub fn maintenance_plan(options: &RecommendationOptions) -> Vec<RecommendedIngredient> {
    maintenance_items()
        .into_iter()
        .take(options.max_results)
        .enumerate()
        .map(|(index, item)| RecommendedIngredient {
            canonical_name: item.name.en.clone(),
            localized_name: item.name.resolve(options.language).to_string(),
            rank: index + 1,
            normalized_score: item.score,
            rationale: item.rationale.resolve(options.language).to_string(),
            concerns_addressed: vec![ConcernType::maintenance()],
        })
        .collect()
}

/// True when every item is tagged with the maintenance concern. Prefer
/// [`Recommendations::fallback`], which also holds for tables that define a
/// `maintenance` bucket.
pub fn is_maintenance(recommendations: &[RecommendedIngredient]) -> bool {
    !recommendations.is_empty()
        && recommendations.iter().all(|item| {
            item.concerns_addressed.len() == 1
                && item.concerns_addressed[0].as_str() == ConcernType::MAINTENANCE
        })
}
