use std::collections::BTreeMap;
use std::sync::Arc;

use super::common::*;
use crate::recommendation::{
    is_maintenance, ConcernObservation, ConcernType, IngredientRule, LocalizedText,
    RecommendationEngine, RuleTable, SkinConcern, SYNERGY_MULTIPLIER,
};

#[test]
fn empty_input_returns_maintenance_plan() {
    let result = engine().recommend(&[], &english(5));

    assert_eq!(
        names(&result),
        ["Hyaluronic Acid", "Niacinamide", "Vitamin C"]
    );
    let scores: Vec<f64> = result.iter().map(|item| item.normalized_score).collect();
    assert_eq!(scores, [0.8, 0.75, 0.7]);
    assert_eq!(
        result.iter().map(|item| item.rank).collect::<Vec<_>>(),
        [1, 2, 3]
    );
    assert!(result
        .iter()
        .all(|item| concern_keys(item) == [ConcernType::MAINTENANCE]));
    assert!(is_maintenance(&result));
}

#[test]
fn below_threshold_concern_falls_back_to_maintenance() {
    let engine = engine();

    let result = engine.recommend(&[observe(SkinConcern::Dehydration, 0.29)], &english(5));

    assert_eq!(result, engine.recommend(&[], &english(5)));
}

#[test]
fn threshold_score_is_significant() {
    let result = engine().recommend(&[observe(SkinConcern::Dehydration, 0.3)], &english(5));

    assert!(!is_maintenance(&result));
    assert_eq!(result[0].canonical_name, "Hyaluronic Acid");
    assert_eq!(result[0].normalized_score, 0.3);
}

#[test]
fn maintenance_plan_respects_small_limits() {
    let result = engine().recommend(&[], &english(2));

    assert_eq!(names(&result), ["Hyaluronic Acid", "Niacinamide"]);
}

#[test]
fn zero_limit_yields_nothing() {
    let engine = engine();

    assert!(engine.recommend(&[], &english(0)).is_empty());
    assert!(engine
        .recommend(&[observe(SkinConcern::AcneProne, 0.9)], &english(0))
        .is_empty());
}

#[test]
fn priority_one_rule_ranks_first_for_single_concern() {
    let result = engine().recommend(&[observe(SkinConcern::Dehydration, 0.6)], &english(5));

    assert_eq!(names(&result), ["Hyaluronic Acid", "Glycerin", "Ceramide"]);
    assert_eq!(result[0].rank, 1);
    assert_eq!(result[0].normalized_score, 0.6);
    assert_eq!(result[1].normalized_score, round2(contribution(0.6, 2)));
    assert_eq!(result[2].normalized_score, round2(contribution(0.6, 3)));
    assert_eq!(concern_keys(&result[0]), ["dehydration"]);
}

#[test]
fn synergy_pair_multiplies_bonus_ingredients() {
    let observations = [
        observe(SkinConcern::Dehydration, 0.6),
        observe(SkinConcern::FineLines, 0.5),
    ];

    let result = engine().recommend(&observations, &english(10));

    let hyaluronic = find(&result, "Hyaluronic Acid");
    assert!(hyaluronic.normalized_score > round2(contribution(0.6, 1)));
    assert_eq!(
        hyaluronic.normalized_score,
        round2(contribution(0.6, 1) * SYNERGY_MULTIPLIER)
    );
    assert_eq!(hyaluronic.normalized_score, 0.78);

    let peptides = find(&result, "Peptides");
    assert_eq!(
        peptides.normalized_score,
        round2(contribution(0.5, 2) * SYNERGY_MULTIPLIER)
    );
    assert_eq!(peptides.normalized_score, 0.52);

    let retinol = find(&result, "Retinol");
    assert_eq!(retinol.normalized_score, round2(contribution(0.5, 1)));

    assert_eq!(
        names(&result),
        [
            "Hyaluronic Acid",
            "Peptides",
            "Retinol",
            "Glycerin",
            "Ceramide",
            "Adenosine"
        ]
    );
}

#[test]
fn synergy_pair_matches_regardless_of_declaration_order() {
    let observations = [
        observe(SkinConcern::RednessSensitivity, 0.5),
        observe(SkinConcern::Dehydration, 0.5),
    ];

    let result = engine().recommend(&observations, &english(10));

    let ceramide = find(&result, "Ceramide");
    assert_eq!(
        ceramide.normalized_score,
        round2(contribution(0.5, 3) * SYNERGY_MULTIPLIER)
    );
    let panthenol = find(&result, "Panthenol (Pro-Vitamin B5)");
    assert_eq!(
        panthenol.normalized_score,
        round2(contribution(0.5, 2) * SYNERGY_MULTIPLIER)
    );
    assert_eq!(result[0].canonical_name, "Centella Asiatica");
}

#[test]
fn synergy_bonuses_compound_across_pairs() {
    let observations = [
        observe(SkinConcern::RednessSensitivity, 0.3),
        observe(SkinConcern::Dehydration, 0.3),
        observe(SkinConcern::AcneProne, 0.3),
        observe(SkinConcern::Hyperpigmentation, 0.3),
    ];

    let result = engine().recommend(&observations, &english(20));

    let centella = find(&result, "Centella Asiatica");
    let expected = (contribution(0.3, 1) + contribution(0.3, 2))
        * SYNERGY_MULTIPLIER
        * SYNERGY_MULTIPLIER;
    assert_eq!(centella.normalized_score, round2(expected));
    assert_eq!(centella.rank, 1);
}

#[test]
fn shared_ingredient_sums_contributions_and_reports_both_concerns() {
    let observations = [
        observe(SkinConcern::Hyperpigmentation, 0.5),
        observe(SkinConcern::EnlargedPores, 0.4),
    ];

    let result = engine().recommend(&observations, &english(5));

    let niacinamide = find(&result, "Niacinamide");
    assert_eq!(
        niacinamide.normalized_score,
        round2(contribution(0.5, 2) + contribution(0.4, 1))
    );
    assert_eq!(
        concern_keys(niacinamide),
        ["hyperpigmentation", "enlarged_pores"]
    );
    assert_eq!(niacinamide.rank, 1);
}

#[test]
fn truncation_keeps_top_of_full_ranking() {
    let observations = [
        observe(SkinConcern::Dehydration, 0.6),
        observe(SkinConcern::FineLines, 0.5),
    ];
    let engine = engine();

    let full = engine.recommend(&observations, &english(10));
    let top = engine.recommend(&observations, &english(2));

    assert!(full.len() >= 5);
    assert_eq!(top.len(), 2);
    assert_eq!(top.iter().map(|item| item.rank).collect::<Vec<_>>(), [1, 2]);
    assert_eq!(top[..], full[..2]);
}

#[test]
fn unknown_concerns_contribute_nothing() {
    let engine = engine();
    let known = [observe(SkinConcern::Dehydration, 0.6)];
    let mixed = [
        ConcernObservation::new("freckles", 0.9),
        observe(SkinConcern::Dehydration, 0.6),
    ];

    assert_eq!(
        engine.recommend(&mixed, &english(5)),
        engine.recommend(&known, &english(5))
    );
    assert!(engine
        .recommend(&[ConcernObservation::new("freckles", 0.9)], &english(5))
        .is_empty());
}

#[test]
fn out_of_range_scores_are_clamped() {
    let engine = engine();

    let high = engine.recommend(&[observe(SkinConcern::Dehydration, 1.7)], &english(5));
    assert_eq!(high[0].normalized_score, 1.0);
    assert_eq!(high[1].normalized_score, round2(contribution(1.0, 2)));

    let negative = engine.recommend(&[observe(SkinConcern::Dehydration, -0.4)], &english(5));
    assert!(is_maintenance(&negative));

    let nan = engine.recommend(&[observe(SkinConcern::Dehydration, f64::NAN)], &english(5));
    assert!(is_maintenance(&nan));
}

#[test]
fn duplicate_concern_keeps_latest_score() {
    let engine = engine();
    let duplicated = [
        observe(SkinConcern::Dehydration, 0.9),
        observe(SkinConcern::Dehydration, 0.4),
    ];

    assert_eq!(
        engine.recommend(&duplicated, &english(5)),
        engine.recommend(&[observe(SkinConcern::Dehydration, 0.4)], &english(5))
    );
}

#[test]
fn equal_totals_keep_discovery_order() {
    let engine = RecommendationEngine::new(Arc::new(twin_table()));
    let oily_first = [
        observe(SkinConcern::OilySkin, 0.5),
        observe(SkinConcern::Dullness, 0.5),
    ];
    let dull_first = [
        observe(SkinConcern::Dullness, 0.5),
        observe(SkinConcern::OilySkin, 0.5),
    ];

    assert_eq!(
        names(&engine.recommend(&oily_first, &english(5))),
        ["Ingredient B", "Ingredient A"]
    );
    assert_eq!(
        names(&engine.recommend(&dull_first, &english(5))),
        ["Ingredient A", "Ingredient B"]
    );
}

#[test]
fn concerns_are_processed_in_descending_score_order() {
    let engine = RecommendationEngine::new(Arc::new(twin_table()));
    let observations = [
        observe(SkinConcern::Dullness, 0.5),
        observe(SkinConcern::OilySkin, 0.9),
    ];

    let result = engine.recommend(&observations, &english(5));

    assert_eq!(names(&result), ["Ingredient B", "Ingredient A"]);
    assert_eq!(result[0].normalized_score, 0.9);
}

#[test]
fn repeated_calls_are_identical() {
    let engine = engine();
    let observations = [
        observe(SkinConcern::OilySkin, 0.7),
        observe(SkinConcern::EnlargedPores, 0.6),
        observe(SkinConcern::AcneProne, 0.45),
    ];

    let first = engine.recommend(&observations, &english(5));
    let second = engine.recommend(&observations, &english(5));

    assert_eq!(first, second);
    assert!(first
        .windows(2)
        .all(|pair| pair[0].normalized_score >= pair[1].normalized_score));
}

#[test]
fn plan_flags_fallback_only_on_the_maintenance_path() {
    let engine = engine();

    assert!(engine.plan(&[], &english(5)).fallback);
    assert!(!engine
        .plan(&[observe(SkinConcern::Dullness, 0.6)], &english(5))
        .fallback);
    assert!(!engine.plan(&[], &english(0)).fallback);
}

#[test]
fn maintenance_keyed_bucket_is_not_reported_as_fallback() {
    let mut buckets = BTreeMap::new();
    buckets.insert(
        ConcernType::maintenance(),
        vec![IngredientRule {
            canonical_name: "Squalane".to_string(),
            localized_names: LocalizedText::english("Squalane"),
            priority: 1,
            concerns_addressed: vec![ConcernType::maintenance()],
            rationale: LocalizedText::english("Barrier upkeep"),
        }],
    );
    let table = RuleTable::new("upkeep", buckets, Vec::new()).expect("valid table");
    let engine = RecommendationEngine::new(Arc::new(table));

    let plan = engine.plan(
        &[ConcernObservation::new(ConcernType::maintenance(), 0.9)],
        &english(5),
    );

    assert_eq!(names(&plan.ingredients), ["Squalane"]);
    assert!(is_maintenance(&plan.ingredients));
    assert!(!plan.fallback);
}
