use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use super::common::*;
use crate::recommendation::{ConcernObservation, Language, SkinConcern, SIGNIFICANCE_THRESHOLD};

fn skin_concern() -> impl Strategy<Value = SkinConcern> {
    prop::sample::select(SkinConcern::ordered().to_vec())
}

fn observations() -> impl Strategy<Value = Vec<ConcernObservation>> {
    prop::collection::vec(
        (skin_concern(), -0.5f64..1.5).prop_map(|(kind, score)| observe(kind, score)),
        0..8,
    )
}

fn language() -> impl Strategy<Value = Language> {
    prop_oneof![
        Just(Language::En),
        Just(Language::Ko),
        Just(Language::Ja),
        Just(Language::Zh),
    ]
}

/// Latest score per concern, clamped the way the engine reads it.
fn effective_scores(observations: &[ConcernObservation]) -> HashMap<String, f64> {
    observations
        .iter()
        .map(|item| (item.concern.as_str().to_string(), item.clamped_score()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn output_is_ranked_bounded_and_unique(
        observations in observations(),
        language in language(),
        max_results in 0usize..12,
    ) {
        let result = engine().recommend(&observations, &options(language, max_results));

        prop_assert!(result.len() <= max_results);
        for (index, item) in result.iter().enumerate() {
            prop_assert_eq!(item.rank, index + 1);
            prop_assert!((0.0..=1.0).contains(&item.normalized_score));
            let cents = item.normalized_score * 100.0;
            prop_assert!((cents - cents.round()).abs() < 1e-9);
            prop_assert!(!item.concerns_addressed.is_empty());
        }
        prop_assert!(result
            .windows(2)
            .all(|pair| pair[0].normalized_score >= pair[1].normalized_score));

        let unique: HashSet<&str> = result.iter().map(|item| item.canonical_name.as_str()).collect();
        prop_assert_eq!(unique.len(), result.len());
    }

    #[test]
    fn fallback_happens_exactly_when_nothing_is_significant(
        observations in observations(),
        max_results in 1usize..12,
    ) {
        let any_significant = effective_scores(&observations)
            .values()
            .any(|score| *score >= SIGNIFICANCE_THRESHOLD);

        let plan = engine().plan(&observations, &english(max_results));

        prop_assert!(!plan.ingredients.is_empty());
        prop_assert_eq!(plan.fallback, !any_significant);
    }

    #[test]
    fn smaller_limits_return_a_prefix(
        observations in observations(),
        max_results in 1usize..6,
    ) {
        let engine = engine();

        let full = engine.recommend(&observations, &english(20));
        let top = engine.recommend(&observations, &english(max_results));

        prop_assert_eq!(&top[..], &full[..top.len()]);
        prop_assert_eq!(top.len(), full.len().min(max_results));
    }

    #[test]
    fn addressed_concerns_were_significant_inputs(
        observations in observations(),
    ) {
        let scores = effective_scores(&observations);
        let plan = engine().plan(&observations, &english(20));

        prop_assume!(!plan.fallback);
        for item in &plan.ingredients {
            for concern in &item.concerns_addressed {
                let score = scores.get(concern.as_str()).copied().unwrap_or_default();
                prop_assert!(score >= SIGNIFICANCE_THRESHOLD);
            }
        }
    }

    #[test]
    fn recommendation_is_deterministic(
        observations in observations(),
        language in language(),
    ) {
        let engine = engine();

        let first = engine.recommend(&observations, &options(language, 10));
        let second = engine.recommend(&observations, &options(language, 10));

        prop_assert_eq!(first, second);
    }
}
