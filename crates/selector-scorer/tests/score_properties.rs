use proptest::prelude::*;
use selector_scorer::{SelectorScorer, StabilityLevel};
use tapmend_core_types::{Selector, SelectorStrategy};

fn any_strategy() -> impl Strategy<Value = SelectorStrategy> {
    prop_oneof![
        Just(SelectorStrategy::TestId),
        Just(SelectorStrategy::Id),
        Just(SelectorStrategy::ResourceId),
        Just(SelectorStrategy::AccessibilityId),
        Just(SelectorStrategy::ContentDesc),
        Just(SelectorStrategy::Text),
        Just(SelectorStrategy::PartialText),
        Just(SelectorStrategy::ClassName),
        Just(SelectorStrategy::XPath),
        Just(SelectorStrategy::Css),
        Just(SelectorStrategy::Index),
        "[a-z]{1,8}".prop_map(SelectorStrategy::Other),
    ]
}

fn xpath_like() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-zA-Z.]{1,12}",
            Just("*".to_string()),
            "[a-zA-Z]{1,6}\\[[0-9]{1,2}\\]",
            Just("*[@text='Go']".to_string()),
            Just("node[@resource-id='com.app:id/x']".to_string()),
            Just("node[@content-desc='Back']".to_string()),
        ],
        1..10,
    )
    .prop_map(|steps| format!("//{}", steps.join("/")))
}

proptest! {
    #[test]
    fn score_is_within_unit_range(strategy in any_strategy(), value in ".{0,40}") {
        let scorer = SelectorScorer::new();
        let score = scorer.score(&Selector::new(strategy, value));
        prop_assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn identifiers_outscore_structural_paths(id in "[a-z_]{1,20}", path in xpath_like()) {
        let scorer = SelectorScorer::new();
        let path_score = scorer.score(&Selector::new(SelectorStrategy::XPath, path));
        prop_assert!(path_score <= 0.8);
        for strategy in [
            SelectorStrategy::TestId,
            SelectorStrategy::Id,
            SelectorStrategy::ResourceId,
            SelectorStrategy::AccessibilityId,
        ] {
            let id_score = scorer.score(&Selector::new(strategy, id.clone()));
            prop_assert!(id_score >= path_score);
        }
    }

    #[test]
    fn stability_level_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(StabilityLevel::from_score(lo) <= StabilityLevel::from_score(hi));
    }
}
