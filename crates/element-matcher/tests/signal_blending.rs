use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use element_matcher::{
    ConfidenceSignal, ElementFeatures, ElementMatcher, Prediction, SignalError,
};
use tapmend_core_types::attributes::{CLASS_NAME, IDENTIFIER, TEXT};
use tapmend_core_types::{AlternativeSelector, AttributeMap, Selector, SelectorStrategy};

/// Predicts a fixed type, more confident for elements with text.
struct FixedSignal {
    element_type: &'static str,
}

#[async_trait]
impl ConfidenceSignal for FixedSignal {
    async fn predict(
        &self,
        features: &ElementFeatures,
    ) -> Result<Option<Prediction>, SignalError> {
        let confidence = if features.text.is_empty() { 0.5 } else { 0.9 };
        Ok(Some(Prediction {
            element_type: self.element_type.to_string(),
            confidence,
        }))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct BrokenSignal;

#[async_trait]
impl ConfidenceSignal for BrokenSignal {
    async fn predict(&self, _: &ElementFeatures) -> Result<Option<Prediction>, SignalError> {
        Err(SignalError::Unavailable("model not loaded".into()))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

struct SlowSignal;

#[async_trait]
impl ConfidenceSignal for SlowSignal {
    async fn predict(&self, _: &ElementFeatures) -> Result<Option<Prediction>, SignalError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Some(Prediction {
            element_type: "button".into(),
            confidence: 1.0,
        }))
    }

    fn name(&self) -> &str {
        "slow"
    }
}

fn candidates() -> Vec<AlternativeSelector> {
    let mut with_text = AttributeMap::new();
    with_text.insert(CLASS_NAME.into(), "android.widget.Button".into());
    with_text.insert(TEXT.into(), "Login".into());

    let mut id_only = AttributeMap::new();
    id_only.insert(IDENTIFIER.into(), "login_btn".into());

    vec![
        AlternativeSelector::new(Selector::new(SelectorStrategy::Id, "login_btn"), 0.95, id_only),
        AlternativeSelector::new(Selector::new(SelectorStrategy::Text, "Login"), 0.70, with_text),
    ]
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn signal_is_blended_forty_sixty() {
    let matcher = ElementMatcher::new(Arc::new(FixedSignal {
        element_type: "button",
    }));
    let result = matcher
        .find_best_match(&candidates(), Some("button"), None)
        .await
        .unwrap();
    // id: 0.4*0.95 + 0.6*0.5 = 0.68; text: 0.4*0.7 + 0.6*0.9 = 0.82
    assert_eq!(result.selector.value(), "Login");
    assert!(close(result.ml_confidence, 0.9));
    assert!(close(result.combined_confidence, 0.82));
    assert!(result.justification.contains("ML confidence: 0.90"));
}

#[tokio::test]
async fn type_mismatch_halves_the_signal() {
    let matcher = ElementMatcher::new(Arc::new(FixedSignal {
        element_type: "label",
    }));
    let result = matcher
        .find_best_match(&candidates(), Some("button"), None)
        .await
        .unwrap();
    // id: 0.38 + 0.6*0.25 = 0.53; text: 0.28 + 0.6*0.45 = 0.55
    assert_eq!(result.selector.value(), "Login");
    assert!(close(result.ml_confidence, 0.45));
    assert!(close(result.combined_confidence, 0.55));
}

#[tokio::test]
async fn failing_signal_falls_back_to_heuristics() {
    let matcher = ElementMatcher::new(Arc::new(BrokenSignal));
    let result = matcher
        .find_best_match(&candidates(), None, None)
        .await
        .unwrap();
    assert_eq!(result.selector.value(), "login_btn");
    assert_eq!(result.ml_confidence, 0.0);
    assert!(close(result.combined_confidence, 0.95));
}

#[tokio::test]
async fn slow_signal_times_out() {
    let matcher = ElementMatcher::new(Arc::new(SlowSignal))
        .with_signal_timeout(Duration::from_millis(20));
    let result = matcher
        .find_best_match(&candidates(), None, None)
        .await
        .unwrap();
    assert_eq!(result.ml_confidence, 0.0);
    assert_eq!(result.selector.value(), "login_btn");
}
