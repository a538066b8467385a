use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use selector_scorer::{SelectorScorer, StabilityLevel};
use serde::{Deserialize, Serialize};
use tapmend_core_types::attributes::{CLASS_NAME, IDENTIFIER, TEXT};
use tapmend_core_types::AlternativeSelector;
use tracing::{debug, info, warn};

use crate::signal::{ConfidenceSignal, ElementFeatures, NoopSignal};

const HEURISTIC_WEIGHT: f64 = 0.4;
const SIGNAL_WEIGHT: f64 = 0.6;
const TYPE_MISMATCH_FACTOR: f64 = 0.5;
pub const SCREEN_MATCH_BOOST: f64 = 0.05;
pub const STABILITY_BOOST: f64 = 0.05;

pub const DEFAULT_SIGNAL_TIMEOUT: Duration = Duration::from_millis(2_000);

/// Context available to the matcher for boosting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchContext {
    /// Current screen or activity name
    pub screen_name: Option<String>,
}

impl MatchContext {
    pub fn screen(name: impl Into<String>) -> Self {
        Self {
            screen_name: Some(name.into()),
        }
    }
}

/// The chosen candidate and how its confidence was derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub selector: AlternativeSelector,
    /// 0 when no signal was available
    pub ml_confidence: f64,
    pub combined_confidence: f64,
    pub justification: String,
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (confidence {:.2})",
            self.selector.selector, self.combined_confidence
        )
    }
}

/// Picks the single best candidate for a failure.
#[derive(Clone)]
pub struct ElementMatcher {
    signal: Arc<dyn ConfidenceSignal>,
    scorer: SelectorScorer,
    signal_timeout: Duration,
}

impl Default for ElementMatcher {
    fn default() -> Self {
        Self::new(Arc::new(NoopSignal))
    }
}

impl fmt::Debug for ElementMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementMatcher")
            .field("signal", &self.signal.name())
            .field("signal_timeout", &self.signal_timeout)
            .finish()
    }
}

impl ElementMatcher {
    pub fn new(signal: Arc<dyn ConfidenceSignal>) -> Self {
        Self {
            signal,
            scorer: SelectorScorer::new(),
            signal_timeout: DEFAULT_SIGNAL_TIMEOUT,
        }
    }

    pub fn with_signal_timeout(mut self, timeout: Duration) -> Self {
        self.signal_timeout = timeout;
        self
    }

    /// Highest combined confidence wins; on ties the earlier candidate is kept.
    pub async fn find_best_match(
        &self,
        candidates: &[AlternativeSelector],
        expected_type: Option<&str>,
        context: Option<&MatchContext>,
    ) -> Option<MatchResult> {
        let mut best: Option<MatchResult> = None;
        for candidate in candidates {
            let scored = self.score_candidate(candidate, expected_type, context).await;
            debug!(
                candidate = %candidate.selector,
                combined = scored.combined_confidence,
                "scored candidate"
            );
            let better = best
                .as_ref()
                .map_or(true, |b| scored.combined_confidence > b.combined_confidence);
            if better {
                best = Some(scored);
            }
        }
        if let Some(found) = &best {
            info!(
                selector = %found.selector.selector,
                confidence = found.combined_confidence,
                signal = self.signal.name(),
                "best match"
            );
        }
        best
    }

    async fn score_candidate(
        &self,
        candidate: &AlternativeSelector,
        expected_type: Option<&str>,
        context: Option<&MatchContext>,
    ) -> MatchResult {
        let heuristic = candidate.confidence;
        let ml = self.signal_confidence(candidate, expected_type).await;

        let mut combined = if ml > 0.0 {
            HEURISTIC_WEIGHT * heuristic + SIGNAL_WEIGHT * ml
        } else {
            heuristic
        };
        if let Some(context) = context {
            combined += self.context_boost(candidate, context);
        }
        let combined = combined.clamp(0.0, 1.0);

        MatchResult {
            selector: candidate.clone(),
            ml_confidence: ml,
            combined_confidence: combined,
            justification: justification(candidate, heuristic, ml, combined),
        }
    }

    async fn signal_confidence(
        &self,
        candidate: &AlternativeSelector,
        expected_type: Option<&str>,
    ) -> f64 {
        let features = ElementFeatures::from_candidate(candidate);
        let outcome = tokio::time::timeout(self.signal_timeout, self.signal.predict(&features)).await;
        let prediction = match outcome {
            Ok(Ok(Some(prediction))) => prediction,
            Ok(Ok(None)) => return 0.0,
            Ok(Err(err)) => {
                warn!(signal = self.signal.name(), error = %err, "confidence signal failed");
                return 0.0;
            }
            Err(_) => {
                warn!(
                    signal = self.signal.name(),
                    timeout_ms = self.signal_timeout.as_millis() as u64,
                    "confidence signal timed out"
                );
                return 0.0;
            }
        };
        let confidence = prediction.confidence.clamp(0.0, 1.0);
        match expected_type {
            Some(expected) if !prediction.element_type.eq_ignore_ascii_case(expected) => {
                confidence * TYPE_MISMATCH_FACTOR
            }
            _ => confidence,
        }
    }

    fn context_boost(&self, candidate: &AlternativeSelector, context: &MatchContext) -> f64 {
        let mut boost = 0.0;
        if let Some(screen) = context.screen_name.as_deref().filter(|s| !s.is_empty()) {
            let class = candidate.attribute(CLASS_NAME).unwrap_or_default();
            if class.to_lowercase().contains(&screen.to_lowercase()) {
                boost += SCREEN_MATCH_BOOST;
            }
        }
        let stability = self.scorer.stability_level(self.scorer.score(&candidate.selector));
        if stability == StabilityLevel::Excellent {
            boost += STABILITY_BOOST;
        }
        boost
    }
}

/// Sole gate for applying a fix.
pub fn validate_match(result: &MatchResult, min_confidence: f64) -> bool {
    result.combined_confidence >= min_confidence
}

fn justification(candidate: &AlternativeSelector, heuristic: f64, ml: f64, combined: f64) -> String {
    let mut parts = vec![
        format!("Strategy: {}", candidate.strategy()),
        format!("Heuristic confidence: {heuristic:.2}"),
    ];
    if ml > 0.0 {
        parts.push(format!("ML confidence: {ml:.2}"));
    }
    parts.push(format!("Combined: {combined:.2}"));
    if let Some(id) = candidate.attribute(IDENTIFIER) {
        parts.push(format!("Has ID: {id}"));
    }
    if let Some(text) = candidate.attribute(TEXT) {
        parts.push(format!("Text: '{text}'"));
    }
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapmend_core_types::{AttributeMap, Selector, SelectorStrategy};

    fn candidate(strategy: SelectorStrategy, value: &str, confidence: f64) -> AlternativeSelector {
        let mut attrs = AttributeMap::new();
        attrs.insert(CLASS_NAME.into(), "android.widget.Button".into());
        attrs.insert(TEXT.into(), "Login".into());
        AlternativeSelector::new(Selector::new(strategy, value), confidence, attrs)
    }

    #[tokio::test]
    async fn test_heuristic_only_without_signal() {
        let matcher = ElementMatcher::default();
        let result = matcher
            .find_best_match(
                &[
                    candidate(SelectorStrategy::Text, "Login", 0.70),
                    candidate(SelectorStrategy::PartialText, "Login", 0.65),
                ],
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(result.selector.strategy(), &SelectorStrategy::Text);
        assert_eq!(result.ml_confidence, 0.0);
        assert_eq!(result.combined_confidence, 0.70);
        assert_eq!(
            result.justification,
            "Strategy: text | Heuristic confidence: 0.70 | Combined: 0.70 | Text: 'Login'"
        );
    }

    #[tokio::test]
    async fn test_ties_keep_discovery_order() {
        let matcher = ElementMatcher::default();
        let result = matcher
            .find_best_match(
                &[
                    candidate(SelectorStrategy::Text, "first", 0.70),
                    candidate(SelectorStrategy::Text, "second", 0.70),
                ],
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(result.selector.value(), "first");
    }

    #[tokio::test]
    async fn test_context_boosts() {
        let matcher = ElementMatcher::default();
        let context = MatchContext::screen("button");
        let result = matcher
            .find_best_match(
                &[candidate(SelectorStrategy::Id, "login_btn", 0.95)],
                None,
                Some(&context),
            )
            .await
            .unwrap();
        // screen name match and an excellent strategy, clamped
        assert_eq!(result.combined_confidence, 1.0);

        let context = MatchContext::screen("test_checkout");
        let result = matcher
            .find_best_match(
                &[candidate(SelectorStrategy::Text, "Login", 0.70)],
                None,
                Some(&context),
            )
            .await
            .unwrap();
        assert_eq!(result.combined_confidence, 0.70);
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        assert!(ElementMatcher::default()
            .find_best_match(&[], None, None)
            .await
            .is_none());
    }

    #[test]
    fn test_validate_match() {
        let result = MatchResult {
            selector: candidate(SelectorStrategy::Text, "Login", 0.7),
            ml_confidence: 0.0,
            combined_confidence: 0.7,
            justification: String::new(),
        };
        assert!(validate_match(&result, 0.7));
        assert!(!validate_match(&result, 0.71));
    }
}
