use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tapmend_core_types::attributes;
use tapmend_core_types::{Selector, SelectorStrategy};
use tracing::trace;

use crate::path::score_path;
use crate::stability::StabilityLevel;

pub const DEFAULT_MAX_FALLBACKS: usize = 3;

/// Minimum score a fallback recommendation must reach.
const MIN_FALLBACK_SCORE: f64 = 0.5;

const DYNAMIC_TEXT_PENALTY: f64 = 0.7;
const MULTI_ATTRIBUTE_BONUS: f64 = 1.1;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{2,}").expect("valid regex"));

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// A selector plus the number of additional attributes qualifying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorDescription {
    pub primary: Selector,
    pub extra_attributes: usize,
}

impl From<Selector> for SelectorDescription {
    fn from(primary: Selector) -> Self {
        Self {
            primary,
            extra_attributes: 0,
        }
    }
}

/// Stateless stability scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorScorer;

impl SelectorScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a bare selector.
    pub fn score(&self, selector: &Selector) -> f64 {
        self.score_description(&SelectorDescription::from(selector.clone()))
    }

    /// Score a selector description; always within `[0, 1]`.
    pub fn score_description(&self, description: &SelectorDescription) -> f64 {
        let selector = &description.primary;
        let score = match &selector.strategy {
            SelectorStrategy::XPath => score_path(&selector.value),
            strategy => {
                let mut score = base_score(strategy);
                if description.extra_attributes > 0 {
                    score = (score * MULTI_ATTRIBUTE_BONUS).min(1.0);
                }
                if is_text_family(strategy) && looks_dynamic(&selector.value) {
                    score *= DYNAMIC_TEXT_PENALTY;
                }
                score
            }
        };
        let rounded = round2(score.clamp(0.0, 1.0));
        trace!(strategy = %selector.strategy, score = rounded, "scored selector");
        rounded
    }

    pub fn stability_level(&self, score: f64) -> StabilityLevel {
        StabilityLevel::from_score(score)
    }

    /// Recommend up to `max` fallback selectors built from an element's attributes.
    ///
    /// Keys may be strategy tokens (`resource_id`, `text`, ...) or the neutral attribute
    /// names used in snapshots (`identifier`, `accessibility_name`, ...). The primary
    /// selector's strategy is skipped and only selectors scoring at least 0.5 are kept.
    pub fn recommend_fallbacks(
        &self,
        primary: &Selector,
        available_attributes: &BTreeMap<String, String>,
        max: usize,
    ) -> Vec<Selector> {
        let mut scored: Vec<(f64, Selector)> = available_attributes
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .filter_map(|(key, value)| {
                strategy_for_attribute(key).map(|strategy| Selector::new(strategy, value.clone()))
            })
            .filter(|candidate| candidate.strategy != primary.strategy)
            .map(|candidate| (self.score(&candidate), candidate))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored
            .into_iter()
            .filter(|(score, _)| *score >= MIN_FALLBACK_SCORE)
            .take(max)
            .map(|(_, selector)| selector)
            .collect()
    }
}

fn base_score(strategy: &SelectorStrategy) -> f64 {
    match strategy {
        SelectorStrategy::TestId => 1.0,
        SelectorStrategy::AccessibilityId => 0.95,
        SelectorStrategy::ResourceId | SelectorStrategy::Id => 0.90,
        SelectorStrategy::ContentDesc => 0.75,
        SelectorStrategy::Text | SelectorStrategy::PartialText => 0.60,
        SelectorStrategy::ClassName => 0.50,
        SelectorStrategy::XPath => crate::path::BASE_SCORE,
        SelectorStrategy::Index => 0.20,
        SelectorStrategy::Css | SelectorStrategy::Other(_) => 0.30,
    }
}

fn is_text_family(strategy: &SelectorStrategy) -> bool {
    matches!(strategy, SelectorStrategy::Text | SelectorStrategy::PartialText)
}

/// Text that contains digit runs, currency, or is very short is likely generated.
pub fn looks_dynamic(text: &str) -> bool {
    DIGIT_RUN.is_match(text)
        || text.chars().any(|c| CURRENCY_SYMBOLS.contains(&c))
        || text.chars().count() < 3
}

fn strategy_for_attribute(key: &str) -> Option<SelectorStrategy> {
    let strategy = match key {
        attributes::IDENTIFIER => SelectorStrategy::Id,
        attributes::ACCESSIBILITY_NAME => SelectorStrategy::AccessibilityId,
        attributes::CONTENT_DESCRIPTION => SelectorStrategy::ContentDesc,
        attributes::CLICKABLE | attributes::ENABLED | attributes::BOUNDS => return None,
        other => SelectorStrategy::parse(other),
    };
    match strategy {
        SelectorStrategy::Other(_) => None,
        known => Some(known),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
