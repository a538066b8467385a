use std::path::Path;
use std::time::Instant;

use tapmend_core_types::{AlternativeSelector, ElementAttributes, Selector, SelectorStrategy};
use tracing::{debug, info, warn};

use crate::candidates::CandidateSet;
use crate::errors::SnapshotError;
use crate::limits::{DiscoveryLimits, StructuralPathMode};
use crate::snapshot::UiSnapshot;

pub const IDENTIFIER_CONFIDENCE: f64 = 0.95;
pub const ACCESSIBILITY_CONFIDENCE: f64 = 0.90;
pub const CONTENT_DESCRIPTION_CONFIDENCE: f64 = 0.75;
pub const TEXT_CONFIDENCE: f64 = 0.70;
pub const PARTIAL_TEXT_CONFIDENCE: f64 = 0.65;
pub const CLASS_PATH_CONFIDENCE: f64 = 0.60;
pub const STRUCTURAL_PATH_CONFIDENCE: f64 = 0.50;

/// Elements visited between deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 128;

/// Partial-text candidates need text longer than this.
const PARTIAL_TEXT_MIN_CHARS: usize = 3;

/// Control types treated as interactive regardless of flags.
const INTERACTIVE_TYPES: [&str; 12] = [
    "Button",
    "EditText",
    "TextView",
    "ImageButton",
    "UIButton",
    "UITextField",
    "UILabel",
    "UITextView",
    "TextField",
    "StaticText",
    "Switch",
    "CheckBox",
];

/// Enumerates alternative selectors from a UI snapshot.
#[derive(Debug, Clone, Default)]
pub struct SelectorDiscovery {
    limits: DiscoveryLimits,
}

impl SelectorDiscovery {
    pub fn new(limits: DiscoveryLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &DiscoveryLimits {
        &self.limits
    }

    pub fn discover_from_path(
        &self,
        path: &Path,
        failing: &Selector,
    ) -> Result<CandidateSet, SnapshotError> {
        let started = Instant::now();
        let snapshot = UiSnapshot::load(path, &self.limits)?;
        self.discover_since(&snapshot, failing, started)
    }

    pub fn discover_from_str(
        &self,
        markup: &str,
        failing: &Selector,
    ) -> Result<CandidateSet, SnapshotError> {
        let started = Instant::now();
        let snapshot = UiSnapshot::parse(markup, &self.limits)?;
        self.discover_since(&snapshot, failing, started)
    }

    /// Candidates for every interactive element, sorted by descending confidence.
    ///
    /// Sorting is stable, so equal confidences keep document order. A candidate equal to
    /// the failing selector is never returned. Fails with a `timeout_ms` limit error once
    /// the discovery deadline is reached.
    pub fn discover(
        &self,
        snapshot: &UiSnapshot,
        failing: &Selector,
    ) -> Result<CandidateSet, SnapshotError> {
        self.discover_since(snapshot, failing, Instant::now())
    }

    /// The deadline counts from `started`, so parsing and candidate generation share one budget.
    fn discover_since(
        &self,
        snapshot: &UiSnapshot,
        failing: &Selector,
        started: Instant,
    ) -> Result<CandidateSet, SnapshotError> {
        let deadline = self.limits.timeout();
        let mut candidates = Vec::new();
        for (index, node) in snapshot.iter() {
            if index % DEADLINE_CHECK_INTERVAL == 0 && started.elapsed() >= deadline {
                warn!(
                    visited = index,
                    elements = snapshot.len(),
                    "discovery deadline reached"
                );
                return Err(SnapshotError::LimitExceeded {
                    limit: "timeout_ms",
                    value: started.elapsed().as_millis() as u64,
                    max: self.limits.timeout_ms,
                });
            }
            if !is_interactive(&node.attributes) {
                continue;
            }
            let path = match self.limits.structural_path {
                StructuralPathMode::Ancestry => snapshot.structural_path(index),
                StructuralPathMode::Flat => format!("//{}", node.tag),
            };
            candidates.extend(
                candidates_for_element(&node.attributes, path)
                    .into_iter()
                    .filter(|candidate| candidate.selector != *failing),
            );
        }
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        info!(
            failing = %failing,
            elements = snapshot.len(),
            candidates = candidates.len(),
            "discovered alternative selectors"
        );
        Ok(CandidateSet::new(candidates))
    }
}

/// Known control type, clickable, or exposes text or a description.
pub fn is_interactive(attributes: &ElementAttributes) -> bool {
    let typed = attributes
        .class_name()
        .is_some_and(|class| INTERACTIVE_TYPES.iter().any(|t| class.contains(t)));
    typed
        || attributes.clickable
        || attributes.text().is_some()
        || attributes.content_description().is_some()
}

/// All candidates one element yields, in rule order.
pub fn candidates_for_element(
    attributes: &ElementAttributes,
    structural_path: String,
) -> Vec<AlternativeSelector> {
    let map = attributes.to_map();
    let make = |strategy: SelectorStrategy, value: &str, confidence: f64| {
        AlternativeSelector::new(Selector::new(strategy, value), confidence, map.clone())
    };

    let mut out = Vec::new();
    if let Some(id) = attributes.identifier() {
        out.push(make(SelectorStrategy::Id, id, IDENTIFIER_CONFIDENCE));
    }
    if let Some(name) = attributes.accessibility_name() {
        out.push(make(
            SelectorStrategy::AccessibilityId,
            name,
            ACCESSIBILITY_CONFIDENCE,
        ));
    }
    let text = attributes.text();
    if let Some(text) = text {
        out.push(make(SelectorStrategy::Text, text, TEXT_CONFIDENCE));
        if text.chars().count() > PARTIAL_TEXT_MIN_CHARS {
            out.push(make(
                SelectorStrategy::PartialText,
                text,
                PARTIAL_TEXT_CONFIDENCE,
            ));
        }
    }
    if let Some(description) = attributes.content_description() {
        out.push(make(
            SelectorStrategy::Text,
            description,
            CONTENT_DESCRIPTION_CONFIDENCE,
        ));
    }
    out.push(make(
        SelectorStrategy::XPath,
        &structural_path,
        STRUCTURAL_PATH_CONFIDENCE,
    ));
    if let Some(class) = attributes.class_name() {
        let class_path = match text {
            Some(text) => format!("//{class}[@text={}]", xpath_literal(text)),
            None => format!("//{class}"),
        };
        out.push(make(SelectorStrategy::XPath, &class_path, CLASS_PATH_CONFIDENCE));
    }

    debug!(
        element = attributes.identifier().or(text).unwrap_or("-"),
        count = out.len(),
        "element candidates"
    );
    out
}

/// Quote `value` as an XPath string literal; mixed quotes go through `concat()`.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}
