//! Ranked candidate list with context boosts and attribute filtering

use std::fmt::Write;

use tapmend_core_types::attributes::{CLASS_NAME, TEXT};
use tapmend_core_types::{AlternativeSelector, AttributeMap, ElementAttributes};

pub const SCREEN_NAME_BOOST: f64 = 0.10;
pub const NEARBY_TEXT_BOOST: f64 = 0.05;

const REPORT_LIMIT: usize = 10;

/// Alternatives for one failure, ordered by non-increasing confidence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    candidates: Vec<AlternativeSelector>,
}

impl CandidateSet {
    /// Wrap a list, restoring the ordering invariant with a stable sort.
    pub fn new(mut candidates: Vec<AlternativeSelector>) -> Self {
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlternativeSelector> {
        self.candidates.iter()
    }

    pub fn as_slice(&self) -> &[AlternativeSelector] {
        &self.candidates
    }

    pub fn into_vec(self) -> Vec<AlternativeSelector> {
        self.candidates
    }

    pub fn best(&self) -> Option<&AlternativeSelector> {
        self.candidates.first()
    }

    /// Copy with context boosts applied and the order re-established.
    ///
    /// `+0.10` when the element class mentions `screen_name`, `+0.05` when any of
    /// `nearby_text` occurs in the element text; both case-insensitive, capped at 1.0.
    pub fn boosted_by_context(&self, screen_name: Option<&str>, nearby_text: &[String]) -> Self {
        let screen = screen_name
            .map(str::to_lowercase)
            .filter(|name| !name.is_empty());
        let nearby: Vec<String> = nearby_text
            .iter()
            .map(|t| t.to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let boosted = self
            .candidates
            .iter()
            .map(|candidate| {
                let mut confidence = candidate.confidence;
                if let Some(screen) = &screen {
                    let class = candidate.attribute(CLASS_NAME).unwrap_or_default();
                    if class.to_lowercase().contains(screen.as_str()) {
                        confidence += SCREEN_NAME_BOOST;
                    }
                }
                let text = candidate
                    .attribute(TEXT)
                    .unwrap_or_default()
                    .to_lowercase();
                if !text.is_empty() && nearby.iter().any(|t| text.contains(t.as_str())) {
                    confidence += NEARBY_TEXT_BOOST;
                }
                candidate.with_confidence(confidence.min(1.0))
            })
            .collect();
        Self::new(boosted)
    }

    /// Candidates whose source element carries every `required` attribute exactly.
    pub fn filter_by_attributes(&self, required: &AttributeMap) -> Vec<AlternativeSelector> {
        self.candidates
            .iter()
            .filter(|candidate| ElementAttributes::matches_all(&candidate.attributes, required))
            .cloned()
            .collect()
    }

    /// Human-readable listing of the top alternatives.
    pub fn report(&self) -> String {
        if self.candidates.is_empty() {
            return "No alternative selectors found.".to_string();
        }
        let rule = "=".repeat(80);
        let mut out = String::new();
        let _ = writeln!(out, "ALTERNATIVE SELECTORS");
        let _ = writeln!(out, "{rule}\n");
        let _ = writeln!(
            out,
            "Found {} alternative selector(s):\n",
            self.candidates.len()
        );
        for (i, candidate) in self.candidates.iter().take(REPORT_LIMIT).enumerate() {
            let keys: Vec<&str> = candidate.attributes.keys().map(String::as_str).collect();
            let _ = writeln!(
                out,
                "{}. {}: '{}'",
                i + 1,
                candidate.strategy(),
                candidate.value()
            );
            let _ = writeln!(out, "   Confidence: {:.2}", candidate.confidence);
            let _ = writeln!(out, "   Attributes: {}\n", keys.join(", "));
        }
        if self.candidates.len() > REPORT_LIMIT {
            let _ = writeln!(out, "... and {} more", self.candidates.len() - REPORT_LIMIT);
        }
        let _ = writeln!(out, "{rule}");
        out
    }
}

impl IntoIterator for CandidateSet {
    type Item = AlternativeSelector;
    type IntoIter = std::vec::IntoIter<AlternativeSelector>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a AlternativeSelector;
    type IntoIter = std::slice::Iter<'a, AlternativeSelector>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
