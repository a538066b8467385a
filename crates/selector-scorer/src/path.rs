//! Shape analysis for structural path (XPath-like) selectors

use once_cell::sync::Lazy;
use regex::Regex;

pub const BASE_SCORE: f64 = 0.30;
pub const MAX_SCORE: f64 = 0.80;
pub const MAX_STEPS: usize = 5;

static POSITIONAL_INDEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\s*(?:\d+|last\(\)|position\(\)\s*[=<>]+\s*\d+)\s*\]").expect("valid regex")
});

static STABLE_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(?:resource-id|content-desc)\b").expect("valid regex"));

static TEXT_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@text\b").expect("valid regex"));

/// Features of a path that drive its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathShape {
    pub steps: usize,
    pub positional: bool,
    pub wildcard: bool,
    pub stable_attribute: bool,
    pub text_attribute: bool,
}

impl PathShape {
    pub fn analyze(path: &str) -> Self {
        let segments = split_steps(path);
        let wildcard = segments.iter().any(|segment| {
            let node_test = segment.split('[').next().unwrap_or("").trim();
            node_test == "*"
        });
        Self {
            steps: segments.len(),
            positional: POSITIONAL_INDEX.is_match(path),
            wildcard,
            stable_attribute: STABLE_ATTRIBUTE.is_match(path),
            text_attribute: TEXT_ATTRIBUTE.is_match(path),
        }
    }

    pub fn score(&self) -> f64 {
        let mut score = BASE_SCORE;
        if self.steps > MAX_STEPS {
            score *= 0.7;
        }
        if self.positional {
            score *= 0.8;
        }
        if self.wildcard {
            score *= 0.9;
        }
        if self.stable_attribute {
            score *= 1.3;
        }
        if self.text_attribute {
            score *= 0.9;
        }
        score.min(MAX_SCORE)
    }
}

/// Split a path into location steps, ignoring `/` inside predicates and quotes.
fn split_steps(path: &str) -> Vec<&str> {
    let mut steps = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (idx, ch) in path.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '/') if depth == 0 => {
                steps.push(&path[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    steps.push(&path[start..]);
    steps.retain(|step| !step.trim().is_empty());
    steps
}

/// Score a structural path selector.
pub fn score_path(path: &str) -> f64 {
    PathShape::analyze(path).score()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_detection() {
        let shape = PathShape::analyze("//hierarchy/android.widget.FrameLayout[2]/*[@text='Go']");
        assert_eq!(shape.steps, 3);
        assert!(shape.positional);
        assert!(shape.wildcard);
        assert!(shape.text_attribute);
        assert!(!shape.stable_attribute);
    }

    #[test]
    fn test_attribute_predicate_is_not_positional() {
        let shape = PathShape::analyze("//android.widget.Button[@resource-id='com.app:id/go']");
        assert!(!shape.positional);
        assert!(shape.stable_attribute);
    }

    #[test]
    fn test_slashes_inside_predicates_are_not_steps() {
        let shape = PathShape::analyze("//android.widget.Button[@resource-id='com.app:id/go']");
        assert_eq!(shape.steps, 1);
    }

    #[test]
    fn test_plain_short_path_keeps_base() {
        assert!((score_path("//android.widget.Button") - BASE_SCORE).abs() < 1e-9);
    }

    #[test]
    fn test_deep_indexed_path() {
        let score = score_path("//a/b/c/d/e/f[3]");
        assert!((score - 0.3 * 0.7 * 0.8).abs() < 1e-9);
    }
}
