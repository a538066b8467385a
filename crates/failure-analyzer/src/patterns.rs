//! Failure phrasings and locator extraction patterns

use once_cell::sync::Lazy;
use regex::Regex;
use tapmend_core_types::{FailureKind, Selector, SelectorStrategy};

/// Phrasings that identify an "element not found" style failure.
static SELECTOR_FAILURE_PHRASES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)NoSuchElementException.*element.*not found",
        r"(?i)TimeoutException.*element.*not found",
        r"(?i)Unable to find element",
        r"(?i)Element.*not found",
        r"(?i)Could not find element",
        r"(?i)No element found",
        r"(?i)Selector.*did not match any elements",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

static TIMEOUT_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)TimeoutException|timed out").expect("valid regex"));

static ASSERTION_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)AssertionError|assert\s").expect("valid regex"));

struct ExtractionPattern {
    regex: Regex,
    /// Captures the value only; the strategy defaults to a structural path
    value_only: bool,
}

impl ExtractionPattern {
    fn pair(pattern: &str) -> Self {
        Self {
            regex: Regex::new(pattern).expect("valid regex"),
            value_only: false,
        }
    }

    fn value(pattern: &str) -> Self {
        Self {
            regex: Regex::new(pattern).expect("valid regex"),
            value_only: true,
        }
    }

    fn extract(&self, text: &str) -> Option<Selector> {
        let caps = self.regex.captures(text)?;
        if self.value_only {
            let value = caps.get(1)?.as_str();
            return Some(Selector::new(SelectorStrategy::XPath, value));
        }
        let strategy = caps.get(1)?.as_str();
        let value = caps.get(2)?.as_str();
        Some(Selector::new(SelectorStrategy::parse(strategy), value))
    }
}

/// Ordered: explicit `strategy=value` idioms first, bare path literals last.
static EXTRACTION_PATTERNS: Lazy<Vec<ExtractionPattern>> = Lazy::new(|| {
    vec![
        ExtractionPattern::pair(r"(?i)Using='([^']+)',.*?value='([^']+)'"),
        ExtractionPattern::pair(r"(?i)By\.(\w+):\s*([^\s\)]+)"),
        ExtractionPattern::pair(r#"(?i)selector.*?\((\w+),\s*['"]([^'"]+)['"]"#),
        ExtractionPattern::value(r#"(?i)xpath['"]?\s*[=:]\s*['"]([^'"]+)['"]"#),
        ExtractionPattern::value(r#"(?i)\bid['"]?\s*[=:]\s*['"]([^'"]+)['"]"#),
        ExtractionPattern::value(r#"(?i)css['"]?\s*[=:]\s*['"]([^'"]+)['"]"#),
        ExtractionPattern::value(r#"(?:^|[\s(=])(//[A-Za-z*@](?:[^\s\[\]'"]|\[[^\]]*\])*)"#),
    ]
});

/// True when the text uses one of the known "element not found" phrasings.
pub fn is_selector_failure(text: &str) -> bool {
    SELECTOR_FAILURE_PHRASES
        .iter()
        .any(|phrase| phrase.is_match(text))
}

/// Pull the failing `(strategy, value)` pair out of failure text.
pub fn extract_selector(text: &str) -> Option<Selector> {
    EXTRACTION_PATTERNS
        .iter()
        .find_map(|pattern| pattern.extract(text))
        .filter(|selector| !selector.value.trim().is_empty())
}

/// Classify failure text.
pub fn classify_failure_kind(text: &str) -> FailureKind {
    if is_selector_failure(text) {
        if TIMEOUT_PHRASE.is_match(text) {
            FailureKind::Timeout
        } else {
            FailureKind::SelectorNotFound
        }
    } else if TIMEOUT_PHRASE.is_match(text) {
        FailureKind::Timeout
    } else if ASSERTION_PHRASE.is_match(text) {
        FailureKind::Assertion
    } else {
        FailureKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrases_are_case_insensitive() {
        assert!(is_selector_failure("unable to FIND element with id"));
        assert!(is_selector_failure(
            "NoSuchElementException: An element could not be located: element not found"
        ));
        assert!(!is_selector_failure("AssertionError: expected 3 got 4"));
    }

    #[test]
    fn test_appium_using_value() {
        let selector = extract_selector(
            "An element could not be located using Using='accessibility id', value='login_button'",
        )
        .unwrap();
        assert_eq!(selector.strategy, SelectorStrategy::AccessibilityId);
        assert_eq!(selector.value, "login_button");
    }

    #[test]
    fn test_by_notation() {
        let selector = extract_selector("Element not found By.xpath: //div[3]/span[2]").unwrap();
        assert_eq!(selector.strategy, SelectorStrategy::XPath);
        assert_eq!(selector.value, "//div[3]/span[2]");

        let selector = extract_selector("could not find element By.id: com.app:id/login)").unwrap();
        assert_eq!(selector, Selector::new(SelectorStrategy::Id, "com.app:id/login"));
    }

    #[test]
    fn test_tuple_notation() {
        let selector =
            extract_selector(r#"selector not resolved: (accessibility_id, "submit")"#).unwrap();
        assert_eq!(
            selector,
            Selector::new(SelectorStrategy::AccessibilityId, "submit")
        );
    }

    #[test]
    fn test_value_only_patterns_default_to_xpath() {
        assert_eq!(
            extract_selector("NoSuchElementException: unable to locate element id='login_btn'")
                .unwrap(),
            Selector::new(SelectorStrategy::XPath, "login_btn")
        );
        assert_eq!(
            extract_selector(r#"lookup failed for id="old_submit""#).unwrap(),
            Selector::new(SelectorStrategy::XPath, "old_submit")
        );
        assert_eq!(
            extract_selector("xpath: '//android.widget.Button'").unwrap(),
            Selector::new(SelectorStrategy::XPath, "//android.widget.Button")
        );
        assert_eq!(
            extract_selector("no match for css='.login > button'").unwrap(),
            Selector::new(SelectorStrategy::XPath, ".login > button")
        );
    }

    #[test]
    fn test_bare_path_literal() {
        assert_eq!(
            extract_selector("Element not found: //android.widget.EditText[@text='Email']")
                .unwrap(),
            Selector::new(
                SelectorStrategy::XPath,
                "//android.widget.EditText[@text='Email']",
            )
        );
        assert!(extract_selector("see http://example.com/docs").is_none());
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify_failure_kind("TimeoutException: element not found after 10s"),
            FailureKind::Timeout
        );
        assert_eq!(
            classify_failure_kind("Unable to find element"),
            FailureKind::SelectorNotFound
        );
        assert_eq!(
            classify_failure_kind("AssertionError: title mismatch"),
            FailureKind::Assertion
        );
        assert_eq!(classify_failure_kind("segfault"), FailureKind::Other);
    }
}
