//! Selector model shared by analysis, discovery, matching and patching

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeMap;

/// Locator strategy family.
///
/// The canonical names are the tokens written into locator tuples in page-object
/// sources, e.g. `("accessibility_id", "login")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SelectorStrategy {
    /// Developer-assigned test identifier
    TestId,
    /// Platform resource or view identifier
    Id,
    /// Android resource-id spelled out explicitly
    ResourceId,
    /// Accessibility identifier / name
    AccessibilityId,
    /// Android content description
    ContentDesc,
    /// Exact visible text
    Text,
    /// Contains-text match
    PartialText,
    /// Class or element type
    ClassName,
    /// Structural path through the element tree
    XPath,
    Css,
    /// Positional index
    Index,
    /// Any token we do not recognise, kept verbatim
    Other(String),
}

impl SelectorStrategy {
    /// Canonical token for this strategy.
    pub fn name(&self) -> &str {
        match self {
            SelectorStrategy::TestId => "test_id",
            SelectorStrategy::Id => "id",
            SelectorStrategy::ResourceId => "resource_id",
            SelectorStrategy::AccessibilityId => "accessibility_id",
            SelectorStrategy::ContentDesc => "content_desc",
            SelectorStrategy::Text => "text",
            SelectorStrategy::PartialText => "partial_text",
            SelectorStrategy::ClassName => "class_name",
            SelectorStrategy::XPath => "xpath",
            SelectorStrategy::Css => "css",
            SelectorStrategy::Index => "index",
            SelectorStrategy::Other(raw) => raw.as_str(),
        }
    }

    /// Parse a strategy token, accepting the spellings used by Appium, Selenium and
    /// page-object tuples.
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "testid" | "testtag" => SelectorStrategy::TestId,
            "id" => SelectorStrategy::Id,
            "resourceid" => SelectorStrategy::ResourceId,
            "accessibilityid" | "accessibility" => SelectorStrategy::AccessibilityId,
            "contentdesc" | "contentdescription" => SelectorStrategy::ContentDesc,
            "text" | "linktext" => SelectorStrategy::Text,
            "partialtext" | "partiallinktext" => SelectorStrategy::PartialText,
            "classname" | "class" => SelectorStrategy::ClassName,
            "xpath" => SelectorStrategy::XPath,
            "css" | "cssselector" => SelectorStrategy::Css,
            "index" => SelectorStrategy::Index,
            _ => SelectorStrategy::Other(raw.trim().to_string()),
        }
    }

    /// Developer-assigned identifier families.
    pub fn is_identifier(&self) -> bool {
        matches!(
            self,
            SelectorStrategy::TestId
                | SelectorStrategy::Id
                | SelectorStrategy::ResourceId
                | SelectorStrategy::AccessibilityId
        )
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, SelectorStrategy::XPath | SelectorStrategy::Index)
    }
}

impl fmt::Display for SelectorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for SelectorStrategy {
    fn from(value: String) -> Self {
        SelectorStrategy::parse(&value)
    }
}

impl From<SelectorStrategy> for String {
    fn from(value: SelectorStrategy) -> Self {
        value.name().to_string()
    }
}

/// A `(strategy, value)` locator pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub strategy: SelectorStrategy,
    pub value: String,
}

impl Selector {
    pub fn new(strategy: SelectorStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Tuple form used in audit comments and reports: `("id", "login")`.
    pub fn display_tuple(&self) -> String {
        format!("(\"{}\", \"{}\")", self.strategy, self.value)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}

/// Source syntaxes whose locator definitions can be patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLanguage {
    Python,
    Kotlin,
    Java,
    Swift,
}

impl SourceLanguage {
    pub const ALL: [SourceLanguage; 4] = [
        SourceLanguage::Python,
        SourceLanguage::Kotlin,
        SourceLanguage::Java,
        SourceLanguage::Swift,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            SourceLanguage::Python => "py",
            SourceLanguage::Kotlin => "kt",
            SourceLanguage::Java => "java",
            SourceLanguage::Swift => "swift",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.extension().eq_ignore_ascii_case(ext))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Candidate replacement locator derived from one snapshot element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeSelector {
    pub selector: Selector,
    /// Heuristic confidence in `[0, 1]`
    pub confidence: f64,
    /// Normalized attributes of the element the selector was derived from
    pub attributes: AttributeMap,
}

impl AlternativeSelector {
    pub fn new(selector: Selector, confidence: f64, attributes: AttributeMap) -> Self {
        Self {
            selector,
            confidence: confidence.clamp(0.0, 1.0),
            attributes,
        }
    }

    pub fn strategy(&self) -> &SelectorStrategy {
        &self.selector.strategy
    }

    pub fn value(&self) -> &str {
        &self.selector.value
    }

    /// Copy with a different confidence; alternatives are never mutated in place.
    pub fn with_confidence(&self, confidence: f64) -> Self {
        Self::new(self.selector.clone(), confidence, self.attributes.clone())
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

impl fmt::Display for AlternativeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: '{}' (confidence {:.2})",
            self.selector.strategy, self.selector.value, self.confidence
        )
    }
}
