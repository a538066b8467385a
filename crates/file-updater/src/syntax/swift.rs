use tapmend_core_types::{Selector, SelectorStrategy, SourceLanguage};

use super::{
    compile, group_span, quote, quoted_value_pattern, symbol_pattern, LocatorSpan, LocatorSyntax,
};
use crate::errors::UpdateError;

/// `var name: XCUIElement { app.buttons["value"] }`, single or multi-line.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwiftSyntax;

impl LocatorSyntax for SwiftSyntax {
    fn language(&self) -> SourceLanguage {
        SourceLanguage::Swift
    }

    fn locate(&self, content: &str, symbol: Option<&str>, old: &Selector) -> Option<LocatorSpan> {
        let val = quoted_value_pattern(&old.value);
        // Comment lines may sit between the brace and the query after an earlier heal
        let pattern = format!(
            r#"\bvar\s+{sym}\s*:\s*XCUIElement\s*\{{(?:\s*//[^\n]*)*\s*(app(?:\.\w+(?:\([^)\n]*\))?)*(?:\[\s*"{val}"\s*\]|\.matching\(identifier:\s*"{val}"\s*\))(?:\.firstMatch)?)"#,
            sym = symbol_pattern(symbol),
        );
        let caps = compile(&pattern)?.captures(content)?;
        group_span(&caps, 1)
    }

    fn render(&self, new: &Selector) -> Result<String, UpdateError> {
        let value = quote(&new.value);
        let query = match &new.strategy {
            SelectorStrategy::AccessibilityId
            | SelectorStrategy::Id
            | SelectorStrategy::TestId
            | SelectorStrategy::ResourceId => {
                format!("app.descendants(matching: .any).matching(identifier: \"{value}\").firstMatch")
            }
            SelectorStrategy::Text | SelectorStrategy::ContentDesc => {
                format!("app.descendants(matching: .any)[\"{value}\"].firstMatch")
            }
            SelectorStrategy::PartialText => format!(
                "app.descendants(matching: .any).matching(NSPredicate(format: \"label CONTAINS %@\", \"{value}\")).firstMatch"
            ),
            other => {
                return Err(UpdateError::UnsupportedStrategy {
                    language: "Swift".to_string(),
                    strategy: other.to_string(),
                })
            }
        };
        Ok(query)
    }
}
