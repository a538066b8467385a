use tapmend_core_types::{Selector, SelectorStrategy, SourceLanguage};

use super::{compile, group_span, quote, symbol_pattern, LocatorSpan, LocatorSyntax};
use crate::errors::UpdateError;

/// `name = ("strategy", "value")` tuples.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonSyntax;

impl LocatorSyntax for PythonSyntax {
    fn language(&self) -> SourceLanguage {
        SourceLanguage::Python
    }

    fn comment_prefix(&self) -> &'static str {
        "#"
    }

    fn locate(&self, content: &str, symbol: Option<&str>, old: &Selector) -> Option<LocatorSpan> {
        let pattern = format!(
            r#"\b{sym}\s*(?::[^=\n]+)?=\s*(\(\s*["']([^"'\n]+)["']\s*,\s*["']{val}["']\s*\))"#,
            sym = symbol_pattern(symbol),
            val = regex::escape(&old.value),
        );
        let regex = compile(&pattern)?;
        let span = regex
            .captures_iter(content)
            .find(|caps| {
                caps.get(2)
                    .is_some_and(|s| SelectorStrategy::parse(s.as_str()) == old.strategy)
            })
            .and_then(|caps| group_span(&caps, 1));
        span
    }

    fn render(&self, new: &Selector) -> Result<String, UpdateError> {
        Ok(format!(
            "(\"{}\", \"{}\")",
            quote(new.strategy.name()),
            quote(&new.value)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_checks_strategy_and_value() {
        let content = "class LoginPage:\n    submit = (\"id\", \"old_submit\")\n    other = ('xpath', 'old_submit')\n";
        let old = Selector::new(SelectorStrategy::Id, "old_submit");
        let span = PythonSyntax.locate(content, Some("submit"), &old).unwrap();
        assert_eq!(&content[span.start..span.end], "(\"id\", \"old_submit\")");

        let xpath = Selector::new(SelectorStrategy::XPath, "old_submit");
        assert!(PythonSyntax.locate(content, Some("submit"), &xpath).is_none());
        let span = PythonSyntax.locate(content, None, &xpath).unwrap();
        assert_eq!(&content[span.start..span.end], "('xpath', 'old_submit')");
    }

    #[test]
    fn test_annotated_assignment() {
        let content = "    submit: Tuple[str, str] = (\"accessibility_id\", \"go\")";
        let old = Selector::new(SelectorStrategy::AccessibilityId, "go");
        assert!(PythonSyntax.locate(content, Some("submit"), &old).is_some());
    }

    #[test]
    fn test_render() {
        let new = Selector::new(SelectorStrategy::AccessibilityId, "submit_button");
        assert_eq!(
            PythonSyntax.render(&new).unwrap(),
            "(\"accessibility_id\", \"submit_button\")"
        );
    }
}
