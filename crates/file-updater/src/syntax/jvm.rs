use tapmend_core_types::{Selector, SelectorStrategy, SourceLanguage};

use super::{
    compile, group_span, quote, quoted_value_pattern, symbol_pattern, xpath_literal, LocatorSpan,
    LocatorSyntax,
};
use crate::errors::UpdateError;

/// `val name = By.id("value")`
#[derive(Debug, Clone, Copy, Default)]
pub struct KotlinSyntax;

/// `By name = By.id("value");`
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaSyntax;

/// Call expression such as `By.id("v")` or `AppiumBy.accessibilityId("v")`.
fn call_pattern(value: &str) -> String {
    format!(
        r#"((?:\w+\.)*\w+\(\s*"{val}"\s*\))"#,
        val = quoted_value_pattern(value)
    )
}

fn locator_call(language: SourceLanguage, new: &Selector) -> Result<String, UpdateError> {
    let value = quote(&new.value);
    let call = match &new.strategy {
        SelectorStrategy::Id | SelectorStrategy::ResourceId => format!("By.id(\"{value}\")"),
        SelectorStrategy::AccessibilityId
        | SelectorStrategy::TestId
        | SelectorStrategy::ContentDesc => format!("AppiumBy.accessibilityId(\"{value}\")"),
        SelectorStrategy::XPath => format!("By.xpath(\"{value}\")"),
        SelectorStrategy::Css => format!("By.cssSelector(\"{value}\")"),
        SelectorStrategy::ClassName => format!("By.className(\"{value}\")"),
        SelectorStrategy::Text => {
            let path = format!("//*[@text={}]", xpath_literal(&new.value));
            format!("By.xpath(\"{}\")", quote(&path))
        }
        SelectorStrategy::PartialText => {
            let path = format!("//*[contains(@text, {})]", xpath_literal(&new.value));
            format!("By.xpath(\"{}\")", quote(&path))
        }
        SelectorStrategy::Index | SelectorStrategy::Other(_) => {
            return Err(UpdateError::UnsupportedStrategy {
                language: format!("{language:?}"),
                strategy: new.strategy.to_string(),
            })
        }
    };
    Ok(call)
}

impl LocatorSyntax for KotlinSyntax {
    fn language(&self) -> SourceLanguage {
        SourceLanguage::Kotlin
    }

    fn locate(&self, content: &str, symbol: Option<&str>, old: &Selector) -> Option<LocatorSpan> {
        let pattern = format!(
            r"\b(?:val|var)\s+{sym}\b(?:\s*:\s*[\w.<>?]+)?\s*=\s*{call}",
            sym = symbol_pattern(symbol),
            call = call_pattern(&old.value),
        );
        let caps = compile(&pattern)?.captures(content)?;
        group_span(&caps, 1)
    }

    fn render(&self, new: &Selector) -> Result<String, UpdateError> {
        locator_call(self.language(), new)
    }
}

impl LocatorSyntax for JavaSyntax {
    fn language(&self) -> SourceLanguage {
        SourceLanguage::Java
    }

    fn locate(&self, content: &str, symbol: Option<&str>, old: &Selector) -> Option<LocatorSpan> {
        let pattern = format!(
            r"\b[\w.<>]+\s+{sym}\s*=\s*{call}\s*;",
            sym = symbol_pattern(symbol),
            call = call_pattern(&old.value),
        );
        let caps = compile(&pattern)?.captures(content)?;
        group_span(&caps, 1)
    }

    fn render(&self, new: &Selector) -> Result<String, UpdateError> {
        locator_call(self.language(), new)
    }
}
