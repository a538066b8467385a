//! Per-language locator syntaxes
//!
//! Each syntax knows how to find the expression bound to a locator symbol and how to
//! render a replacement expression. Matching is anchored on the symbol and the old value;
//! nothing is parsed beyond that.

mod jvm;
mod python;
mod swift;

use std::collections::BTreeMap;
use std::path::Path;

use regex::{Captures, Regex};
use tapmend_core_types::{Selector, SourceLanguage};

use crate::errors::UpdateError;

pub use jvm::{JavaSyntax, KotlinSyntax};
pub use python::PythonSyntax;
pub use swift::SwiftSyntax;

/// Byte range of the locator expression to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorSpan {
    pub start: usize,
    pub end: usize,
}

pub trait LocatorSyntax: Send + Sync {
    fn language(&self) -> SourceLanguage;

    fn comment_prefix(&self) -> &'static str {
        "//"
    }

    /// Find the expression bound to `symbol` that still carries `old`'s value.
    ///
    /// With no symbol, any identifier is accepted as the anchor.
    fn locate(&self, content: &str, symbol: Option<&str>, old: &Selector) -> Option<LocatorSpan>;

    /// Render the replacement expression for `new`.
    fn render(&self, new: &Selector) -> Result<String, UpdateError>;
}

/// Extension to syntax lookup.
pub struct SyntaxTable {
    by_extension: BTreeMap<String, Box<dyn LocatorSyntax>>,
}

impl SyntaxTable {
    pub fn empty() -> Self {
        Self {
            by_extension: BTreeMap::new(),
        }
    }

    /// Python, Kotlin, Java and Swift.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.register(Box::new(PythonSyntax));
        table.register(Box::new(KotlinSyntax));
        table.register(Box::new(JavaSyntax));
        table.register(Box::new(SwiftSyntax));
        table
    }

    pub fn register(&mut self, syntax: Box<dyn LocatorSyntax>) {
        let extension = syntax.language().extension().to_string();
        self.by_extension.insert(extension, syntax);
    }

    pub fn for_path(&self, path: &Path) -> Option<&dyn LocatorSyntax> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        self.by_extension.get(&extension).map(|syntax| syntax.as_ref())
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.by_extension.keys().map(String::as_str)
    }
}

impl Default for SyntaxTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for SyntaxTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.extensions()).finish()
    }
}

pub(crate) fn symbol_pattern(symbol: Option<&str>) -> String {
    match symbol {
        Some(symbol) => regex::escape(symbol),
        None => r"[A-Za-z_]\w*".to_string(),
    }
}

/// Escape for a double-quoted string literal.
pub(crate) fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Pattern matching `value` as it appears inside a double-quoted literal.
pub(crate) fn quoted_value_pattern(value: &str) -> String {
    regex::escape(&quote(value))
}

pub(crate) fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

pub(crate) fn group_span(caps: &Captures<'_>, group: usize) -> Option<LocatorSpan> {
    caps.get(group).map(|m| LocatorSpan {
        start: m.start(),
        end: m.end(),
    })
}

/// Quote a value for use inside an XPath predicate.
pub(crate) fn xpath_literal(value: &str) -> String {
    if value.contains('\'') {
        format!("\"{value}\"")
    } else {
        format!("'{value}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup_by_extension() {
        let table = SyntaxTable::standard();
        assert_eq!(
            table.for_path(Path::new("pages/login.py")).map(|s| s.language()),
            Some(SourceLanguage::Python)
        );
        assert_eq!(
            table.for_path(Path::new("Login.SWIFT")).map(|s| s.language()),
            Some(SourceLanguage::Swift)
        );
        assert!(table.for_path(Path::new("login.rb")).is_none());
        assert_eq!(
            table.extensions().collect::<Vec<_>>(),
            vec!["java", "kt", "py", "swift"]
        );
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(xpath_literal("it's"), "\"it's\"");
    }
}
