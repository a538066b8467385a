//! Artifact enrichment: screenshots, UI snapshots and locator definitions
//!
//! Lookups are best effort. A directory or file that cannot be read is logged and skipped.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tapmend_core_types::{LocatorDefinition, SelectorFailure, SourceLanguage};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::analyzer::FailureAnalyzer;

/// Lines above the value line searched for the declaring symbol.
const SYMBOL_LOOKBACK: usize = 3;

static DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:val|var|let)\s+([A-Za-z_]\w*)").expect("valid regex"));

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z_]\w*)\s*(?::\s*[^=]+)?=\s*[^=]").expect("valid regex")
});

static CONTAINER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:class|struct|object|enum)\s+([A-Za-z_]\w*)").expect("valid regex")
});

impl FailureAnalyzer {
    /// Link each failure to the first `*.png` in `dir` whose name contains the test name.
    pub fn enrich_with_screenshots(&self, failures: &mut [SelectorFailure], dir: &Path) {
        let files = list_dir(dir, "png");
        for failure in failures.iter_mut() {
            if let Some(path) = first_containing(&files, &failure.test_name) {
                debug!(test = %failure.test_name, screenshot = %path.display(), "linked screenshot");
                failure.screenshot = Some(path);
            }
        }
    }

    /// Link each failure to the first `*.xml` UI snapshot whose name contains the test name.
    pub fn enrich_with_page_source(&self, failures: &mut [SelectorFailure], dir: &Path) {
        let files = list_dir(dir, "xml");
        for failure in failures.iter_mut() {
            if let Some(path) = first_containing(&files, &failure.test_name) {
                debug!(test = %failure.test_name, snapshot = %path.display(), "linked ui snapshot");
                failure.ui_snapshot = Some(path);
            }
        }
    }

    /// Find the source file declaring each failing selector.
    ///
    /// Files of every supported source language under `dir` are scanned in sorted path
    /// order; the first one containing the selector value literally wins.
    pub fn enrich_with_locator_definitions(&self, failures: &mut [SelectorFailure], dir: &Path) {
        let sources: Vec<PathBuf> = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| SourceLanguage::from_path(path).is_some())
            .collect();

        for failure in failures.iter_mut() {
            for path in &sources {
                let content = match std::fs::read_to_string(path) {
                    Ok(content) => content,
                    Err(err) => {
                        warn!(file = %path.display(), error = %err, "skipping unreadable source");
                        continue;
                    }
                };
                if let Some(definition) = locate_definition(path, &content, &failure.selector.value)
                {
                    debug!(
                        test = %failure.test_name,
                        file = %path.display(),
                        symbol = definition.symbol.as_deref().unwrap_or("-"),
                        "found locator definition"
                    );
                    failure.definition = Some(definition);
                    break;
                }
            }
        }
    }
}

/// Locate the declaration of `value` in `content`.
pub fn locate_definition(path: &Path, content: &str, value: &str) -> Option<LocatorDefinition> {
    if value.is_empty() {
        return None;
    }
    let lines: Vec<&str> = content.lines().collect();
    let index = lines.iter().position(|line| line.contains(value))?;

    let symbol = (index.saturating_sub(SYMBOL_LOOKBACK)..=index)
        .rev()
        .find_map(|i| declared_symbol(lines[i]));
    let container = lines[..=index]
        .iter()
        .rev()
        .find_map(|line| CONTAINER.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    Some(LocatorDefinition {
        file: path.to_path_buf(),
        symbol,
        container,
    })
}

fn declared_symbol(line: &str) -> Option<String> {
    DECLARATION
        .captures(line)
        .or_else(|| ASSIGNMENT.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn list_dir(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "artifact directory not readable");
            return Vec::new();
        }
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();
    files.sort();
    files
}

fn first_containing(files: &[PathBuf], needle: &str) -> Option<PathBuf> {
    files
        .iter()
        .find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains(needle))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_tuple_symbol() {
        let content = "class LoginPage:\n    submit = (\"id\", \"old_submit\")\n";
        let def = locate_definition(Path::new("login_page.py"), content, "old_submit").unwrap();
        assert_eq!(def.symbol.as_deref(), Some("submit"));
        assert_eq!(def.container.as_deref(), Some("LoginPage"));
    }

    #[test]
    fn test_java_and_kotlin_symbols() {
        let java = "public class CartPage {\n    By checkout = By.id(\"checkout_btn\");\n}";
        let def = locate_definition(Path::new("CartPage.java"), java, "checkout_btn").unwrap();
        assert_eq!(def.symbol.as_deref(), Some("checkout"));
        assert_eq!(def.container.as_deref(), Some("CartPage"));

        let kotlin = "object Cart {\n    val checkout = By.id(\"checkout_btn\")\n}";
        let def = locate_definition(Path::new("Cart.kt"), kotlin, "checkout_btn").unwrap();
        assert_eq!(def.symbol.as_deref(), Some("checkout"));
        assert_eq!(def.container.as_deref(), Some("Cart"));
    }

    #[test]
    fn test_swift_symbol_from_line_above() {
        let swift = "struct LoginScreen {\n    var loginButton: XCUIElement {\n        app.buttons[\"login_btn\"]\n    }\n}";
        let def = locate_definition(Path::new("LoginScreen.swift"), swift, "login_btn").unwrap();
        assert_eq!(def.symbol.as_deref(), Some("loginButton"));
        assert_eq!(def.container.as_deref(), Some("LoginScreen"));
    }

    #[test]
    fn test_missing_value() {
        assert!(locate_definition(Path::new("a.py"), "x = 1", "nope").is_none());
    }
}
