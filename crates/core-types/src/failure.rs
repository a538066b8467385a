//! Failure records produced by report analysis

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::selector::Selector;

/// Classification of a failed test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    SelectorNotFound,
    Timeout,
    Assertion,
    Other,
}

impl FailureKind {
    pub fn name(&self) -> &'static str {
        match self {
            FailureKind::SelectorNotFound => "selector_not_found",
            FailureKind::Timeout => "timeout",
            FailureKind::Assertion => "assertion_error",
            FailureKind::Other => "other",
        }
    }
}

/// Where a failing locator is declared in page-object sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorDefinition {
    pub file: PathBuf,
    /// Variable or property holding the locator
    pub symbol: Option<String>,
    /// Enclosing class, struct or object
    pub container: Option<String>,
}

/// One failed test whose failure text points at a stale locator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorFailure {
    pub test_name: String,
    pub test_file: PathBuf,
    pub selector: Selector,
    pub kind: FailureKind,
    pub error_message: String,
    pub screenshot: Option<PathBuf>,
    pub ui_snapshot: Option<PathBuf>,
    pub definition: Option<LocatorDefinition>,
}

impl SelectorFailure {
    pub fn new(
        test_name: impl Into<String>,
        test_file: impl Into<PathBuf>,
        selector: Selector,
        kind: FailureKind,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            test_file: test_file.into(),
            selector,
            kind,
            error_message: error_message.into(),
            screenshot: None,
            ui_snapshot: None,
            definition: None,
        }
    }

    pub fn with_ui_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.ui_snapshot = Some(path.into());
        self
    }

    pub fn with_definition(mut self, definition: LocatorDefinition) -> Self {
        self.definition = Some(definition);
        self
    }

    /// Name of the locator symbol, if the definition lookup found one.
    pub fn symbol(&self) -> Option<&str> {
        self.definition
            .as_ref()
            .and_then(|def| def.symbol.as_deref())
    }
}
