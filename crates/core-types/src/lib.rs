//! Shared primitives for the tapmend selector healing pipeline.
//!
//! Every pipeline crate speaks in these types: the `(strategy, value)` selector pair, the
//! normalized attributes of a UI element, the failure records produced by report analysis,
//! and the failure-reason taxonomy surfaced in healing reports.

pub mod attributes;
pub mod errors;
pub mod failure;
pub mod selector;

pub use attributes::{ElementAttributes, AttributeMap};
pub use errors::{HealFailureReason, TapmendError};
pub use failure::{FailureKind, LocatorDefinition, SelectorFailure};
pub use selector::{AlternativeSelector, Selector, SelectorStrategy, SourceLanguage};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one healing run.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
