//! Pluggable confidence signal

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tapmend_core_types::attributes::{
    BOUNDS, CLASS_NAME, CLICKABLE, CONTENT_DESCRIPTION, ENABLED, IDENTIFIER, TEXT,
};
use tapmend_core_types::AlternativeSelector;

use crate::errors::SignalError;

/// Inputs handed to a confidence signal for one candidate element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementFeatures {
    pub class_name: String,
    pub identifier: String,
    pub text: String,
    pub content_description: String,
    pub clickable: bool,
    pub enabled: bool,
    pub bounds: String,
}

impl ElementFeatures {
    pub fn from_candidate(candidate: &AlternativeSelector) -> Self {
        let get = |key: &str| candidate.attribute(key).unwrap_or_default().to_string();
        Self {
            class_name: get(CLASS_NAME),
            identifier: get(IDENTIFIER),
            text: get(TEXT),
            content_description: get(CONTENT_DESCRIPTION),
            clickable: candidate.attribute(CLICKABLE) == Some("true"),
            enabled: candidate.attribute(ENABLED) != Some("false"),
            bounds: get(BOUNDS),
        }
    }
}

/// Predicted element type with the model's confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub element_type: String,
    pub confidence: f64,
}

/// Source of a learned confidence for a candidate element.
#[async_trait]
pub trait ConfidenceSignal: Send + Sync {
    /// `Ok(None)` means the signal has no opinion.
    async fn predict(&self, features: &ElementFeatures)
        -> Result<Option<Prediction>, SignalError>;

    fn name(&self) -> &str;
}

/// Signal that never has an opinion; matching falls back to heuristics alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSignal;

#[async_trait]
impl ConfidenceSignal for NoopSignal {
    async fn predict(
        &self,
        _features: &ElementFeatures,
    ) -> Result<Option<Prediction>, SignalError> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "noop"
    }
}
