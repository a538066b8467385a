//! Error types for confidence signals

use tapmend_core_types::TapmendError;
use thiserror::Error;

/// Signal error enumeration
///
/// The matcher never propagates these; any error means "no signal" for that candidate.
#[derive(Debug, Error, Clone)]
pub enum SignalError {
    /// Model or service is not available
    #[error("Confidence signal unavailable: {0}")]
    Unavailable(String),

    /// Prediction failed for this input
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
}

impl From<SignalError> for TapmendError {
    fn from(value: SignalError) -> Self {
        TapmendError::new(value.to_string())
    }
}
