//! Error types shared by the pipeline crates

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shared error type the component errors convert into.
#[derive(Debug, Error, Clone)]
pub enum TapmendError {
    #[error("{message}")]
    Message { message: String },
}

impl TapmendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Why a failure could not be healed.
///
/// Every unhealed case in a report is labelled with exactly one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HealFailureReason {
    /// A required input (report, snapshot, locator definition) is absent
    InputMissing { detail: String },
    /// Text that had to match a known pattern did not
    PatternNotMatched { detail: String },
    /// The snapshot yielded no usable alternative
    NoCandidates { detail: String },
    /// Best match fell below the configured threshold
    LowConfidence { confidence: f64, threshold: f64 },
    FileIo { detail: String },
    VersionControl { detail: String },
}

impl HealFailureReason {
    pub fn input_missing(detail: impl Into<String>) -> Self {
        Self::InputMissing {
            detail: detail.into(),
        }
    }

    pub fn pattern_not_matched(detail: impl Into<String>) -> Self {
        Self::PatternNotMatched {
            detail: detail.into(),
        }
    }

    pub fn no_candidates(detail: impl Into<String>) -> Self {
        Self::NoCandidates {
            detail: detail.into(),
        }
    }

    pub fn file_io(detail: impl Into<String>) -> Self {
        Self::FileIo {
            detail: detail.into(),
        }
    }

    pub fn version_control(detail: impl Into<String>) -> Self {
        Self::VersionControl {
            detail: detail.into(),
        }
    }

    /// Stable label for the taxonomy entry.
    pub fn label(&self) -> &'static str {
        match self {
            HealFailureReason::InputMissing { .. } => "InputMissing",
            HealFailureReason::PatternNotMatched { .. } => "PatternNotMatched",
            HealFailureReason::NoCandidates { .. } => "NoCandidates",
            HealFailureReason::LowConfidence { .. } => "LowConfidence",
            HealFailureReason::FileIo { .. } => "FileIOError",
            HealFailureReason::VersionControl { .. } => "VersionControlError",
        }
    }
}

impl fmt::Display for HealFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealFailureReason::LowConfidence {
                confidence,
                threshold,
            } => write!(
                f,
                "{}: confidence too low: {:.2} < {:.2}",
                self.label(),
                confidence,
                threshold
            ),
            HealFailureReason::InputMissing { detail }
            | HealFailureReason::PatternNotMatched { detail }
            | HealFailureReason::NoCandidates { detail }
            | HealFailureReason::FileIo { detail }
            | HealFailureReason::VersionControl { detail } => {
                write!(f, "{}: {}", self.label(), detail)
            }
        }
    }
}

impl From<HealFailureReason> for TapmendError {
    fn from(value: HealFailureReason) -> Self {
        TapmendError::new(value.to_string())
    }
}
