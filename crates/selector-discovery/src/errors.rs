//! Error types for snapshot parsing

use std::path::PathBuf;

use tapmend_core_types::{HealFailureReason, TapmendError};
use thiserror::Error;

/// Snapshot error enumeration
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Snapshot file could not be read
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot is not well-formed markup
    #[error("Malformed snapshot at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// Snapshot holds no element at all
    #[error("Snapshot contains no elements")]
    Empty,

    /// A parsing bound was hit
    #[error("Snapshot limit '{limit}' exceeded: {value} > {max}")]
    LimitExceeded {
        limit: &'static str,
        value: u64,
        max: u64,
    },
}

impl SnapshotError {
    /// Taxonomy entry used when discovery for a failure cannot proceed.
    pub fn reason(&self) -> HealFailureReason {
        match self {
            SnapshotError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                HealFailureReason::input_missing(self.to_string())
            }
            SnapshotError::Io { .. } => HealFailureReason::file_io(self.to_string()),
            SnapshotError::Malformed { .. }
            | SnapshotError::Empty
            | SnapshotError::LimitExceeded { .. } => {
                HealFailureReason::no_candidates(self.to_string())
            }
        }
    }
}

impl From<SnapshotError> for TapmendError {
    fn from(value: SnapshotError) -> Self {
        TapmendError::new(value.to_string())
    }
}
