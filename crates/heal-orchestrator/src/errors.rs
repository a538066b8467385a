//! Error types for the healing run

use std::path::PathBuf;

use tapmend_core_types::{HealFailureReason, TapmendError};
use thiserror::Error;

/// Version control errors
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// Repository has no working directory
    #[error("Repository at {0} is bare")]
    BareRepository(PathBuf),

    /// Patched file does not live inside the repository
    #[error("{0} is outside the repository working tree")]
    OutsideRepository(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VcsError {
    pub fn reason(&self) -> HealFailureReason {
        HealFailureReason::version_control(self.to_string())
    }
}

impl From<VcsError> for TapmendError {
    fn from(value: VcsError) -> Self {
        TapmendError::new(value.to_string())
    }
}

/// Healing history persistence errors
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed history file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl HistoryError {
    pub fn reason(&self) -> HealFailureReason {
        HealFailureReason::file_io(self.to_string())
    }
}

impl From<HistoryError> for TapmendError {
    fn from(value: HistoryError) -> Self {
        TapmendError::new(value.to_string())
    }
}
