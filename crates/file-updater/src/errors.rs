//! Error types for locator rewriting

use std::path::PathBuf;

use tapmend_core_types::{HealFailureReason, TapmendError};
use thiserror::Error;

/// Update error enumeration
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Target file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// No locator syntax registered for the file extension
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(PathBuf),

    /// The anchored definition is not in the file
    #[error("Selector pattern not found: {symbol} = {value} in {file}")]
    PatternNotFound {
        file: PathBuf,
        symbol: String,
        value: String,
    },

    /// The target syntax cannot express the new strategy
    #[error("{language} locators cannot use strategy '{strategy}'")]
    UnsupportedStrategy { language: String, strategy: String },

    /// Backup to restore from does not exist
    #[error("Backup not found: {0}")]
    BackupMissing(PathBuf),

    /// Path is not a backup created by the updater
    #[error("Not a backup path: {0}")]
    NotABackup(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UpdateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UpdateError::Io {
            path: path.into(),
            source,
        }
    }

    /// Taxonomy entry recorded in the update result.
    pub fn reason(&self) -> HealFailureReason {
        match self {
            UpdateError::FileNotFound(_)
            | UpdateError::BackupMissing(_)
            | UpdateError::NotABackup(_) => HealFailureReason::input_missing(self.to_string()),
            UpdateError::UnsupportedFileType(_)
            | UpdateError::PatternNotFound { .. }
            | UpdateError::UnsupportedStrategy { .. } => {
                HealFailureReason::pattern_not_matched(self.to_string())
            }
            UpdateError::Io { .. } => HealFailureReason::file_io(self.to_string()),
        }
    }
}

impl From<UpdateError> for TapmendError {
    fn from(value: UpdateError) -> Self {
        TapmendError::new(value.to_string())
    }
}
