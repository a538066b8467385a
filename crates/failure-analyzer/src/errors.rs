//! Error types for report analysis

use std::path::PathBuf;

use tapmend_core_types::{HealFailureReason, TapmendError};
use thiserror::Error;

/// Analyzer error enumeration
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The report file does not exist
    #[error("Test report not found: {0}")]
    ReportMissing(PathBuf),

    /// The report file exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structured report is not well-formed XML
    #[error("Malformed XML report at byte {position}: {message}")]
    MalformedXml { position: u64, message: String },
}

impl AnalyzerError {
    /// Taxonomy entry used when this error ends up in a healing report.
    pub fn reason(&self) -> HealFailureReason {
        match self {
            AnalyzerError::ReportMissing(path) => {
                HealFailureReason::input_missing(format!("no test report at {}", path.display()))
            }
            AnalyzerError::Io { .. } => HealFailureReason::file_io(self.to_string()),
            AnalyzerError::MalformedXml { .. } => {
                HealFailureReason::pattern_not_matched(self.to_string())
            }
        }
    }
}

impl From<AnalyzerError> for TapmendError {
    fn from(value: AnalyzerError) -> Self {
        TapmendError::new(value.to_string())
    }
}
