//! JSON healing history kept outside version control

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use file_updater::write_atomic;
use serde::{Deserialize, Serialize};
use tapmend_core_types::Selector;
use tracing::debug;

use crate::errors::HistoryError;
use crate::result::HealingResult;

/// One applied heal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub file: PathBuf,
    pub symbol: Option<String>,
    pub old_selector: Selector,
    pub new_selector: Selector,
    pub confidence: f64,
    pub strategy: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Entry for a result whose patch was applied.
    pub fn from_result(result: &HealingResult, timestamp: DateTime<Utc>) -> Option<Self> {
        let update = result.update.as_ref().filter(|u| u.success)?;
        let best = result.best_match.as_ref()?;
        Some(Self {
            file: update.file.clone(),
            symbol: result.failure.symbol().map(str::to_string),
            old_selector: update.old_selector.clone(),
            new_selector: update.new_selector.clone(),
            confidence: best.combined_confidence,
            strategy: best.selector.strategy().to_string(),
            timestamp,
        })
    }
}

pub fn load_history(path: &Path) -> Result<Vec<HistoryEntry>, HistoryError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path).map_err(|source| HistoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw).map_err(|source| HistoryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Append entries to the history array, creating the file and its directory as needed.
/// Returns the number of entries now recorded.
pub fn append_history(path: &Path, entries: &[HistoryEntry]) -> Result<usize, HistoryError> {
    let io_err = |source| HistoryError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut history = load_history(path)?;
    history.extend_from_slice(entries);
    let json = serde_json::to_vec_pretty(&history).map_err(|source| HistoryError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &json).map_err(io_err)?;

    debug!(path = %path.display(), added = entries.len(), total = history.len(), "history saved");
    Ok(history.len())
}
