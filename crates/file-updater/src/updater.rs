use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tapmend_core_types::{HealFailureReason, Selector};
use tracing::{debug, info, warn};

use crate::backup::{backup_path_for, original_for_backup, write_atomic};
use crate::errors::UpdateError;
use crate::locks::PathLocks;
use crate::syntax::{LocatorSpan, LocatorSyntax, SyntaxTable};

/// One locator rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub file: PathBuf,
    /// Variable holding the locator; `None` anchors on any identifier
    pub symbol: Option<String>,
    pub old: Selector,
    pub new: Selector,
    pub confidence: f64,
}

/// Outcome of one attempted patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub success: bool,
    pub file: PathBuf,
    pub old_selector: Selector,
    pub new_selector: Selector,
    pub backup_path: Option<PathBuf>,
    pub error: Option<HealFailureReason>,
}

impl UpdateResult {
    fn ok(request: &UpdateRequest, backup_path: Option<PathBuf>) -> Self {
        Self {
            success: true,
            file: request.file.clone(),
            old_selector: request.old.clone(),
            new_selector: request.new.clone(),
            backup_path,
            error: None,
        }
    }

    fn failed(request: &UpdateRequest, error: &UpdateError) -> Self {
        Self {
            success: false,
            file: request.file.clone(),
            old_selector: request.old.clone(),
            new_selector: request.new.clone(),
            backup_path: None,
            error: Some(error.reason()),
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

impl fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "ok" } else { "failed" };
        write!(
            f,
            "[{status}] {}: {} -> {}",
            self.file.display(),
            self.old_selector.display_tuple(),
            self.new_selector.display_tuple()
        )
    }
}

/// Rewrites locator definitions in place.
#[derive(Debug, Clone)]
pub struct FileUpdater {
    create_backup: bool,
    table: Arc<SyntaxTable>,
    locks: PathLocks,
}

impl Default for FileUpdater {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FileUpdater {
    pub fn new(create_backup: bool) -> Self {
        Self::with_table(create_backup, SyntaxTable::standard())
    }

    pub fn with_table(create_backup: bool, table: SyntaxTable) -> Self {
        Self {
            create_backup,
            table: Arc::new(table),
            locks: PathLocks::new(),
        }
    }

    pub fn locks(&self) -> &PathLocks {
        &self.locks
    }

    /// Patch one locator definition. Failures are reported in the result, never raised.
    pub fn update(&self, request: &UpdateRequest) -> UpdateResult {
        match self.try_update(request) {
            Ok(backup_path) => {
                info!(
                    file = %request.file.display(),
                    old = %request.old,
                    new = %request.new,
                    confidence = request.confidence,
                    "locator updated"
                );
                UpdateResult::ok(request, backup_path)
            }
            Err(err) => {
                warn!(file = %request.file.display(), error = %err, "locator update failed");
                UpdateResult::failed(request, &err)
            }
        }
    }

    fn try_update(&self, request: &UpdateRequest) -> Result<Option<PathBuf>, UpdateError> {
        let path = request.file.as_path();
        if !path.exists() {
            return Err(UpdateError::FileNotFound(path.to_path_buf()));
        }
        let syntax = self
            .table
            .for_path(path)
            .ok_or_else(|| UpdateError::UnsupportedFileType(path.to_path_buf()))?;

        let handle = self.locks.handle(path);
        let _guard = handle.lock();

        let content = fs::read_to_string(path).map_err(|e| UpdateError::io(path, e))?;
        let span = syntax
            .locate(&content, request.symbol.as_deref(), &request.old)
            .ok_or_else(|| UpdateError::PatternNotFound {
                file: path.to_path_buf(),
                symbol: request.symbol.clone().unwrap_or_else(|| "*".to_string()),
                value: request.old.value.clone(),
            })?;
        let expression = syntax.render(&request.new)?;
        let patched = compose(&content, span, &expression, syntax, request);

        let backup_path = if self.create_backup {
            let backup = backup_path_for(path);
            fs::write(&backup, content.as_bytes()).map_err(|e| UpdateError::io(&backup, e))?;
            debug!(backup = %backup.display(), "backup written");
            Some(backup)
        } else {
            None
        };

        write_atomic(path, patched.as_bytes()).map_err(|e| UpdateError::io(path, e))?;
        Ok(backup_path)
    }

    /// Copy a backup over its original and delete the backup.
    pub fn restore_backup(&self, backup: &Path) -> Result<PathBuf, UpdateError> {
        if !backup.exists() {
            return Err(UpdateError::BackupMissing(backup.to_path_buf()));
        }
        let original =
            original_for_backup(backup).ok_or_else(|| UpdateError::NotABackup(backup.to_path_buf()))?;

        let handle = self.locks.handle(&original);
        let _guard = handle.lock();

        let data = fs::read(backup).map_err(|e| UpdateError::io(backup, e))?;
        write_atomic(&original, &data).map_err(|e| UpdateError::io(&original, e))?;
        fs::remove_file(backup).map_err(|e| UpdateError::io(backup, e))?;
        info!(file = %original.display(), "restored from backup");
        Ok(original)
    }

    /// Apply independent updates; one result per request, in order.
    pub fn batch_update(&self, requests: &[UpdateRequest]) -> Vec<UpdateResult> {
        requests.iter().map(|request| self.update(request)).collect()
    }
}

/// Build the patched file: audit comment above the definition line, the new expression in
/// place of the old one, and the old selector as a fallback comment on the following line.
fn compose(
    content: &str,
    span: LocatorSpan,
    expression: &str,
    syntax: &dyn LocatorSyntax,
    request: &UpdateRequest,
) -> String {
    let line_start = content[..span.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = content[span.end..]
        .find('\n')
        .map_or(content.len(), |i| span.end + i);
    let lead = &content[line_start..span.start];
    let raw_rest = &content[span.end..line_end];
    // the patched lines reuse the located line's ending
    let (rest, eol) = match raw_rest.strip_suffix('\r') {
        Some(rest) => (rest, "\r\n"),
        None => (raw_rest, "\n"),
    };
    let indent: String = lead.chars().take_while(|c| c.is_whitespace()).collect();
    let prefix = syntax.comment_prefix();
    let old = request.old.display_tuple();
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    let mut out = String::with_capacity(content.len() + 256);
    out.push_str(&content[..line_start]);
    out.push_str(&format!("{indent}{prefix} Auto-healed: {timestamp}{eol}"));
    out.push_str(&format!(
        "{indent}{prefix} Original: {old} - element not found{eol}"
    ));
    out.push_str(&format!(
        "{indent}{prefix} New: {} strategy, confidence: {:.2}{eol}",
        request.new.strategy, request.confidence
    ));
    out.push_str(lead);
    out.push_str(expression);
    out.push_str(rest);
    out.push_str(eol);
    out.push_str(&format!("{indent}{prefix} Fallback: {old}"));
    if line_end < content.len() && eol == "\r\n" {
        out.push('\r');
    }
    out.push_str(&content[line_end..]);
    out
}
