use std::fmt;
use std::path::PathBuf;

use element_matcher::MatchResult;
use file_updater::UpdateResult;
use serde::{Deserialize, Serialize};
use tapmend_core_types::{HealFailureReason, SelectorFailure};

/// Where one failure ended up in the healing state machine.
///
/// `Discovered` and `Matched` are intermediate; a dry run that passes the confidence gate
/// stops at `Matched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealingState {
    Discovered,
    Matched,
    Applied,
    RejectedLowConfidence,
    ApplyFailed,
    NoPageSource,
    NoCandidates,
    NoSuitableMatch,
}

impl HealingState {
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            HealingState::RejectedLowConfidence
                | HealingState::ApplyFailed
                | HealingState::NoPageSource
                | HealingState::NoCandidates
                | HealingState::NoSuitableMatch
        )
    }
}

impl fmt::Display for HealingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HealingState::Discovered => "discovered",
            HealingState::Matched => "matched",
            HealingState::Applied => "applied",
            HealingState::RejectedLowConfidence => "rejected_low_confidence",
            HealingState::ApplyFailed => "apply_failed",
            HealingState::NoPageSource => "no_page_source",
            HealingState::NoCandidates => "no_candidates",
            HealingState::NoSuitableMatch => "no_suitable_match",
        };
        f.write_str(name)
    }
}

/// The outcome of healing one selector failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealingResult {
    pub failure: SelectorFailure,
    pub candidate_count: usize,
    pub best_match: Option<MatchResult>,
    pub update: Option<UpdateResult>,
    pub success: bool,
    pub state: HealingState,
    pub reason: Option<HealFailureReason>,
}

impl HealingResult {
    pub(crate) fn failed(
        failure: SelectorFailure,
        state: HealingState,
        reason: HealFailureReason,
    ) -> Self {
        Self {
            failure,
            candidate_count: 0,
            best_match: None,
            update: None,
            success: false,
            state,
            reason: Some(reason),
        }
    }

    pub(crate) fn with_candidates(mut self, count: usize) -> Self {
        self.candidate_count = count;
        self
    }

    pub(crate) fn with_match(mut self, best: MatchResult) -> Self {
        self.best_match = Some(best);
        self
    }

    /// File patched by this result, if the patch succeeded.
    pub fn patched_file(&self) -> Option<&PathBuf> {
        self.update
            .as_ref()
            .filter(|update| update.success)
            .map(|update| &update.file)
    }

    pub fn reason_message(&self) -> String {
        self.reason
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// The commit created for a healing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub commit_id: String,
    pub branch: Option<String>,
    pub files_changed: Vec<PathBuf>,
    pub selectors_healed: usize,
}

/// Everything one `heal_all` run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealingBatch {
    /// One result per failure, in input order
    pub results: Vec<HealingResult>,
    pub commit: Option<CommitInfo>,
    pub commit_error: Option<HealFailureReason>,
    pub history_path: Option<PathBuf>,
}

impl HealingBatch {
    pub fn healed(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.healed()
    }
}
