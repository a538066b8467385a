use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use element_matcher::{validate_match, ConfidenceSignal, ElementMatcher, MatchContext, NoopSignal};
use file_updater::{FileUpdater, UpdateRequest};
use selector_discovery::{CandidateSet, SelectorDiscovery};
use tapmend_core_types::{HealFailureReason, SelectorFailure};
use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::HealingConfig;
use crate::history::{append_history, HistoryEntry};
use crate::result::{HealingBatch, HealingResult, HealingState};
use crate::vcs::{commit_files, commit_message};

struct OrchestratorInner {
    repo_root: PathBuf,
    config: HealingConfig,
    discovery: SelectorDiscovery,
    matcher: ElementMatcher,
    updater: FileUpdater,
}

/// Drives discovery, matching, gating and patching for selector failures.
///
/// Cheap to clone; clones share the same file locks.
#[derive(Clone)]
pub struct HealingOrchestrator {
    inner: Arc<OrchestratorInner>,
}

impl std::fmt::Debug for HealingOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealingOrchestrator")
            .field("repo_root", &self.inner.repo_root)
            .field("config", &self.inner.config)
            .field("matcher", &self.inner.matcher)
            .finish()
    }
}

impl HealingOrchestrator {
    pub fn new(
        repo_root: impl Into<PathBuf>,
        config: HealingConfig,
        signal: Arc<dyn ConfidenceSignal>,
    ) -> Self {
        let matcher = ElementMatcher::new(signal).with_signal_timeout(config.signal_timeout());
        Self {
            inner: Arc::new(OrchestratorInner {
                repo_root: repo_root.into(),
                discovery: SelectorDiscovery::new(config.discovery.clone()),
                updater: FileUpdater::new(config.create_backup),
                matcher,
                config,
            }),
        }
    }

    /// Orchestrator with no learned confidence signal.
    pub fn heuristic(repo_root: impl Into<PathBuf>, config: HealingConfig) -> Self {
        Self::new(repo_root, config, Arc::new(NoopSignal))
    }

    pub fn config(&self) -> &HealingConfig {
        &self.inner.config
    }

    pub fn repo_root(&self) -> &Path {
        &self.inner.repo_root
    }

    pub fn updater(&self) -> &FileUpdater {
        &self.inner.updater
    }

    /// Heal one failure. Never fails; the outcome is carried by the result.
    pub async fn heal_failure(&self, failure: &SelectorFailure, dry_run: bool) -> HealingResult {
        let span = info_span!("heal", test = %failure.test_name, selector = %failure.selector);
        self.heal_inner(failure.clone(), dry_run).instrument(span).await
    }

    async fn heal_inner(&self, failure: SelectorFailure, dry_run: bool) -> HealingResult {
        let Some(snapshot) = failure.ui_snapshot.clone().filter(|p| p.exists()) else {
            debug!("no UI snapshot");
            return HealingResult::failed(
                failure,
                HealingState::NoPageSource,
                HealFailureReason::input_missing("No page source available"),
            );
        };

        let candidates = match self.discover(snapshot, &failure).await {
            Ok(candidates) => candidates,
            Err(reason) => {
                let state = match reason {
                    HealFailureReason::InputMissing { .. } => HealingState::NoPageSource,
                    _ => HealingState::NoCandidates,
                };
                return HealingResult::failed(failure, state, reason);
            }
        };
        if candidates.is_empty() {
            return HealingResult::failed(
                failure,
                HealingState::NoCandidates,
                HealFailureReason::no_candidates("No alternative selectors found"),
            );
        }
        let candidate_count = candidates.len();

        let context = MatchContext::screen(failure.test_name.clone());
        let best = self
            .inner
            .matcher
            .find_best_match(candidates.as_slice(), None, Some(&context))
            .await;
        let Some(best) = best else {
            return HealingResult::failed(
                failure,
                HealingState::NoSuitableMatch,
                HealFailureReason::no_candidates("No suitable match found"),
            )
            .with_candidates(candidate_count);
        };

        let threshold = self.inner.config.min_confidence;
        if !validate_match(&best, threshold) {
            info!(
                confidence = best.combined_confidence,
                threshold, "best match below threshold"
            );
            return HealingResult::failed(
                failure,
                HealingState::RejectedLowConfidence,
                HealFailureReason::LowConfidence {
                    confidence: best.combined_confidence,
                    threshold,
                },
            )
            .with_candidates(candidate_count)
            .with_match(best);
        }

        if dry_run {
            info!(new = %best.selector.selector, confidence = best.combined_confidence, "dry run match");
            return HealingResult {
                failure,
                candidate_count,
                best_match: Some(best),
                update: None,
                success: true,
                state: HealingState::Matched,
                reason: None,
            };
        }

        let Some(definition) = failure.definition.clone() else {
            return HealingResult::failed(
                failure,
                HealingState::ApplyFailed,
                HealFailureReason::input_missing("No locator definition file recorded"),
            )
            .with_candidates(candidate_count)
            .with_match(best);
        };

        let request = UpdateRequest {
            file: self.resolve(&definition.file),
            symbol: definition.symbol.clone(),
            old: failure.selector.clone(),
            new: best.selector.selector.clone(),
            confidence: best.combined_confidence,
        };
        let updater = self.inner.updater.clone();
        let update = match tokio::task::spawn_blocking(move || updater.update(&request)).await {
            Ok(update) => update,
            Err(err) => {
                return HealingResult::failed(
                    failure,
                    HealingState::ApplyFailed,
                    HealFailureReason::file_io(format!("update task aborted: {err}")),
                )
                .with_candidates(candidate_count)
                .with_match(best);
            }
        };

        let (state, reason) = if update.success {
            (HealingState::Applied, None)
        } else {
            (HealingState::ApplyFailed, update.error.clone())
        };
        HealingResult {
            failure,
            candidate_count,
            best_match: Some(best),
            success: update.success,
            update: Some(update),
            state,
            reason,
        }
    }

    async fn discover(
        &self,
        snapshot: PathBuf,
        failure: &SelectorFailure,
    ) -> Result<CandidateSet, HealFailureReason> {
        let discovery = self.inner.discovery.clone();
        let failing = failure.selector.clone();
        let outcome =
            tokio::task::spawn_blocking(move || discovery.discover_from_path(&snapshot, &failing))
                .await;
        match outcome {
            Ok(Ok(candidates)) => Ok(candidates),
            Ok(Err(err)) => {
                warn!(error = %err, "discovery failed");
                Err(err.reason())
            }
            Err(err) => Err(HealFailureReason::no_candidates(format!(
                "discovery task aborted: {err}"
            ))),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.inner.repo_root.join(path)
        }
    }

    /// Heal every failure with at most `workers` in flight.
    ///
    /// Results keep the input order. With `auto_commit` (and not a dry run), patched files
    /// are committed once every heal has finished and the history file is appended.
    pub async fn heal_all(
        &self,
        failures: &[SelectorFailure],
        dry_run: bool,
        auto_commit: bool,
    ) -> HealingBatch {
        let slots = Arc::new(Semaphore::new(self.inner.config.workers.max(1)));
        let mut handles = Vec::with_capacity(failures.len());
        for failure in failures {
            let orchestrator = self.clone();
            let slots = Arc::clone(&slots);
            let failure = failure.clone();
            handles.push(tokio::spawn(async move {
                let _permit = slots.acquire_owned().await.ok();
                orchestrator.heal_failure(&failure, dry_run).await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (handle, failure) in handles.into_iter().zip(failures) {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => HealingResult::failed(
                    failure.clone(),
                    HealingState::ApplyFailed,
                    HealFailureReason::file_io(format!("healing task aborted: {err}")),
                ),
            };
            results.push(result);
        }

        let mut batch = HealingBatch {
            results,
            ..HealingBatch::default()
        };
        info!(
            total = batch.results.len(),
            healed = batch.healed(),
            dry_run,
            "healing run finished"
        );

        if auto_commit && !dry_run {
            self.record_and_commit(&mut batch).await;
        }
        batch
    }

    async fn record_and_commit(&self, batch: &mut HealingBatch) {
        let applied: Vec<&HealingResult> = batch
            .results
            .iter()
            .filter(|r| r.patched_file().is_some())
            .collect();
        if applied.is_empty() {
            debug!("nothing to commit");
            return;
        }

        let mut files: Vec<PathBuf> = Vec::new();
        for result in &applied {
            if let Some(file) = result.patched_file() {
                if !files.contains(file) {
                    files.push(file.clone());
                }
            }
        }
        let now = Utc::now();
        let entries: Vec<HistoryEntry> = applied
            .iter()
            .filter_map(|r| HistoryEntry::from_result(r, now))
            .collect();
        let message = commit_message(&self.inner.config.commit.message_prefix, &applied);
        let selectors_healed = applied.len();

        let repo_root = self.inner.repo_root.clone();
        let history_path = self.resolve(&self.inner.config.history_path);
        let commit_config = self.inner.config.commit.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let history = append_history(&history_path, &entries).map(|_| history_path);
            let commit = commit_files(&repo_root, &files, &message, selectors_healed, &commit_config);
            (history, commit)
        })
        .await;

        match outcome {
            Ok((history, commit)) => {
                match history {
                    Ok(path) => batch.history_path = Some(path),
                    Err(err) => warn!(error = %err, "healing history not saved"),
                }
                match commit {
                    Ok(info) => batch.commit = Some(info),
                    Err(err) => {
                        warn!(error = %err, "healing commit failed");
                        batch.commit_error = Some(err.reason());
                    }
                }
            }
            Err(err) => {
                batch.commit_error = Some(HealFailureReason::version_control(format!(
                    "commit task aborted: {err}"
                )));
            }
        }
    }
}
