//! End-to-end healing run: analyze a report, heal, and render the summary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use element_matcher::ConfidenceSignal;
use failure_analyzer::FailureAnalyzer;
use heal_orchestrator::{generate_report, HealingBatch, HealingConfig, HealingOrchestrator};
use serde::{Deserialize, Serialize};
use tapmend_core_types::{RunId, SelectorFailure};
use tracing::{info, Instrument};

use crate::telemetry::run_span;

/// Where the run reads its inputs from and what it may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealingInputs {
    /// Test report, XML or plain text log
    pub report: PathBuf,
    /// Repository root; relative definition and history paths resolve against it
    pub repo_root: PathBuf,
    pub screenshots_dir: Option<PathBuf>,
    pub page_source_dir: Option<PathBuf>,
    /// Page-object sources searched for locator definitions
    pub page_objects_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub auto_commit: bool,
}

impl HealingInputs {
    pub fn new(report: impl Into<PathBuf>, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            report: report.into(),
            repo_root: repo_root.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealingOutcome {
    pub run_id: RunId,
    pub failures: Vec<SelectorFailure>,
    pub batch: HealingBatch,
    pub report: String,
}

/// Selector failures from the report, linked to whatever artifacts the directories hold.
///
/// Fails only when the report is missing or cannot be parsed at all.
pub fn analyze_failures(inputs: &HealingInputs) -> anyhow::Result<Vec<SelectorFailure>> {
    let analyzer = FailureAnalyzer::new();
    let mut failures = analyzer
        .analyze_path(&inputs.report)
        .with_context(|| format!("analyzing test report {}", inputs.report.display()))?;

    if let Some(dir) = existing(&inputs.screenshots_dir) {
        analyzer.enrich_with_screenshots(&mut failures, dir);
    }
    if let Some(dir) = existing(&inputs.page_source_dir) {
        analyzer.enrich_with_page_source(&mut failures, dir);
    }
    if let Some(dir) = existing(&inputs.page_objects_dir) {
        analyzer.enrich_with_locator_definitions(&mut failures, dir);
    }
    Ok(failures)
}

fn existing(dir: &Option<PathBuf>) -> Option<&Path> {
    dir.as_deref().filter(|d| d.is_dir())
}

/// Analyze, heal every selector failure, and render the healing report.
pub async fn run_healing(
    inputs: &HealingInputs,
    config: HealingConfig,
    signal: Arc<dyn ConfidenceSignal>,
) -> anyhow::Result<HealingOutcome> {
    let run_id = RunId::new();
    let span = run_span(&inputs.report.display().to_string());
    async {
        let owned = inputs.clone();
        let failures = tokio::task::spawn_blocking(move || analyze_failures(&owned))
            .await
            .context("report analysis task aborted")??;
        info!(run = %run_id, failures = failures.len(), "selector failures found");

        let orchestrator = HealingOrchestrator::new(&inputs.repo_root, config, signal);
        let batch = orchestrator
            .heal_all(&failures, inputs.dry_run, inputs.auto_commit)
            .await;
        let report = generate_report(&batch.results);
        info!(
            run = %run_id,
            healed = batch.healed(),
            failed = batch.failed(),
            "healing run complete"
        );

        Ok(HealingOutcome {
            run_id: run_id.clone(),
            failures,
            batch,
            report,
        })
    }
    .instrument(span)
    .await
}
