//! Tapmend
//!
//! Self-healing selector repair for mobile UI tests. A healing run reads a test report,
//! keeps the failures caused by stale locators, rediscovers replacement selectors from the
//! captured UI snapshot, and rewrites the locator definitions that clear the confidence gate.

pub mod config;
pub mod pipeline;
pub mod telemetry;

pub use config::{load_config, ConfigError};
pub use pipeline::{analyze_failures, run_healing, HealingInputs, HealingOutcome};
pub use telemetry::{init_tracing, run_span};

// Re-export the pipeline crates for callers that drive stages directly
pub use element_matcher::{ConfidenceSignal, ElementMatcher, MatchResult, NoopSignal};
pub use failure_analyzer::FailureAnalyzer;
pub use file_updater::{FileUpdater, UpdateRequest, UpdateResult};
pub use heal_orchestrator::{
    generate_report, CommitConfig, HealingBatch, HealingConfig, HealingOrchestrator,
    HealingResult, HealingState,
};
pub use selector_discovery::{DiscoveryLimits, SelectorDiscovery, StructuralPathMode};
pub use selector_scorer::{SelectorScorer, StabilityLevel};
pub use tapmend_core_types::{
    AlternativeSelector, HealFailureReason, Selector, SelectorFailure, SelectorStrategy,
    TapmendError,
};
