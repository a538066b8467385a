//! Healing orchestrator
//!
//! Composes discovery, matching and file updates into one healing run. Each failure moves
//! through a small state machine; the confidence gate is the only path to a file patch.
//! Batches run with bounded parallelism and may end in a single git commit.

pub mod config;
pub mod errors;
pub mod history;
pub mod orchestrator;
pub mod report;
pub mod result;
pub mod vcs;

pub use config::{CommitConfig, HealingConfig};
pub use errors::{HistoryError, VcsError};
pub use history::{append_history, load_history, HistoryEntry};
pub use orchestrator::HealingOrchestrator;
pub use report::generate_report;
pub use result::{CommitInfo, HealingBatch, HealingResult, HealingState};
pub use vcs::{commit_files, commit_message};
