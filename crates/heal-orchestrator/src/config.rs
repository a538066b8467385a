use std::path::PathBuf;
use std::time::Duration;

use selector_discovery::DiscoveryLimits;
use serde::{Deserialize, Serialize};

/// Healing run configuration, passed explicitly to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealingConfig {
    /// Minimum combined confidence a match needs before it is applied
    pub min_confidence: f64,
    pub create_backup: bool,
    /// Failures healed concurrently
    pub workers: usize,
    pub discovery: DiscoveryLimits,
    pub signal_timeout_ms: u64,
    /// Healing history file, relative to the repository root unless absolute
    pub history_path: PathBuf,
    pub commit: CommitConfig,
}

impl Default for HealingConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.7,
            create_backup: true,
            workers: 4,
            discovery: DiscoveryLimits::default(),
            signal_timeout_ms: 2_000,
            history_path: PathBuf::from(".tapmend/healing-history.json"),
            commit: CommitConfig::default(),
        }
    }
}

impl HealingConfig {
    pub fn signal_timeout(&self) -> Duration {
        Duration::from_millis(self.signal_timeout_ms)
    }
}

/// Identity and target of the healing commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    pub author_name: String,
    pub author_email: String,
    /// Commit onto this branch, created at HEAD when missing
    pub branch: Option<String>,
    pub message_prefix: String,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            author_name: "tapmend".to_string(),
            author_email: "tapmend@localhost".to_string(),
            branch: None,
            message_prefix: "Auto-heal".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HealingConfig::default();
        assert_eq!(config.min_confidence, 0.7);
        assert!(config.create_backup);
        assert_eq!(config.workers, 4);
        assert_eq!(config.signal_timeout(), Duration::from_secs(2));
        assert!(config.commit.branch.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: HealingConfig =
            serde_json::from_str(r#"{"min_confidence": 0.8, "commit": {"branch": "heal"}}"#).unwrap();
        assert_eq!(config.min_confidence, 0.8);
        assert_eq!(config.workers, 4);
        assert_eq!(config.commit.branch.as_deref(), Some("heal"));
        assert_eq!(config.commit.author_name, "tapmend");
    }
}
