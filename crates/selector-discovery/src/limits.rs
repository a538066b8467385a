use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How structural path candidates are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralPathMode {
    /// Full ancestor chain with same-tag sibling positions
    #[default]
    Ancestry,
    /// Element tag only, without ancestors
    Flat,
}

/// Bounds applied while parsing one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryLimits {
    pub max_snapshot_bytes: u64,
    pub max_elements: usize,
    pub max_depth: usize,
    pub timeout_ms: u64,
    pub structural_path: StructuralPathMode,
}

impl Default for DiscoveryLimits {
    fn default() -> Self {
        Self {
            max_snapshot_bytes: 16 * 1024 * 1024,
            max_elements: 50_000,
            max_depth: 256,
            timeout_ms: 5_000,
            structural_path: StructuralPathMode::Ancestry,
        }
    }
}

impl DiscoveryLimits {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
