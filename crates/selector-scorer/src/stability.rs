use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse stability bands for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityLevel {
    Fragile,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl StabilityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            StabilityLevel::Excellent
        } else if score >= 0.7 {
            StabilityLevel::Good
        } else if score >= 0.5 {
            StabilityLevel::Fair
        } else if score >= 0.3 {
            StabilityLevel::Poor
        } else {
            StabilityLevel::Fragile
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StabilityLevel::Excellent => "excellent",
            StabilityLevel::Good => "good",
            StabilityLevel::Fair => "fair",
            StabilityLevel::Poor => "poor",
            StabilityLevel::Fragile => "fragile",
        }
    }
}

impl fmt::Display for StabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
