//! Selector stability scoring
//!
//! Rates how likely a locator is to survive UI changes:
//! - developer-assigned identifiers score highest
//! - visible text is fair, and penalised when it looks generated
//! - structural paths start low and are adjusted by shape, capped at 0.8

pub mod path;
pub mod scorer;
pub mod stability;

pub use scorer::{SelectorDescription, SelectorScorer, DEFAULT_MAX_FALLBACKS};
pub use stability::StabilityLevel;
