//! Element matching
//!
//! Blends the heuristic confidence of each discovered selector with an optional learned
//! signal, applies small context boosts, and picks the best candidate. A signal that errors
//! or times out counts as no signal.

pub mod errors;
pub mod matcher;
pub mod signal;

pub use errors::SignalError;
pub use matcher::{validate_match, ElementMatcher, MatchContext, MatchResult};
pub use signal::{ConfidenceSignal, ElementFeatures, NoopSignal, Prediction};
