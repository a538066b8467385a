//! Selector discovery
//!
//! Parses a UI snapshot (Android or iOS dialect) into an element tree and enumerates
//! alternative selectors for every interactive element, ranked by confidence.

pub mod candidates;
pub mod discovery;
pub mod errors;
pub mod limits;
pub mod snapshot;

pub use candidates::CandidateSet;
pub use discovery::{candidates_for_element, is_interactive, SelectorDiscovery};
pub use errors::SnapshotError;
pub use limits::{DiscoveryLimits, StructuralPathMode};
pub use snapshot::{SnapshotNode, UiSnapshot};
