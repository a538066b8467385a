//! Failure analysis
//!
//! Turns a test report (XML suites or a plain text log) into the list of failures caused
//! by a stale locator, then links each failure to its screenshot, UI snapshot and the
//! source file declaring the locator.

pub mod analyzer;
pub mod enrich;
pub mod errors;
pub mod patterns;
pub mod report;

pub use analyzer::{FailureAnalyzer, MAX_ERROR_CHARS};
pub use enrich::locate_definition;
pub use errors::AnalyzerError;
pub use patterns::{classify_failure_kind, extract_selector, is_selector_failure};
pub use report::generate_report;
