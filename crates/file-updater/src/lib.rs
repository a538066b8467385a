//! File updater
//!
//! Rewrites a single locator definition in a page-object source file. The definition is
//! anchored on its symbol and old value, the original file is backed up first, and the
//! patch carries an audit comment plus the old selector as a fallback comment.

pub mod backup;
pub mod errors;
pub mod locks;
pub mod syntax;
pub mod updater;

pub use backup::{backup_path_for, original_for_backup, write_atomic};
pub use errors::UpdateError;
pub use locks::PathLocks;
pub use syntax::{LocatorSpan, LocatorSyntax, SyntaxTable};
pub use updater::{FileUpdater, UpdateRequest, UpdateResult};
