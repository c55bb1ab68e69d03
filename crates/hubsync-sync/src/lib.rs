//! Repository synchronization check.
//!
//! Answers one question: is a local working copy clean, and does one of its
//! remote-tracking branches already point at the latest commit GitHub reports
//! for a branch?

mod checker;
mod error;
mod local;

pub use checker::{evaluate, SyncChecker, SyncPolicy, SyncReport, DEFAULT_MARKER};
pub use error::{Result, SyncError};
pub use local::{BranchTip, ChangeKind, GitWorkingCopy, StatusEntry, WorkingCopy};
