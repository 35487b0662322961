//! # sweep-history
//!
//! Derives a least-recently-modified ordering over tracked files from
//! revision history.
//!
//! [`scan`] works against any [`HistorySource`]; [`GitHistory`] is the
//! `git`-backed implementation used by the CLI.

pub mod error;
pub mod git;
pub mod scanner;
pub mod source;

pub use error::HistoryError;
pub use git::GitHistory;
pub use scanner::{scan, ScanResult};
pub use source::{CommitTouch, HistorySource};
