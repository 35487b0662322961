//! Sweep core library: domain types, ignore patterns, selection, config.
//!
//! Public API surface:
//! - [`types`]: tracked files, selections, outcomes, reports
//! - [`patterns`]: compiled ignore-pattern set
//! - [`selector`]: least-recently-modified batch selection
//! - [`config`]: `.sweep.yaml` loading
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod patterns;
pub mod selector;
pub mod types;

pub use config::{FormatterConfig, IgnoreList, SweepConfig};
pub use error::ConfigError;
pub use patterns::{IgnorePattern, IgnoreSet};
pub use selector::{select, SelectionCriteria};
pub use types::{
    Degraded, FormatOutcome, Outcomes, Recency, Report, RunStatus, Selection, TrackedFile,
};
