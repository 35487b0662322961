//! # sweep-format
//!
//! Batch formatter invocation, outcome classification, and reporting.
//!
//! Call [`pipeline::run`] for one full pass (scan → select → format → report)
//! or [`pipeline::plan`] to stop after selection.

pub mod command;
pub mod error;
pub mod fingerprint;
pub mod formatter;
pub mod invoker;
pub mod pipeline;
pub mod report;

pub use command::CommandFormatter;
pub use error::{InvokeError, PipelineError};
pub use formatter::{Formatter, FormatterRun};
pub use invoker::invoke;
pub use pipeline::{PassResult, Plan};
pub use report::{report, Outputs};
