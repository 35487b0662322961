//! # sweep-renderer
//!
//! Tera-based rendering of a pass [`Report`](sweep_core::Report) into the
//! commit message and pull-request body used by the PR automation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sweep_core::Report;
//! use sweep_renderer::{ReportContext, ReportRenderer, TemplateKind};
//!
//! fn commit_message(report: &Report) -> Option<String> {
//!     let renderer = ReportRenderer::new(None).ok()?;
//!     renderer
//!         .render(TemplateKind::CommitMessage, &ReportContext::from_report(report))
//!         .ok()
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::ReportContext;
pub use engine::{ReportRenderer, TemplateKind};
pub use error::RenderError;
