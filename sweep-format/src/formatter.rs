//! The formatting-tool interface.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::InvokeError;

/// What the tool reported about a batch beyond exit status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatterRun {
    /// Files the tool could not process, keyed by repository-relative path.
    pub failures: BTreeMap<String, String>,
}

/// A code formatter invoked once per batch.
///
/// Implementations rewrite files in place. Whether a file changed is decided
/// by the invoker from content fingerprints, not by the tool.
pub trait Formatter {
    /// Short name for logs and error messages.
    fn name(&self) -> &str;

    /// Format every path in `paths` (relative to `root`) in one invocation.
    ///
    /// Returns `Err` only when the tool itself is unusable; a file the tool
    /// cannot handle goes into [`FormatterRun::failures`].
    fn format(&self, root: &Path, paths: &[String]) -> Result<FormatterRun, InvokeError>;
}
