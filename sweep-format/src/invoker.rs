//! Formatter invoker — one batch call, fingerprint-based classification.
//!
//! ## Protocol
//!
//! 1. Read and fingerprint every selected file. Unreadable files fail
//!    individually and are left out of the batch.
//! 2. Run the formatter once over the remaining files.
//! 3. Files the tool reported as failed become `Failed(reason)`. If the tool
//!    left a partial rewrite behind, the original bytes are written back.
//! 4. Re-fingerprint the rest: digest changed → `Modified`, else `Unchanged`.
//!
//! A tool-level error aborts with no outcomes at all.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use sweep_core::types::{FormatOutcome, Outcomes, Selection};

use crate::error::InvokeError;
use crate::fingerprint::{fingerprint_bytes, fingerprint_file};
use crate::formatter::Formatter;

/// Format `selection` in one batch and classify each file.
pub fn invoke(
    root: &Path,
    selection: &Selection,
    formatter: &dyn Formatter,
) -> Result<Outcomes, InvokeError> {
    let mut outcomes = Outcomes::new();
    if selection.is_empty() {
        debug!("empty selection; formatter not invoked");
        return Ok(outcomes);
    }

    let mut before: BTreeMap<String, Snapshot> = BTreeMap::new();
    let mut batch: Vec<String> = Vec::with_capacity(selection.len());
    for path in selection.paths() {
        match std::fs::read(root.join(path)) {
            Ok(bytes) => {
                let digest = fingerprint_bytes(&bytes);
                before.insert(path.to_string(), Snapshot { digest, bytes });
                batch.push(path.to_string());
            }
            Err(err) => {
                warn!(path, error = %err, "cannot read selected file");
                outcomes.insert(path.to_string(), FormatOutcome::Failed(format!("unreadable: {err}")));
            }
        }
    }
    if batch.is_empty() {
        return Ok(outcomes);
    }

    info!(files = batch.len(), formatter = formatter.name(), "invoking formatter");
    let run = formatter.format(root, &batch)?;

    for path in batch {
        if let Some(reason) = run.failures.get(&path) {
            warn!(path = %path, reason = %reason, "formatter could not process file");
            let reason = match before.get(&path) {
                Some(prior) => restore_if_changed(root, &path, prior, reason),
                None => reason.clone(),
            };
            outcomes.insert(path, FormatOutcome::Failed(reason));
            continue;
        }
        let outcome = match (fingerprint_file(root, &path), before.get(&path)) {
            (Ok(after), Some(prior)) if after == prior.digest => FormatOutcome::Unchanged,
            (Ok(_), _) => FormatOutcome::Modified,
            (Err(err), _) => FormatOutcome::Failed(format!("unreadable after formatting: {err}")),
        };
        debug!(path = %path, outcome = ?outcome, "classified");
        outcomes.insert(path, outcome);
    }
    Ok(outcomes)
}

/// File content as it was before the formatter ran.
struct Snapshot {
    digest: String,
    bytes: Vec<u8>,
}

/// Put back the original bytes of a failed file the tool still rewrote.
/// Returns the reason to report, extended if the restore itself failed.
fn restore_if_changed(root: &Path, path: &str, prior: &Snapshot, reason: &str) -> String {
    if fingerprint_file(root, path).is_ok_and(|after| after == prior.digest) {
        return reason.to_string();
    }
    warn!(path, "restoring original content of failed file");
    match std::fs::write(root.join(path), &prior.bytes) {
        Ok(()) => reason.to_string(),
        Err(err) => {
            warn!(path, error = %err, "cannot restore failed file");
            format!("{reason} (restore failed: {err})")
        }
    }
}
