//! Content fingerprints — SHA-256 digests of file bytes.
//!
//! Taken before and after the formatter runs; a differing digest is what
//! makes a file `Modified`. Bytes are hashed as-is, so a line-ending rewrite
//! counts as a modification.

use std::path::Path;

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `bytes`.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Fingerprint `<root>/<rel_path>`.
pub fn fingerprint_file(root: &Path, rel_path: &str) -> std::io::Result<String> {
    let bytes = std::fs::read(root.join(rel_path))?;
    Ok(fingerprint_bytes(&bytes))
}
