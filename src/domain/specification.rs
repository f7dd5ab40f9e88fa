//! Specification text as resolved from a locator.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Text of a specification at the moment it was read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationText {
    /// URL or filesystem path the text was read from
    pub locator: String,
    pub text: String,
    /// SHA256 of the text, for drift detection between reads
    pub digest: String,
}

impl SpecificationText {
    pub fn new(locator: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let digest = compute_digest(text.as_bytes());
        Self {
            locator: locator.into(),
            text,
            digest,
        }
    }
}

/// Compute SHA256 of a byte slice as "sha256:<hex>"
pub fn compute_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
