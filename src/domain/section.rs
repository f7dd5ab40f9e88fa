//! Derived sections of a specification text.

use serde::{Deserialize, Serialize};

use super::{Attachments, Range};

/// A disjoint fragment of specification text with the annotations covering it.
///
/// Sections are computed at read time and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub text: String,
    pub offset: usize,
    /// Sum of attached coverage, clamped to [0, 100]
    pub coverage: u32,
    pub attached: Attachments,
}

impl Section {
    pub fn range(&self) -> Range {
        Range::new(self.offset, self.text.len())
    }
}
