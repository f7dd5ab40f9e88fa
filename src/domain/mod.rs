//! Domain types for specification mapping.
//!
//! This module contains the core data structures:
//! - Range: half-open byte ranges over a text
//! - Annotation: work items bound to a range
//! - Section: derived, disjoint fragments of a specification
//! - History: audit rows and combined history entries

pub mod annotation;
pub mod history;
pub mod range;
pub mod section;
pub mod specification;

// Re-export commonly used types
pub use annotation::{Annotation, AnnotationGroup, Attachments, WorkItemKind};
pub use history::{
    CombinedHistoryEntry, CompoundVersion, Fields, HistoryRow, RowFamily, VersionParseError,
};
pub use range::Range;
pub use section::Section;
pub use specification::{compute_digest, SpecificationText};
