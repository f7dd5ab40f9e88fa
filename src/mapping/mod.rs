//! Specification mapping.
//!
//! This module contains:
//! - Splitter: disjoint, coverage-annotated partition of a specification
//! - Coverage: overall coverage of a partition
//! - Offsets: reconciliation of stored offsets against a new text
//! - View: the full mapping read (match predicate, unmapped list, placeholder)
//!
//! Everything here is a pure transformation over its inputs; fetching the
//! text and persisting offsets belong to the callers.

pub mod coverage;
pub mod offsets;
pub mod splitter;
pub mod view;

// Re-export commonly used types
pub use coverage::aggregate_coverage;
pub use offsets::{
    apply_fixups, classify, reconcile_offsets, OffsetEntry, OffsetReport, OffsetStatus,
    OffsetStore, OffsetWarning,
};
pub use splitter::split_sections;
pub use view::{build_mapping_view, MappingView, DEFAULT_PLACEHOLDER};
