//! specmap - Specification mapping and history reconciliation
//!
//! Links a textual specification to requirement, test and justification
//! work items, each bound to a byte range of the specification text.
//!
//! # Architecture
//!
//! The core is a set of pure transformations:
//! - Splitting: a text plus overlapping annotations becomes a disjoint,
//!   coverage-annotated partition
//! - Coverage: one length-weighted percentage for a partition
//! - Offsets: stored annotations are checked against a new revision and
//!   moved when their text moved
//! - History: object and mapping audit rows are merged into one
//!   diff-reduced timeline
//!
//! Fetching text and persisting annotations happen around the core.
//!
//! # Modules
//!
//! - `adapters`: Specification fetching (URL or file path)
//! - `domain`: Data structures (Range, Annotation, Section, HistoryRow)
//! - `mapping`: Splitter, coverage, offset reconciliation, mapping view
//! - `history`: Combined history reconciliation
//! - `store`: JSON file annotation store
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Split a specification into covered sections
//! specmap map api.h --annotations annotations.json
//!
//! # Check annotations against a new revision, then fix moved ones
//! specmap check api.h --annotations annotations.json --against api-v2.h
//! specmap fix api-v2.h --annotations annotations.json
//!
//! # Combined history of an association
//! specmap history --object object_rows.json --mapping mapping_rows.json
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod history;
pub mod mapping;
pub mod store;

// Re-export main types at crate root for convenience
pub use domain::{
    Annotation, AnnotationGroup, CombinedHistoryEntry, CompoundVersion, HistoryRow, Range,
    Section, SpecificationText, WorkItemKind,
};
pub use history::{reconcile_history, HistoryReconciler};
pub use mapping::{
    aggregate_coverage, apply_fixups, build_mapping_view, reconcile_offsets, split_sections,
    MappingView, OffsetReport, OffsetStore,
};
