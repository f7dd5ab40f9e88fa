//! Combined version history of an association.
//!
//! Audit rows of a work item and of its association row are merged into a
//! single timeline labelled with `object.mapping` compound versions, most
//! recent first, each entry holding only what changed.

pub mod reconciler;

pub use reconciler::{reconcile_history, HistoryReconciler, BOOKKEEPING_FIELDS};
