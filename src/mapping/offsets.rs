//! Offset reconciliation against a new revision of a specification.
//!
//! When the specification text changes, every stored annotation is checked
//! against the new text:
//! - **OK**: its section is first found exactly at its stored offset
//! - **WARNING**: its section is found, but first at another offset
//! - **KO**: its section no longer occurs anywhere
//!
//! Only exact substring re-occurrence is attempted. WARNING entries carry the
//! suggested offset and can be applied through an [`OffsetStore`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Annotation, WorkItemKind};

/// Classification of one annotation against a text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetStatus {
    Ok,
    Warning { new_offset: usize },
    Ko,
}

/// Classify a single annotation against `text`
pub fn classify(text: &str, annotation: &Annotation) -> OffsetStatus {
    match text.find(annotation.section.as_str()) {
        None => OffsetStatus::Ko,
        Some(first) if first == annotation.offset => OffsetStatus::Ok,
        Some(first) => OffsetStatus::Warning { new_offset: first },
    }
}

/// An annotation that is either in place or lost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetEntry {
    pub id: i64,
    pub kind: WorkItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// An annotation whose section moved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetWarning {
    pub id: i64,
    pub kind: WorkItemKind,
    #[serde(rename = "old-offset")]
    pub old_offset: usize,
    #[serde(rename = "new-offset")]
    pub new_offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Result of reconciling a set of annotations against a text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetReport {
    pub ok: Vec<OffsetEntry>,
    pub warning: Vec<OffsetWarning>,
    pub ko: Vec<OffsetEntry>,
}

impl OffsetReport {
    /// True when nothing moved and nothing was lost
    pub fn is_clean(&self) -> bool {
        self.warning.is_empty() && self.ko.is_empty()
    }

    /// Split the report into one report per work item kind
    pub fn by_kind(&self) -> BTreeMap<WorkItemKind, OffsetReport> {
        let mut grouped: BTreeMap<WorkItemKind, OffsetReport> = BTreeMap::new();
        for entry in &self.ok {
            grouped.entry(entry.kind).or_default().ok.push(entry.clone());
        }
        for warning in &self.warning {
            grouped
                .entry(warning.kind)
                .or_default()
                .warning
                .push(warning.clone());
        }
        for entry in &self.ko {
            grouped.entry(entry.kind).or_default().ko.push(entry.clone());
        }
        grouped
    }
}

/// Classify every annotation against `new_text`
pub fn reconcile_offsets<'a, I>(new_text: &str, annotations: I) -> OffsetReport
where
    I: IntoIterator<Item = &'a Annotation>,
{
    let mut report = OffsetReport::default();

    for annotation in annotations {
        let entry = || OffsetEntry {
            id: annotation.relation_id,
            kind: annotation.kind,
            title: annotation.title.clone(),
        };

        match classify(new_text, annotation) {
            OffsetStatus::Ok => report.ok.push(entry()),
            OffsetStatus::Ko => report.ko.push(entry()),
            OffsetStatus::Warning { new_offset } => report.warning.push(OffsetWarning {
                id: annotation.relation_id,
                kind: annotation.kind,
                old_offset: annotation.offset,
                new_offset,
                title: annotation.title.clone(),
            }),
        }
    }

    debug!(
        ok = report.ok.len(),
        warning = report.warning.len(),
        ko = report.ko.len(),
        "Reconciled offsets"
    );
    report
}

/// Persistence for annotation offsets
pub trait OffsetStore {
    /// Overwrite the stored offset of one annotation.
    ///
    /// Returns `false` when no such annotation exists.
    fn set_offset(&mut self, kind: WorkItemKind, id: i64, offset: usize) -> anyhow::Result<bool>;
}

impl OffsetStore for Vec<Annotation> {
    fn set_offset(&mut self, kind: WorkItemKind, id: i64, offset: usize) -> anyhow::Result<bool> {
        match self
            .iter_mut()
            .find(|a| a.kind == kind && a.relation_id == id)
        {
            Some(annotation) => {
                annotation.offset = offset;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Apply every WARNING in `report` to `store`.
///
/// Returns the number of annotations updated.
pub fn apply_fixups<S: OffsetStore + ?Sized>(
    report: &OffsetReport,
    store: &mut S,
) -> anyhow::Result<usize> {
    let mut applied = 0;
    for warning in &report.warning {
        if store.set_offset(warning.kind, warning.id, warning.new_offset)? {
            applied += 1;
        } else {
            debug!(id = warning.id, kind = %warning.kind, "Annotation vanished before fixup");
        }
    }

    info!(applied, "Applied offset fixups");
    Ok(applied)
}
