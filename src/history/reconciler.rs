//! Two-clock merge of object and mapping audit rows.
//!
//! An association between a work item and its parent has two independently
//! versioned row families: the work item's own fields (object) and the
//! association row's fields (mapping). The combined timeline walks both
//! families in timestamp order, keeping one monotonic clock per family,
//! and emits a step whenever either clock advances. Each step is then
//! reduced to the fields that changed since the previous step.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{CombinedHistoryEntry, CompoundVersion, Fields, HistoryRow, RowFamily};

/// Columns that only record versioning and never show up in snapshots
pub const BOOKKEEPING_FIELDS: [&str; 4] = ["row_id", "version", "created_at", "updated_at"];

/// A row tagged with its family
#[derive(Debug, Clone, Copy)]
struct TaggedRow<'a> {
    family: RowFamily,
    row: &'a HistoryRow,
}

/// Last emitted version of each family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Clocks {
    object: u32,
    mapping: Option<u32>,
}

impl Clocks {
    /// Advance the clock of `family` to `version` if it moves forward
    fn advance(self, family: RowFamily, version: u32) -> Option<Clocks> {
        match family {
            RowFamily::Object if version > self.object => Some(Clocks {
                object: version,
                ..self
            }),
            RowFamily::Mapping => match self.mapping {
                Some(current) if version > current => Some(Clocks {
                    mapping: Some(version),
                    ..self
                }),
                _ => None,
            },
            _ => None,
        }
    }

    fn version(&self) -> CompoundVersion {
        CompoundVersion::new(self.object, self.mapping)
    }
}

/// A full (unreduced) point of the combined history
#[derive(Debug, Clone)]
struct Step {
    version: CompoundVersion,
    object: Fields,
    mapping: Fields,
    created_at: DateTime<Utc>,
}

/// Fold state: both clocks plus every step emitted so far
#[derive(Debug)]
struct Timeline {
    clocks: Clocks,
    steps: Vec<Step>,
}

impl Timeline {
    fn advance(mut self, tagged: &TaggedRow<'_>, reconciler: &HistoryReconciler) -> Timeline {
        let Some(clocks) = self.clocks.advance(tagged.family, tagged.row.version) else {
            return self;
        };
        let Some(last) = self.steps.last() else {
            return self;
        };

        let snapshot = reconciler.snapshot(tagged.row);
        let (object, mapping) = match tagged.family {
            RowFamily::Object => (snapshot, last.mapping.clone()),
            RowFamily::Mapping => (last.object.clone(), snapshot),
        };

        self.steps.push(Step {
            version: clocks.version(),
            object,
            mapping,
            created_at: tagged.row.created_at,
        });
        self.clocks = clocks;
        self
    }
}

/// Builds combined, diff-reduced history timelines
#[derive(Debug, Clone)]
pub struct HistoryReconciler {
    ignored_fields: BTreeSet<String>,
}

impl Default for HistoryReconciler {
    fn default() -> Self {
        Self {
            ignored_fields: BOOKKEEPING_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl HistoryReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave a column out of every snapshot (e.g. `coverage` on justification mappings)
    pub fn ignore_field(mut self, name: impl Into<String>) -> Self {
        self.ignored_fields.insert(name.into());
        self
    }

    pub fn ignore_fields<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |r, name| r.ignore_field(name))
    }

    fn snapshot(&self, row: &HistoryRow) -> Fields {
        row.fields
            .iter()
            .filter(|(name, _)| !self.ignored_fields.contains(name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Merge object and mapping rows into a reverse-chronological timeline.
    ///
    /// With no mapping rows the version labels have no mapping component.
    /// A history without a version-1 seed in every present family yields an
    /// empty timeline.
    pub fn reconcile(
        &self,
        object_rows: &[HistoryRow],
        mapping_rows: &[HistoryRow],
    ) -> Vec<CombinedHistoryEntry> {
        let mut merged: Vec<TaggedRow<'_>> = object_rows
            .iter()
            .map(|row| TaggedRow {
                family: RowFamily::Object,
                row,
            })
            .chain(mapping_rows.iter().map(|row| TaggedRow {
                family: RowFamily::Mapping,
                row,
            }))
            .collect();
        // Stable sort; on equal timestamps object rows come first
        merged.sort_by_key(|tagged| (tagged.row.created_at, tagged.family));

        let seed_of = |family: RowFamily| {
            merged
                .iter()
                .find(|tagged| tagged.family == family && tagged.row.version == 1)
                .map(|tagged| tagged.row)
        };

        let Some(object_seed) = seed_of(RowFamily::Object) else {
            debug!("History has no object version 1, returning empty timeline");
            return Vec::new();
        };
        let mapping_seed = if mapping_rows.is_empty() {
            None
        } else {
            match seed_of(RowFamily::Mapping) {
                Some(seed) => Some(seed),
                None => {
                    debug!("History has no mapping version 1, returning empty timeline");
                    return Vec::new();
                }
            }
        };

        let clocks = Clocks {
            object: 1,
            mapping: mapping_seed.map(|_| 1),
        };
        let seed = Step {
            version: clocks.version(),
            object: self.snapshot(object_seed),
            mapping: mapping_seed.map(|row| self.snapshot(row)).unwrap_or_default(),
            created_at: mapping_seed
                .map(|row| row.created_at.max(object_seed.created_at))
                .unwrap_or(object_seed.created_at),
        };

        let timeline = merged.iter().fold(
            Timeline {
                clocks,
                steps: vec![seed],
            },
            |timeline, tagged| timeline.advance(tagged, self),
        );

        let mut entries = reduce(&timeline.steps);
        entries.reverse();
        debug!(entries = entries.len(), "Reconciled history");
        entries
    }
}

/// Merge object and mapping rows with the default field exclusions
pub fn reconcile_history(
    object_rows: &[HistoryRow],
    mapping_rows: &[HistoryRow],
) -> Vec<CombinedHistoryEntry> {
    HistoryReconciler::default().reconcile(object_rows, mapping_rows)
}

/// Fields of `current` whose value differs from `previous`
fn changed_fields(previous: &Fields, current: &Fields) -> Fields {
    current
        .iter()
        .filter(|(name, value)| previous.get(name.as_str()) != Some(*value))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Keep every field of the first step; afterwards keep only what changed,
/// and only for the family whose version moved
fn reduce(steps: &[Step]) -> Vec<CombinedHistoryEntry> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let (object, mapping) = match i.checked_sub(1).and_then(|p| steps.get(p)) {
                None => (step.object.clone(), step.mapping.clone()),
                Some(previous) => {
                    let object = if previous.version.object != step.version.object {
                        changed_fields(&previous.object, &step.object)
                    } else {
                        Fields::new()
                    };
                    let mapping = if previous.version.mapping != step.version.mapping {
                        changed_fields(&previous.mapping, &step.mapping)
                    } else {
                        Fields::new()
                    };
                    (object, mapping)
                }
            };

            CombinedHistoryEntry {
                version: step.version,
                object,
                mapping,
                created_at: step.created_at,
            }
        })
        .collect()
}
