//! Work-item annotations bound to ranges of a specification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Range;

/// Kind of work item an annotation references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    Justification,
    Requirement,
    TestSpecification,
    TestCase,
}

impl WorkItemKind {
    /// Every kind, in the default grouping order
    pub const ALL: [WorkItemKind; 4] = [
        WorkItemKind::Requirement,
        WorkItemKind::Justification,
        WorkItemKind::TestSpecification,
        WorkItemKind::TestCase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkItemKind::Justification => "justification",
            WorkItemKind::Requirement => "requirement",
            WorkItemKind::TestSpecification => "test_specification",
            WorkItemKind::TestCase => "test_case",
        }
    }
}

impl std::fmt::Display for WorkItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "justification" => Ok(WorkItemKind::Justification),
            "requirement" | "sw_requirement" => Ok(WorkItemKind::Requirement),
            "test_specification" => Ok(WorkItemKind::TestSpecification),
            "test_case" => Ok(WorkItemKind::TestCase),
            other => Err(format!("unknown work item kind: {}", other)),
        }
    }
}

/// A stored binding of a work item to a range of the specification text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Id of the association row (the relation between the specification and the work item)
    pub relation_id: i64,

    /// Kind of the referenced work item
    pub kind: WorkItemKind,

    /// Title of the referenced work item, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Verbatim text the annotation was created against
    pub section: String,

    /// Byte offset of `section` in the specification
    pub offset: usize,

    /// Coverage percentage contributed by this work item
    #[serde(default)]
    pub coverage: u32,

    /// Version of the association row
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    1
}

impl Annotation {
    pub fn new(
        relation_id: i64,
        kind: WorkItemKind,
        section: impl Into<String>,
        offset: usize,
        coverage: u32,
    ) -> Self {
        Self {
            relation_id,
            kind,
            title: None,
            section: section.into(),
            offset,
            coverage,
            version: 1,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn range(&self) -> Range {
        Range::new(self.offset, self.section.len())
    }

    /// The `match` predicate: the stored section still equals the live text at the stored offset.
    ///
    /// Recomputed on every read, never stored.
    pub fn matches(&self, text: &str) -> bool {
        self.range().slice(text) == Some(self.section.as_str())
    }
}

/// The annotations of one kind handed to the splitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationGroup {
    pub kind: WorkItemKind,
    pub annotations: Vec<Annotation>,
}

impl AnnotationGroup {
    pub fn new(kind: WorkItemKind, annotations: Vec<Annotation>) -> Self {
        Self { kind, annotations }
    }

    /// Group annotations by kind, following the order of `kinds`.
    ///
    /// Annotations whose kind is not listed are left out. Each group is sorted
    /// by offset.
    pub fn from_annotations<'a, I>(kinds: &[WorkItemKind], annotations: I) -> Vec<AnnotationGroup>
    where
        I: IntoIterator<Item = &'a Annotation>,
    {
        let mut by_kind: BTreeMap<WorkItemKind, Vec<Annotation>> = BTreeMap::new();
        for annotation in annotations {
            by_kind
                .entry(annotation.kind)
                .or_default()
                .push(annotation.clone());
        }

        let mut seen = Vec::new();
        let mut groups = Vec::new();
        for kind in kinds {
            if seen.contains(kind) {
                continue;
            }
            seen.push(*kind);
            let mut annotations = by_kind.remove(kind).unwrap_or_default();
            annotations.sort_by_key(|a| a.offset);
            groups.push(AnnotationGroup::new(*kind, annotations));
        }
        groups
    }
}

/// Annotations attached to a section, keyed by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attachments(BTreeMap<WorkItemKind, Vec<Annotation>>);

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.0.entry(annotation.kind).or_default().push(annotation);
    }

    /// Annotations of one kind, in attachment order
    pub fn of_kind(&self, kind: WorkItemKind) -> &[Annotation] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of attached annotations across all kinds
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.values().flatten()
    }

    /// Sum of coverage over every attached annotation
    pub fn coverage_sum(&self) -> u64 {
        self.iter().map(|a| u64::from(a.coverage)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_live_text() {
        let text = "The quick brown fox";
        assert!(Annotation::new(1, WorkItemKind::Requirement, "quick", 4, 50).matches(text));
        assert!(!Annotation::new(2, WorkItemKind::Requirement, "quick", 5, 50).matches(text));
        assert!(!Annotation::new(3, WorkItemKind::Requirement, "fox jumps", 16, 50).matches(text));
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&WorkItemKind::TestSpecification).unwrap();
        assert_eq!(json, "\"test_specification\"");
        assert_eq!("sw-requirement".parse::<WorkItemKind>(), Ok(WorkItemKind::Requirement));
        assert!("widget".parse::<WorkItemKind>().is_err());
    }

    #[test]
    fn test_groups_follow_kind_order() {
        let annotations = vec![
            Annotation::new(1, WorkItemKind::Justification, "b", 10, 0),
            Annotation::new(2, WorkItemKind::Requirement, "a", 8, 0),
            Annotation::new(3, WorkItemKind::Requirement, "c", 2, 0),
            Annotation::new(4, WorkItemKind::TestCase, "d", 0, 0),
        ];
        let groups = AnnotationGroup::from_annotations(
            &[WorkItemKind::Requirement, WorkItemKind::Justification],
            &annotations,
        );

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].kind, WorkItemKind::Requirement);
        let offsets: Vec<usize> = groups[0].annotations.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![2, 8]);
        assert_eq!(groups[1].kind, WorkItemKind::Justification);
    }

    #[test]
    fn test_attachments_serialize_by_kind() {
        let mut attachments = Attachments::new();
        attachments.push(Annotation::new(1, WorkItemKind::TestCase, "x", 0, 30));
        attachments.push(Annotation::new(2, WorkItemKind::TestCase, "x", 0, 40));

        assert_eq!(attachments.total(), 2);
        assert_eq!(attachments.coverage_sum(), 70);
        assert!(attachments.of_kind(WorkItemKind::Requirement).is_empty());

        let value = serde_json::to_value(&attachments).unwrap();
        assert_eq!(value["test_case"].as_array().unwrap().len(), 2);
    }
}
