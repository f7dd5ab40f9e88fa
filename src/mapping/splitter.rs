//! Overlap-aware interval splitting.
//!
//! Turns a flat specification text plus a set of possibly-overlapping
//! annotations into a disjoint, ordered partition of the text. Each
//! annotation is placed in turn: every section it touches is cut at the
//! annotation's boundaries, and the annotation is attached to every
//! resulting piece it covers.
//!
//! Each placement rebuilds the fragment list from the previous one rather
//! than editing it in place.

use tracing::{debug, error};

use crate::domain::{Annotation, AnnotationGroup, Attachments, Range, Section};

/// A section under construction
#[derive(Debug, Clone)]
struct Fragment {
    range: Range,
    attached: Attachments,
}

impl Fragment {
    fn new(range: Range) -> Self {
        Self {
            range,
            attached: Attachments::new(),
        }
    }

    /// Cut this fragment at the boundaries of `target`, clipped to the fragment.
    ///
    /// Every piece inherits the fragment's attachments.
    fn cut(self, target: Range) -> Vec<Fragment> {
        let mut bounds = vec![
            self.range.start(),
            self.range.end(),
            self.range.clip(target.start()),
            self.range.clip(target.end()),
        ];
        bounds.sort_unstable();
        bounds.dedup();

        bounds
            .windows(2)
            .map(|pair| Fragment {
                range: Range::from_bounds(pair[0], pair[1]),
                attached: self.attached.clone(),
            })
            .collect()
    }
}

/// Split `text` into disjoint sections annotated by `groups`.
///
/// Groups are placed in the order given, annotations within a group by
/// increasing offset. Callers pass only annotations that match the text;
/// anything that does not fit the text is logged and skipped.
///
/// Blank sections with nothing attached are dropped. Coverage of a section is
/// the sum of its attached coverage, clamped to 100.
pub fn split_sections(text: &str, groups: &[AnnotationGroup]) -> Vec<Section> {
    let mut fragments = vec![Fragment::new(Range::new(0, text.len()))];

    for group in groups {
        let mut ordered: Vec<&Annotation> = group.annotations.iter().collect();
        ordered.sort_by_key(|a| a.offset);

        for annotation in ordered {
            fragments = place(fragments, text, annotation);
        }
    }

    let sections: Vec<Section> = fragments
        .into_iter()
        .filter_map(|fragment| {
            let slice = fragment.range.slice(text)?;
            if slice.trim().is_empty() && fragment.attached.is_empty() {
                return None;
            }
            let coverage = fragment.attached.coverage_sum().min(100) as u32;
            Some(Section {
                text: slice.to_string(),
                offset: fragment.range.start(),
                coverage,
                attached: fragment.attached,
            })
        })
        .collect();

    debug!(sections = sections.len(), "Split specification");
    sections
}

/// Place one annotation, returning the rebuilt fragment list sorted by offset
fn place(fragments: Vec<Fragment>, text: &str, annotation: &Annotation) -> Vec<Fragment> {
    let target = annotation.range();

    if target.is_empty() {
        error!(
            relation_id = annotation.relation_id,
            kind = %annotation.kind,
            range = %target,
            "Annotation covers no text, skipping"
        );
        return fragments;
    }

    if target.slice(text).is_none() {
        error!(
            relation_id = annotation.relation_id,
            kind = %annotation.kind,
            range = %target,
            "Annotation range does not fit the specification text, skipping"
        );
        return fragments;
    }

    if !fragments.iter().any(|f| f.range.intersects(&target)) {
        error!(
            relation_id = annotation.relation_id,
            kind = %annotation.kind,
            range = %target,
            "Annotation intersects no section, skipping"
        );
        return fragments;
    }

    let mut rebuilt: Vec<Fragment> = fragments
        .into_iter()
        .flat_map(|fragment| {
            if fragment.range.intersects(&target) {
                fragment.cut(target)
            } else {
                vec![fragment]
            }
        })
        .collect();

    for fragment in rebuilt.iter_mut() {
        if fragment.range.intersects(&target) {
            fragment.attached.push(annotation.clone());
        }
    }

    rebuilt.sort_by_key(|f| f.range.start());
    rebuilt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkItemKind;

    fn requirement(id: i64, section: &str, offset: usize, coverage: u32) -> Annotation {
        Annotation::new(id, WorkItemKind::Requirement, section, offset, coverage)
    }

    #[test]
    fn test_cut_clips_to_fragment() {
        let fragment = Fragment::new(Range::from_bounds(4, 9));
        let pieces = fragment.cut(Range::from_bounds(0, 19));
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].range, Range::from_bounds(4, 9));
    }

    #[test]
    fn test_cut_inner_target() {
        let fragment = Fragment::new(Range::from_bounds(0, 19));
        let pieces = fragment.cut(Range::from_bounds(4, 9));
        let ranges: Vec<Range> = pieces.iter().map(|p| p.range).collect();
        assert_eq!(
            ranges,
            vec![
                Range::from_bounds(0, 4),
                Range::from_bounds(4, 9),
                Range::from_bounds(9, 19)
            ]
        );
    }

    #[test]
    fn test_no_annotations_yields_whole_text() {
        let sections = split_sections("The quick brown fox", &[]);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].text, "The quick brown fox");
        assert_eq!(sections[0].coverage, 0);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(split_sections("", &[]).is_empty());
    }

    #[test]
    fn test_blank_section_with_attachment_is_kept() {
        let text = "a   b";
        let groups = vec![AnnotationGroup::new(
            WorkItemKind::Requirement,
            vec![requirement(1, "   ", 1, 10)],
        )];
        let sections = split_sections(text, &groups);
        let texts: Vec<&str> = sections.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "   ", "b"]);
        assert_eq!(sections[1].coverage, 10);
    }

    #[test]
    fn test_out_of_range_annotation_is_skipped() {
        let text = "short";
        let groups = vec![AnnotationGroup::new(
            WorkItemKind::Requirement,
            vec![requirement(1, "short text", 0, 50)],
        )];
        let sections = split_sections(text, &groups);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].attached.is_empty());
    }

    #[test]
    fn test_empty_or_overflowing_annotation_is_skipped() {
        let text = "The quick brown fox";
        let groups = vec![AnnotationGroup::new(
            WorkItemKind::Requirement,
            vec![requirement(1, "", 4, 50), requirement(2, "quick", usize::MAX, 50)],
        )];
        let sections = split_sections(text, &groups);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].text, text);
        assert!(sections[0].attached.is_empty());
    }

    #[test]
    fn test_annotation_spanning_several_sections() {
        let text = "The quick brown fox";
        let groups = vec![
            AnnotationGroup::new(
                WorkItemKind::Requirement,
                vec![requirement(1, "quick", 4, 30), requirement(2, "fox", 16, 30)],
            ),
            AnnotationGroup::new(
                WorkItemKind::Justification,
                vec![Annotation::new(
                    3,
                    WorkItemKind::Justification,
                    "The quick brown fox",
                    0,
                    10,
                )],
            ),
        ];

        let sections = split_sections(text, &groups);
        let texts: Vec<&str> = sections.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["The ", "quick", " brown ", "fox"]);

        for section in &sections {
            assert_eq!(section.attached.of_kind(WorkItemKind::Justification).len(), 1);
        }
        let coverages: Vec<u32> = sections.iter().map(|s| s.coverage).collect();
        assert_eq!(coverages, vec![10, 40, 10, 40]);
    }

    #[test]
    fn test_multibyte_text() {
        let text = "Größe prüfen";
        let offset = text.find("prüfen").unwrap();
        let groups = vec![AnnotationGroup::new(
            WorkItemKind::Requirement,
            vec![requirement(1, "prüfen", offset, 100)],
        )];
        let sections = split_sections(text, &groups);
        assert_eq!(sections.last().unwrap().text, "prüfen");
        assert_eq!(sections.last().unwrap().coverage, 100);
    }
}
