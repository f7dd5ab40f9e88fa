//! Offset Reconciliation Integration Tests
//!
//! Tests for OK / WARNING / KO classification against a new revision and
//! for applying WARNING fixups.

use specmap::domain::{Annotation, WorkItemKind};
use specmap::mapping::{apply_fixups, reconcile_offsets};
use specmap::store::AnnotationFile;
use tempfile::TempDir;

const OLD: &str = "The quick brown fox";
const NEW: &str = "The very quick brown fox";

#[test]
fn test_moved_section_is_a_warning() {
    let mut annotations = vec![Annotation::new(1, WorkItemKind::Requirement, "brown fox", 10, 100)];
    let text = "The quick  brown fox";
    let report = reconcile_offsets(text, &annotations);
    assert!(report.ok.is_empty());
    assert!(report.ko.is_empty());
    assert_eq!(report.warning.len(), 1);
    assert_eq!(report.warning[0].id, 1);
    assert_eq!(report.warning[0].old_offset, 10);
    assert_eq!(report.warning[0].new_offset, 11);

    apply_fixups(&report, &mut annotations).unwrap();
    let again = reconcile_offsets(text, &annotations);
    assert_eq!(again.ok.len(), 1);
    assert!(again.is_clean());
}

#[test]
fn test_first_exact_reoccurrence_wins() {
    let mut annotations = vec![Annotation::new(1, WorkItemKind::Requirement, "brown fox", 10, 100)];
    let text = "The very quick brown fox";

    let report = reconcile_offsets(text, &annotations);
    assert_eq!(report.warning[0].new_offset, 15);

    let text = "The  quick brown     fox brown fox";
    let report = reconcile_offsets(text, &annotations);
    assert_eq!(report.warning[0].new_offset, 25);

    let text = "Test quickly: brown fox";
    let report = reconcile_offsets(text, &annotations);
    assert_eq!(report.warning[0].new_offset, 14);

    apply_fixups(&report, &mut annotations).unwrap();
    assert_eq!(annotations[0].offset, 14);
    assert!(reconcile_offsets(text, &annotations).is_clean());
}

#[test]
fn test_classification_mix() {
    let annotations = vec![
        Annotation::new(1, WorkItemKind::Requirement, "The ", 0, 10),
        Annotation::new(2, WorkItemKind::TestCase, "quick", 4, 10).with_title("Quick path"),
        Annotation::new(3, WorkItemKind::Justification, "lazy dog", 20, 10),
    ];

    let report = reconcile_offsets(NEW, &annotations);
    assert_eq!(report.ok.len(), 1);
    assert_eq!(report.ok[0].id, 1);
    assert_eq!(report.warning.len(), 1);
    assert_eq!(report.warning[0].title.as_deref(), Some("Quick path"));
    assert_eq!(report.ko.len(), 1);
    assert_eq!(report.ko[0].kind, WorkItemKind::Justification);
}

#[test]
fn test_fixups_leave_ko_untouched() {
    let mut annotations = vec![
        Annotation::new(1, WorkItemKind::Requirement, "quick", 4, 10),
        Annotation::new(2, WorkItemKind::Requirement, "lazy", 12, 10),
    ];
    let report = reconcile_offsets(NEW, &annotations);
    let applied = apply_fixups(&report, &mut annotations).unwrap();

    assert_eq!(applied, 1);
    assert_eq!(annotations[0].offset, 9);
    assert_eq!(annotations[1].offset, 12);

    let again = reconcile_offsets(NEW, &annotations);
    assert!(again.warning.is_empty());
    assert_eq!(again.ko.len(), 1);
}

#[test]
fn test_reconcile_after_fixup_is_clean() {
    let base = "alpha beta gamma delta epsilon zeta eta theta";
    let revised = "zeta eta theta alpha beta gamma delta epsilon";

    let mut annotations: Vec<Annotation> = ["alpha", "gamma delta", "eta", "theta", "beta gamma"]
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let offset = base.find(word).unwrap();
            Annotation::new(i as i64, WorkItemKind::TestSpecification, *word, offset, 20)
        })
        .collect();
    assert!(reconcile_offsets(base, &annotations).is_clean());

    let report = reconcile_offsets(revised, &annotations);
    assert!(report.ko.is_empty());
    let moved = report.warning.len();
    assert!(moved > 0);

    assert_eq!(apply_fixups(&report, &mut annotations).unwrap(), moved);
    assert!(reconcile_offsets(revised, &annotations).is_clean());
    assert_eq!(reconcile_offsets(revised, &annotations).ok.len(), 5);
}

#[tokio::test]
async fn test_fixups_persist_through_file_store() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("annotations.json");
    let annotations = vec![
        Annotation::new(1, WorkItemKind::Requirement, "quick", 4, 50),
        Annotation::new(2, WorkItemKind::TestCase, "brown fox", 10, 100),
    ];
    std::fs::write(&path, serde_json::to_string_pretty(&annotations).unwrap()).unwrap();

    let mut store = AnnotationFile::open(&path).await.unwrap();
    assert!(reconcile_offsets(OLD, store.annotations()).is_clean());

    let report = reconcile_offsets(NEW, store.annotations());
    assert_eq!(apply_fixups(&report, &mut store).unwrap(), 2);
    store.save().await.unwrap();

    let reloaded = AnnotationFile::open(&path).await.unwrap();
    assert!(reconcile_offsets(NEW, reloaded.annotations()).is_clean());
    assert_eq!(reloaded.get(WorkItemKind::TestCase, 2).unwrap().offset, 15);
}
