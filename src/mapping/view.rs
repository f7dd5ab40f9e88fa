//! The mapping read: a specification split into sections plus the
//! annotations that no longer match it.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{aggregate_coverage, split_sections};
use crate::domain::{Annotation, AnnotationGroup, Section, SpecificationText, WorkItemKind};

/// Default text rendered in place of a specification that could not be read
pub const DEFAULT_PLACEHOLDER: &str = "Unable to find the Software Specification. \
Please check the value in the Software Component properties \
or check your internet connection (If file is remote).";

/// Everything a client needs to render a specification with its annotations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingView {
    /// Locator the specification was read from
    pub locator: String,

    /// Digest of the text the sections were computed from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Disjoint sections, ordered by offset
    pub mapped: Vec<Section>,

    /// Annotations whose stored section no longer matches the text
    pub unmapped: Vec<Annotation>,

    /// Overall coverage, absent when the specification could not be read
    pub coverage: Option<u32>,

    /// Human-readable message shown instead of the specification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Build the mapping view for one specification read.
///
/// `specification` is `None` when the text could not be fetched; the view
/// then carries `placeholder` and no coverage, and the splitter is not run.
/// Annotations are grouped in `kinds` order; kinds not listed are ignored.
pub fn build_mapping_view(
    locator: &str,
    specification: Option<&SpecificationText>,
    annotations: &[Annotation],
    kinds: &[WorkItemKind],
    placeholder: &str,
) -> MappingView {
    let Some(specification) = specification else {
        warn!(%locator, "Specification text unavailable, no coverage computable");
        return MappingView {
            locator: locator.to_string(),
            digest: None,
            mapped: Vec::new(),
            unmapped: Vec::new(),
            coverage: None,
            placeholder: Some(placeholder.to_string()),
        };
    };

    let text = specification.text.as_str();
    let (matching, unmapped): (Vec<&Annotation>, Vec<&Annotation>) = annotations
        .iter()
        .filter(|a| kinds.contains(&a.kind))
        .partition(|a| a.matches(text));

    let groups = AnnotationGroup::from_annotations(kinds, matching);
    let mapped = split_sections(text, &groups);
    let coverage = aggregate_coverage(&mapped);

    info!(
        %locator,
        sections = mapped.len(),
        unmapped = unmapped.len(),
        coverage,
        "Built mapping view"
    );

    MappingView {
        locator: locator.to_string(),
        digest: Some(specification.digest.clone()),
        mapped,
        unmapped: unmapped.into_iter().cloned().collect(),
        coverage: Some(coverage),
        placeholder: None,
    }
}
