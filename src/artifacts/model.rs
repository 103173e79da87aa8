//! Core value objects shared by the normalizer, the differ, and renderers
//!
//! Everything here is an immutable value: constructed once by the pipeline,
//! then only read. `DiffLine` keeps its fields private because a line number
//! must be present exactly when that side has text; the named constructors
//! are the only way to build one.

use crate::artifacts::error::{MdiffError, Result};
use derive_new::new;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Kinds of changes tracked at both line and inline granularity.
///
/// `Skipped` is reserved for synthetic hunk-header lines produced by context
/// windowing; it never describes a real content line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Unchanged,
    Inserted,
    Deleted,
    Edited,
    Skipped,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Unchanged => "unchanged",
            ChangeType::Inserted => "inserted",
            ChangeType::Deleted => "deleted",
            ChangeType::Edited => "edited",
            ChangeType::Skipped => "skipped",
        }
    }
}

impl Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostics captured while normalizing a document.
///
/// Lengths are character counts. The transformation counters are keyed by
/// rule category (`setext_to_atx`, `horizontal_rule`, ...) and never feed
/// into comparison or the digest.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct NormalizationMetadata {
    pub original_length: usize,
    pub normalized_length: usize,
    pub transformations: BTreeMap<String, usize>,
}

/// Canonical representation of a Markdown document.
///
/// `lines` joined in order reconstruct the canonical text exactly; every
/// line keeps its trailing newline except a final unterminated one. The
/// digest is the SHA-256 hex of that text and is stable for identical input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    pub source_id: String,
    pub lines: Vec<String>,
    pub metadata: NormalizationMetadata,
    pub digest: String,
}

impl NormalizedDocument {
    /// Reconstruct the normalized Markdown as a single string.
    pub fn text(&self) -> String {
        self.lines.concat()
    }
}

/// Inline diff segment within an edited line.
///
/// Invariant: `Inserted` segments carry no left text and `Deleted` segments
/// carry no right text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineDiffSegment {
    pub kind: ChangeType,
    pub left_text: String,
    pub right_text: String,
}

impl InlineDiffSegment {
    pub fn new(kind: ChangeType, left_text: String, right_text: String) -> Self {
        debug_assert!(kind != ChangeType::Inserted || left_text.is_empty());
        debug_assert!(kind != ChangeType::Deleted || right_text.is_empty());
        InlineDiffSegment {
            kind,
            left_text,
            right_text,
        }
    }
}

/// A single line in the unified diff view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    kind: ChangeType,
    left_lineno: Option<usize>,
    right_lineno: Option<usize>,
    left_text: Option<String>,
    right_text: Option<String>,
    segments: Vec<InlineDiffSegment>,
}

impl DiffLine {
    pub fn unchanged(
        left_lineno: usize,
        right_lineno: usize,
        left_text: String,
        right_text: String,
    ) -> Self {
        DiffLine {
            kind: ChangeType::Unchanged,
            left_lineno: Some(left_lineno),
            right_lineno: Some(right_lineno),
            left_text: Some(left_text),
            right_text: Some(right_text),
            segments: Vec::new(),
        }
    }

    pub fn deleted(left_lineno: usize, left_text: String) -> Self {
        DiffLine {
            kind: ChangeType::Deleted,
            left_lineno: Some(left_lineno),
            right_lineno: None,
            left_text: Some(left_text),
            right_text: None,
            segments: Vec::new(),
        }
    }

    pub fn inserted(right_lineno: usize, right_text: String) -> Self {
        DiffLine {
            kind: ChangeType::Inserted,
            left_lineno: None,
            right_lineno: Some(right_lineno),
            left_text: None,
            right_text: Some(right_text),
            segments: Vec::new(),
        }
    }

    pub fn edited(
        left_lineno: usize,
        right_lineno: usize,
        left_text: String,
        right_text: String,
        segments: Vec<InlineDiffSegment>,
    ) -> Self {
        DiffLine {
            kind: ChangeType::Edited,
            left_lineno: Some(left_lineno),
            right_lineno: Some(right_lineno),
            left_text: Some(left_text),
            right_text: Some(right_text),
            segments,
        }
    }

    /// Synthetic hunk-header line; both sides carry the header text.
    pub fn skipped(header: String) -> Self {
        DiffLine {
            kind: ChangeType::Skipped,
            left_lineno: None,
            right_lineno: None,
            left_text: Some(header.clone()),
            right_text: Some(header),
            segments: Vec::new(),
        }
    }

    pub fn kind(&self) -> ChangeType {
        self.kind
    }

    pub fn left_lineno(&self) -> Option<usize> {
        self.left_lineno
    }

    pub fn right_lineno(&self) -> Option<usize> {
        self.right_lineno
    }

    pub fn left_text(&self) -> Option<&str> {
        self.left_text.as_deref()
    }

    pub fn right_text(&self) -> Option<&str> {
        self.right_text.as_deref()
    }

    pub fn segments(&self) -> &[InlineDiffSegment] {
        &self.segments
    }

    pub fn is_edited(&self) -> bool {
        self.kind == ChangeType::Edited
    }
}

/// Thresholds gating whether a replaced line pair gets inline segmentation
/// or is shown as a plain delete+insert pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InlineDiffConfig {
    pub min_real_quick_ratio: f64,
    pub min_quick_ratio: f64,
    pub min_ratio: f64,
}

impl Default for InlineDiffConfig {
    fn default() -> Self {
        InlineDiffConfig {
            min_real_quick_ratio: 0.2,
            min_quick_ratio: 0.3,
            min_ratio: 0.35,
        }
    }
}

impl InlineDiffConfig {
    /// Reject thresholds outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_real_quick_ratio", self.min_real_quick_ratio),
            ("min_quick_ratio", self.min_quick_ratio),
            ("min_ratio", self.min_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(MdiffError::InvalidArgument(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Container for the full diff between two normalized documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    pub left: NormalizedDocument,
    pub right: NormalizedDocument,
    pub lines: Vec<DiffLine>,
    pub context: Option<usize>,
}

impl DiffResult {
    /// True when the diff captured at least one change.
    pub fn has_changes(&self) -> bool {
        self.lines
            .iter()
            .any(|line| line.kind() != ChangeType::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(ChangeType::Unchanged, "unchanged")]
    #[case(ChangeType::Inserted, "inserted")]
    #[case(ChangeType::Deleted, "deleted")]
    #[case(ChangeType::Edited, "edited")]
    #[case(ChangeType::Skipped, "skipped")]
    fn change_type_renders_lowercase(#[case] kind: ChangeType, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }

    #[test]
    fn document_text_joins_lines_in_order() {
        let doc = NormalizedDocument {
            source_id: "doc".into(),
            lines: vec!["# Title\n".into(), "\n".into(), "Body\n".into()],
            metadata: NormalizationMetadata::new(0, 0, BTreeMap::new()),
            digest: String::new(),
        };
        assert_eq!(doc.text(), "# Title\n\nBody\n");
    }

    #[test]
    fn one_sided_lines_omit_the_missing_side_entirely() {
        let deleted = DiffLine::deleted(3, "gone\n".into());
        assert_eq!(deleted.right_lineno(), None);
        assert_eq!(deleted.right_text(), None);

        let inserted = DiffLine::inserted(7, "new\n".into());
        assert_eq!(inserted.left_lineno(), None);
        assert_eq!(inserted.left_text(), None);
    }

    #[test]
    fn skipped_lines_carry_the_header_on_both_sides() {
        let header = DiffLine::skipped("@@ -1,2 +1,2 @@\n".into());
        assert_eq!(header.left_text(), header.right_text());
        assert_eq!(header.left_lineno(), None);
        assert_eq!(header.right_lineno(), None);
    }

    #[test]
    fn default_config_matches_documented_thresholds() {
        let config = InlineDiffConfig::default();
        assert_eq!(config.min_real_quick_ratio, 0.2);
        assert_eq!(config.min_quick_ratio, 0.3);
        assert_eq!(config.min_ratio, 0.35);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(-0.1, 0.3, 0.35)]
    #[case(0.2, 1.5, 0.35)]
    #[case(0.2, 0.3, f64::NAN)]
    fn out_of_range_thresholds_are_rejected(
        #[case] real_quick: f64,
        #[case] quick: f64,
        #[case] min_ratio: f64,
    ) {
        let config = InlineDiffConfig {
            min_real_quick_ratio: real_quick,
            min_quick_ratio: quick,
            min_ratio,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn has_changes_ignores_unchanged_lines() {
        let doc = NormalizedDocument {
            source_id: "doc".into(),
            lines: vec!["same\n".into()],
            metadata: NormalizationMetadata::new(5, 5, BTreeMap::new()),
            digest: "0".repeat(64),
        };
        let unchanged = DiffResult {
            left: doc.clone(),
            right: doc.clone(),
            lines: vec![DiffLine::unchanged(1, 1, "same\n".into(), "same\n".into())],
            context: None,
        };
        assert!(!unchanged.has_changes());

        let changed = DiffResult {
            lines: vec![DiffLine::inserted(1, "new\n".into())],
            ..unchanged
        };
        assert!(changed.has_changes());
    }
}
