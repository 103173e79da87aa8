//! Line-level diff between two normalized documents
//!
//! The line sequences are aligned with the shared [`BlockMatcher`] and the
//! resulting edit script is expanded into [`DiffLine`]s. Replaced spans are
//! paired positionally; each pair either gets inline segmentation or falls
//! back to a plain delete+insert pair, decided by a staged similarity gate
//! that rejects dissimilar pairs before paying for a full token alignment.

use crate::artifacts::diff::context::apply_context;
use crate::artifacts::diff::inline::diff_inline;
use crate::artifacts::diff::matcher::{BlockMatcher, OpcodeTag};
use crate::artifacts::error::Result;
use crate::artifacts::model::{DiffLine, DiffResult, InlineDiffConfig, NormalizedDocument};
use crate::artifacts::normalize::{DocumentSource, normalize};

/// Normalize both inputs and compute a unified diff.
pub fn diff<'a>(
    left: impl Into<DocumentSource<'a>>,
    right: impl Into<DocumentSource<'a>>,
    left_id: &str,
    right_id: &str,
    inline_config: Option<InlineDiffConfig>,
    context: Option<i64>,
) -> Result<DiffResult> {
    let left_doc = normalize(left.into(), left_id)?;
    let right_doc = normalize(right.into(), right_id)?;
    diff_normalized(&left_doc, &right_doc, inline_config, context)
}

/// Compute a diff between two already-normalized documents.
///
/// `context`, when present, windows the output into hunks with that many
/// unchanged lines of surrounding context; negative values are rejected.
pub fn diff_normalized(
    left: &NormalizedDocument,
    right: &NormalizedDocument,
    inline_config: Option<InlineDiffConfig>,
    context: Option<i64>,
) -> Result<DiffResult> {
    let config = inline_config.unwrap_or_default();
    config.validate()?;

    let matcher = BlockMatcher::new(&left.lines, &right.lines);
    let mut lines: Vec<DiffLine> = Vec::new();

    for opcode in matcher.opcodes() {
        match opcode.tag {
            OpcodeTag::Equal => {
                for (offset, left_idx) in opcode.left.clone().enumerate() {
                    let right_idx = opcode.right.start + offset;
                    lines.push(DiffLine::unchanged(
                        left_idx + 1,
                        right_idx + 1,
                        left.lines[left_idx].clone(),
                        right.lines[right_idx].clone(),
                    ));
                }
            }
            OpcodeTag::Delete => {
                for left_idx in opcode.left.clone() {
                    lines.push(DiffLine::deleted(left_idx + 1, left.lines[left_idx].clone()));
                }
            }
            OpcodeTag::Insert => {
                for right_idx in opcode.right.clone() {
                    lines.push(DiffLine::inserted(
                        right_idx + 1,
                        right.lines[right_idx].clone(),
                    ));
                }
            }
            OpcodeTag::Replace => {
                build_replaced_lines(
                    left,
                    right,
                    opcode.left.start,
                    opcode.left.end,
                    opcode.right.start,
                    opcode.right.end,
                    &config,
                    &mut lines,
                );
            }
        }
    }

    let (lines, window) = match context {
        Some(radius) => (apply_context(&lines, radius)?, Some(radius as usize)),
        None => (lines, None),
    };

    Ok(DiffResult {
        left: left.clone(),
        right: right.clone(),
        lines,
        context: window,
    })
}

/// Expand one replace opcode: positional pairs first, then leftover
/// one-sided lines.
#[allow(clippy::too_many_arguments)]
fn build_replaced_lines(
    left: &NormalizedDocument,
    right: &NormalizedDocument,
    i1: usize,
    i2: usize,
    j1: usize,
    j2: usize,
    config: &InlineDiffConfig,
    lines: &mut Vec<DiffLine>,
) {
    let pair_count = (i2 - i1).min(j2 - j1);

    for offset in 0..pair_count {
        let left_idx = i1 + offset;
        let right_idx = j1 + offset;
        let left_line = &left.lines[left_idx];
        let right_line = &right.lines[right_idx];

        if should_inline(left_line, right_line, config) {
            lines.push(DiffLine::edited(
                left_idx + 1,
                right_idx + 1,
                left_line.clone(),
                right_line.clone(),
                diff_inline(left_line, right_line),
            ));
        } else {
            lines.push(DiffLine::deleted(left_idx + 1, left_line.clone()));
            lines.push(DiffLine::inserted(right_idx + 1, right_line.clone()));
        }
    }

    for left_idx in (i1 + pair_count)..i2 {
        lines.push(DiffLine::deleted(left_idx + 1, left.lines[left_idx].clone()));
    }
    for right_idx in (j1 + pair_count)..j2 {
        lines.push(DiffLine::inserted(
            right_idx + 1,
            right.lines[right_idx].clone(),
        ));
    }
}

/// Decide whether a replaced pair is similar enough for inline segmentation.
///
/// Blank-vs-blank pairs are always eligible. Otherwise the newline-stripped
/// bodies go through three similarity estimates ordered cheap to expensive;
/// the pair is rejected as soon as one falls below its threshold, which
/// bounds the cost when many replaced lines are wildly dissimilar.
fn should_inline(left: &str, right: &str, config: &InlineDiffConfig) -> bool {
    if left.trim().is_empty() && right.trim().is_empty() {
        return true;
    }

    let left_chars: Vec<char> = left.trim_end_matches('\n').chars().collect();
    let right_chars: Vec<char> = right.trim_end_matches('\n').chars().collect();
    let matcher = BlockMatcher::new(&left_chars, &right_chars);

    if matcher.real_quick_ratio() < config.min_real_quick_ratio {
        return false;
    }
    if matcher.quick_ratio() < config.min_quick_ratio {
        return false;
    }
    matcher.ratio() >= config.min_ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::model::{ChangeType, NormalizationMetadata};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn doc(lines: &[&str], source: &str) -> NormalizedDocument {
        let lines: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
        let length: usize = lines.iter().map(|line| line.chars().count()).sum();
        NormalizedDocument {
            source_id: source.into(),
            lines,
            metadata: NormalizationMetadata::new(length, length, BTreeMap::new()),
            digest: format!("digest-{source}"),
        }
    }

    #[test]
    fn identical_documents_yield_only_unchanged_lines() {
        let left = doc(&["alpha\n", "beta\n"], "left");
        let right = doc(&["alpha\n", "beta\n"], "right");

        let result = diff_normalized(&left, &right, None, None).unwrap();

        assert!(!result.has_changes());
        assert_eq!(result.lines.len(), 2);
        assert!(result
            .lines
            .iter()
            .all(|line| line.kind() == ChangeType::Unchanged));
    }

    #[test]
    fn insertions_carry_only_right_side_data() {
        let left = doc(&["- alpha\n", "- beta\n"], "left");
        let right = doc(&["- alpha\n", "- beta\n", "- gamma\n"], "right");

        let result = diff_normalized(&left, &right, None, None).unwrap();

        let kinds: Vec<ChangeType> = result.lines.iter().map(|line| line.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeType::Unchanged,
                ChangeType::Unchanged,
                ChangeType::Inserted
            ]
        );
        let inserted = result.lines.last().unwrap();
        assert_eq!(inserted.right_text(), Some("- gamma\n"));
        assert_eq!(inserted.right_lineno(), Some(3));
        assert_eq!(inserted.left_lineno(), None);
    }

    #[test]
    fn similar_replacements_become_edited_lines_with_segments() {
        let left = doc(&["value one\n"], "left");
        let right = doc(&["value two\n"], "right");

        let result = diff_normalized(&left, &right, None, None).unwrap();

        assert_eq!(result.lines.len(), 1);
        let line = &result.lines[0];
        assert_eq!(line.kind(), ChangeType::Edited);
        let kinds: Vec<ChangeType> = line.segments().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeType::Unchanged,
                ChangeType::Edited,
                ChangeType::Unchanged
            ]
        );
        assert_eq!(line.segments()[1].left_text, "one");
        assert_eq!(line.segments()[1].right_text, "two");
    }

    #[test]
    fn dissimilar_replacements_fall_back_to_delete_insert_pairs() {
        let left = doc(&["alpha\n"], "left");
        let right = doc(&["omega omega omega\n"], "right");

        let result = diff_normalized(&left, &right, None, None).unwrap();

        let kinds: Vec<ChangeType> = result.lines.iter().map(|line| line.kind()).collect();
        assert_eq!(kinds, vec![ChangeType::Deleted, ChangeType::Inserted]);
        assert!(result.lines.iter().all(|line| line.segments().is_empty()));
    }

    #[test]
    fn raising_min_ratio_forces_the_fallback() {
        let left = doc(&["value one\n"], "left");
        let right = doc(&["value two\n"], "right");
        let strict = InlineDiffConfig {
            min_real_quick_ratio: 1.0,
            min_quick_ratio: 1.0,
            min_ratio: 1.0,
        };

        let result = diff_normalized(&left, &right, Some(strict), None).unwrap();

        let kinds: Vec<ChangeType> = result.lines.iter().map(|line| line.kind()).collect();
        assert_eq!(kinds, vec![ChangeType::Deleted, ChangeType::Inserted]);
    }

    #[test]
    fn replace_spans_emit_leftover_one_sided_lines() {
        let left = doc(&["A\n", "B\n", "C\n"], "left");
        let right = doc(&["A!\n"], "right");

        let result = diff_normalized(&left, &right, None, None).unwrap();

        let deleted: Vec<&str> = result
            .lines
            .iter()
            .filter(|line| line.kind() == ChangeType::Deleted)
            .filter_map(|line| line.left_text())
            .collect();
        assert!(deleted.contains(&"B\n") && deleted.contains(&"C\n"));
    }

    #[test]
    fn invalid_config_is_rejected_before_any_work() {
        let left = doc(&["a\n"], "left");
        let config = InlineDiffConfig {
            min_real_quick_ratio: -1.0,
            ..InlineDiffConfig::default()
        };
        assert!(diff_normalized(&left, &left, Some(config), None).is_err());
    }

    #[rstest]
    #[case("\n", "\n", true)]
    #[case("  \n", "\n", true)]
    #[case("value one\n", "value two\n", true)]
    #[case("alpha\n", "zzz qqq xxx\n", false)]
    fn should_inline_gate(#[case] left: &str, #[case] right: &str, #[case] expected: bool) {
        assert_eq!(
            should_inline(left, right, &InlineDiffConfig::default()),
            expected
        );
    }

    #[test]
    fn should_inline_rejects_everything_at_max_thresholds() {
        let strict = InlineDiffConfig {
            min_real_quick_ratio: 1.0,
            min_quick_ratio: 1.0,
            min_ratio: 1.0,
        };
        assert!(!should_inline("alpha\n", "beta\n", &strict));
        // Blank pairs bypass the gate entirely.
        assert!(should_inline("\n", "\n", &strict));
    }
}
