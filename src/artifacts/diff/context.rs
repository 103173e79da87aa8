//! Context windowing: collapse a full diff into hunks
//!
//! Keeps every change line plus up to `context` unchanged lines around each
//! change (measured by position in the sequence, not by line number), then
//! prefixes each contiguous kept block with a synthetic `@@ -L,l +R,r @@`
//! header line of kind `Skipped`.

use crate::artifacts::error::{MdiffError, Result};
use crate::artifacts::model::{ChangeType, DiffLine};

/// Window `lines` to `context` unchanged lines around each change.
///
/// A diff with no changes windows down to an empty sequence. Negative
/// context radii are rejected with `InvalidArgument`.
pub fn apply_context(lines: &[DiffLine], context: i64) -> Result<Vec<DiffLine>> {
    if context < 0 {
        return Err(MdiffError::InvalidArgument(format!(
            "context must be non-negative, got {context}"
        )));
    }
    let radius = context as usize;

    let mut keep = vec![false; lines.len()];
    for (index, line) in lines.iter().enumerate() {
        if line.kind() != ChangeType::Unchanged {
            let start = index.saturating_sub(radius);
            let end = (index + radius + 1).min(lines.len());
            keep[start..end].fill(true);
        }
    }
    if !keep.iter().any(|&kept| kept) {
        return Ok(Vec::new());
    }

    let mut output = Vec::new();
    let mut prev_left = 0usize;
    let mut prev_right = 0usize;
    let mut index = 0usize;

    while index < lines.len() {
        if !keep[index] {
            index += 1;
            continue;
        }
        let mut end = index;
        while end < lines.len() && keep[end] {
            end += 1;
        }

        let block = &lines[index..end];
        output.push(make_hunk_header(block, prev_left, prev_right));
        output.extend_from_slice(block);

        for line in block {
            if let Some(left) = line.left_lineno() {
                prev_left = left;
            }
            if let Some(right) = line.right_lineno() {
                prev_right = right;
            }
        }
        index = end;
    }

    Ok(output)
}

/// Build the `@@ -L,l +R,r @@` header for one kept block.
///
/// A block with no lines on one side (a pure insertion or deletion at a
/// boundary) falls back to one past the previous block's last line number on
/// that side.
fn make_hunk_header(block: &[DiffLine], prev_left: usize, prev_right: usize) -> DiffLine {
    let left_start = block
        .iter()
        .find_map(DiffLine::left_lineno)
        .unwrap_or(prev_left + 1);
    let right_start = block
        .iter()
        .find_map(DiffLine::right_lineno)
        .unwrap_or(prev_right + 1);
    let left_count = block.iter().filter(|line| line.left_lineno().is_some()).count();
    let right_count = block
        .iter()
        .filter(|line| line.right_lineno().is_some())
        .count();

    DiffLine::skipped(format!(
        "@@ -{left_start},{left_count} +{right_start},{right_count} @@\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn unchanged(left: usize, right: usize) -> DiffLine {
        DiffLine::unchanged(left, right, format!("line {left}\n"), format!("line {left}\n"))
    }

    #[test]
    fn negative_context_is_rejected() {
        let result = apply_context(&[], -1);
        assert!(matches!(result, Err(MdiffError::InvalidArgument(_))));
    }

    #[test]
    fn no_changes_windows_to_nothing() {
        assert_eq!(apply_context(&[], 0).unwrap(), Vec::new());
        assert_eq!(apply_context(&[unchanged(1, 1)], 1).unwrap(), Vec::new());
    }

    #[test]
    fn zero_context_keeps_only_changes_with_one_header_per_block() {
        let lines = vec![
            unchanged(1, 1),
            DiffLine::inserted(2, "b\n".into()),
            unchanged(2, 3),
            DiffLine::deleted(3, "d\n".into()),
        ];

        let result = apply_context(&lines, 0).unwrap();

        let kinds: Vec<ChangeType> = result.iter().map(|line| line.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeType::Skipped,
                ChangeType::Inserted,
                ChangeType::Skipped,
                ChangeType::Deleted
            ]
        );
    }

    #[test]
    fn context_radius_pulls_in_surrounding_unchanged_lines() {
        let lines = vec![
            unchanged(1, 1),
            unchanged(2, 2),
            DiffLine::deleted(3, "x\n".into()),
            unchanged(4, 3),
            unchanged(5, 4),
        ];

        let result = apply_context(&lines, 1).unwrap();

        // Header, one line of context each side, and the change itself.
        assert_eq!(result.len(), 4);
        assert_eq!(result[0].kind(), ChangeType::Skipped);
        assert_eq!(result[1].left_lineno(), Some(2));
        assert_eq!(result[3].left_lineno(), Some(4));
    }

    #[test]
    fn header_counts_lines_present_on_each_side() {
        let lines = vec![
            unchanged(1, 1),
            DiffLine::deleted(2, "x\n".into()),
            DiffLine::inserted(2, "y\n".into()),
            unchanged(3, 3),
        ];

        let result = apply_context(&lines, 1).unwrap();

        assert_eq!(result[0].left_text(), Some("@@ -1,3 +1,3 @@\n"));
    }

    #[test]
    fn missing_side_numbers_fall_back_to_previous_block() {
        let block = vec![
            DiffLine::inserted(5, "x\n".into()),
            DiffLine::deleted(7, "y\n".into()),
        ];

        let header = make_hunk_header(&block, 0, 0);

        assert!(header.left_text().unwrap().starts_with("@@ -7,1 +5,1 @@"));
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    fn headers_track_line_numbers_across_blocks(#[case] radius: i64) {
        let mut lines = Vec::new();
        lines.push(DiffLine::deleted(1, "first\n".into()));
        for n in 2..10 {
            lines.push(unchanged(n, n - 1));
        }
        lines.push(DiffLine::inserted(9, "last\n".into()));

        let result = apply_context(&lines, radius).unwrap();

        let headers: Vec<&DiffLine> = result
            .iter()
            .filter(|line| line.kind() == ChangeType::Skipped)
            .collect();
        assert_eq!(headers.len(), 2);
        // Second block is a pure insertion; its left start falls back to one
        // past the last left line emitted in an earlier block.
        if radius == 0 {
            assert_eq!(headers[1].left_text(), Some("@@ -2,0 +9,1 @@\n"));
        } else {
            assert_eq!(headers[1].left_text(), Some("@@ -8,2 +7,3 @@\n"));
        }
    }
}
