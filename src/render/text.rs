//! Unified text rendering
//!
//! Classic unified diff output with `[-..-]` / `{+..+}` markers inside
//! edited lines. The colored variant paints whole lines the way git
//! paints its diffs.

use crate::artifacts::model::{ChangeType, DiffLine, DiffResult, InlineDiffSegment};
use colored::Colorize;

/// Render a diff result as unified diff text.
pub fn render_unified(result: &DiffResult) -> String {
    let mut rendered = String::new();
    for line in &result.lines {
        match line.kind() {
            ChangeType::Unchanged => {
                let text = line.right_text().or_else(|| line.left_text()).unwrap_or("");
                rendered.push(' ');
                rendered.push_str(text);
            }
            ChangeType::Deleted => {
                rendered.push('-');
                rendered.push_str(line.left_text().unwrap_or(""));
            }
            ChangeType::Inserted => {
                rendered.push('+');
                rendered.push_str(line.right_text().unwrap_or(""));
            }
            ChangeType::Edited => {
                rendered.push('-');
                rendered.push_str(&render_inline_side(line, Side::Left));
                rendered.push('+');
                rendered.push_str(&render_inline_side(line, Side::Right));
            }
            ChangeType::Skipped => {
                let text = line.left_text().or_else(|| line.right_text()).unwrap_or("");
                rendered.push_str(text);
            }
        }
    }
    rendered
}

/// Render a diff result as unified diff text with terminal colors.
///
/// Hunk headers come out cyan, deletions red, insertions green.
pub fn render_unified_colored(result: &DiffResult) -> String {
    let mut rendered = String::new();
    for raw in render_unified(result).split_inclusive('\n') {
        let (body, newline) = match raw.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (raw, ""),
        };
        let painted = match body.chars().next() {
            Some('-') => body.red().to_string(),
            Some('+') => body.green().to_string(),
            Some('@') => body.cyan().to_string(),
            _ => body.to_string(),
        };
        rendered.push_str(&painted);
        rendered.push_str(newline);
    }
    rendered
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Render the inline segments of an edited line for one side, keeping the
/// source line's trailing newline.
fn render_inline_side(line: &DiffLine, side: Side) -> String {
    let source = match side {
        Side::Left => line.left_text(),
        Side::Right => line.right_text(),
    };

    if line.segments().is_empty() {
        return source.unwrap_or("").to_string();
    }

    let mut rendered = String::new();
    for segment in line.segments() {
        rendered.push_str(&render_segment(segment, side));
    }
    if source.is_some_and(|text| text.ends_with('\n')) && !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    rendered
}

fn render_segment(segment: &InlineDiffSegment, side: Side) -> String {
    match (segment.kind, side) {
        (ChangeType::Unchanged, Side::Left) => segment.left_text.clone(),
        (ChangeType::Unchanged, Side::Right) => segment.right_text.clone(),
        (ChangeType::Deleted, Side::Left) => format!("[-{}-]", segment.left_text),
        (ChangeType::Inserted, Side::Right) => format!("{{+{}+}}", segment.right_text),
        (ChangeType::Edited, Side::Left) if !segment.left_text.is_empty() => {
            format!("[-{}-]", segment.left_text)
        }
        (ChangeType::Edited, Side::Right) if !segment.right_text.is_empty() => {
            format!("{{+{}+}}", segment.right_text)
        }
        _ => String::new(),
    }
}
