//! Token-level diff within a single pair of lines
//!
//! Lines are tokenized into whitespace runs, word runs, and single
//! punctuation characters so that word-level edits stay coherent while
//! punctuation is treated atomically. The token sequences are aligned with
//! the shared [`BlockMatcher`] and materialized as coalesced
//! [`InlineDiffSegment`]s, with whitespace bridges between changes folded
//! into one combined segment.

use crate::artifacts::diff::matcher::{BlockMatcher, OpcodeTag};
use crate::artifacts::model::{ChangeType, InlineDiffSegment};

/// Compute inline diff segments between two lines of text.
///
/// Trailing newlines are handled out-of-band: when either line has one, a
/// final segment records its presence on each side so renderers can
/// round-trip line endings.
pub fn diff_inline(left: &str, right: &str) -> Vec<InlineDiffSegment> {
    let (left_body, left_newline) = strip_trailing_newline(left);
    let (right_body, right_newline) = strip_trailing_newline(right);

    let left_tokens = tokenize(left_body);
    let right_tokens = tokenize(right_body);

    let matcher = BlockMatcher::new(&left_tokens, &right_tokens);
    let mut segments: Vec<InlineDiffSegment> = Vec::new();

    for opcode in matcher.opcodes() {
        let left_text = left_tokens[opcode.left.clone()].concat();
        let right_text = right_tokens[opcode.right.clone()].concat();

        match opcode.tag {
            OpcodeTag::Equal if !left_text.is_empty() => {
                segments.push(InlineDiffSegment::new(
                    ChangeType::Unchanged,
                    left_text,
                    right_text,
                ));
            }
            OpcodeTag::Delete if !left_text.is_empty() => {
                segments.push(InlineDiffSegment::new(
                    ChangeType::Deleted,
                    left_text,
                    String::new(),
                ));
            }
            OpcodeTag::Insert if !right_text.is_empty() => {
                segments.push(InlineDiffSegment::new(
                    ChangeType::Inserted,
                    String::new(),
                    right_text,
                ));
            }
            OpcodeTag::Replace if !left_text.is_empty() || !right_text.is_empty() => {
                segments.push(InlineDiffSegment::new(
                    ChangeType::Edited,
                    left_text,
                    right_text,
                ));
            }
            _ => {}
        }
    }

    if left_newline || right_newline {
        let kind = if left_newline && right_newline {
            ChangeType::Unchanged
        } else if left_newline {
            ChangeType::Deleted
        } else {
            ChangeType::Inserted
        };
        segments.push(InlineDiffSegment::new(
            kind,
            if left_newline { "\n".into() } else { String::new() },
            if right_newline { "\n".into() } else { String::new() },
        ));
    }

    merge_whitespace_bridges(coalesce_segments(segments))
}

/// Split a line into its body and whether it carried a trailing newline.
fn strip_trailing_newline(value: &str) -> (&str, bool) {
    match value.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (value, false),
    }
}

/// Tokenize into whitespace runs, word-character runs, or single other
/// characters. Word characters are unicode alphanumerics plus underscore.
fn tokenize(text: &str) -> Vec<String> {
    #[derive(PartialEq)]
    enum Class {
        Whitespace,
        Word,
    }

    fn classify(c: char) -> Option<Class> {
        if c.is_whitespace() {
            Some(Class::Whitespace)
        } else if c.is_alphanumeric() || c == '_' {
            Some(Class::Word)
        } else {
            None
        }
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_class: Option<Class> = None;

    for c in text.chars() {
        match classify(c) {
            Some(class) => {
                if current_class.as_ref() == Some(&class) {
                    current.push(c);
                } else {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    current.push(c);
                    current_class = Some(class);
                }
            }
            None => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                current_class = None;
                tokens.push(c.to_string());
            }
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Merge adjacent segments of identical kind by concatenating their text.
fn coalesce_segments(segments: Vec<InlineDiffSegment>) -> Vec<InlineDiffSegment> {
    let mut coalesced: Vec<InlineDiffSegment> = Vec::with_capacity(segments.len());
    for segment in segments {
        if let Some(previous) = coalesced.last_mut()
            && previous.kind == segment.kind
        {
            previous.left_text.push_str(&segment.left_text);
            previous.right_text.push_str(&segment.right_text);
            continue;
        }
        coalesced.push(segment);
    }
    coalesced
}

fn is_change_segment(segment: &InlineDiffSegment) -> bool {
    matches!(
        segment.kind,
        ChangeType::Inserted | ChangeType::Deleted | ChangeType::Edited
    )
}

/// An unchanged segment made purely of non-newline whitespace; sitting
/// between two changes it only fragments a single edit visually.
fn is_mergeable_whitespace(segment: &InlineDiffSegment) -> bool {
    segment.kind == ChangeType::Unchanged
        && !segment.left_text.is_empty()
        && segment
            .left_text
            .chars()
            .all(|c| c.is_whitespace() && c != '\n')
        && !segment.right_text.contains('\n')
}

/// Fold a change, a whitespace bridge, and a change into one segment.
fn combine_segments(
    first: &InlineDiffSegment,
    bridge: &InlineDiffSegment,
    second: &InlineDiffSegment,
) -> InlineDiffSegment {
    let left_text = format!("{}{}{}", first.left_text, bridge.left_text, second.left_text);
    let right_text = format!(
        "{}{}{}",
        first.right_text, bridge.right_text, second.right_text
    );
    let kind = match (left_text.is_empty(), right_text.is_empty()) {
        (false, false) => ChangeType::Edited,
        (false, true) => ChangeType::Deleted,
        (true, false) => ChangeType::Inserted,
        (true, true) => ChangeType::Edited,
    };
    InlineDiffSegment::new(kind, left_text, right_text)
}

/// Collapse `change, whitespace, change` triples into one segment. The fold
/// result stays eligible, so chained bridges collapse as well.
fn merge_whitespace_bridges(segments: Vec<InlineDiffSegment>) -> Vec<InlineDiffSegment> {
    let mut merged: Vec<InlineDiffSegment> = Vec::with_capacity(segments.len());
    for segment in segments {
        merged.push(segment);
        while merged.len() >= 3 {
            let n = merged.len();
            if is_change_segment(&merged[n - 3])
                && is_mergeable_whitespace(&merged[n - 2])
                && is_change_segment(&merged[n - 1])
            {
                let combined = combine_segments(&merged[n - 3], &merged[n - 2], &merged[n - 1]);
                merged.truncate(n - 3);
                merged.push(combined);
            } else {
                break;
            }
        }
    }
    merged
}
