//! Block-level canonicalization
//!
//! Scans the document line by line with one-line lookahead and emits one
//! canonical line per logical unit. Classification is a set of small pure
//! predicates over a line and its neighbors; the only non-local state is
//! the output buffer and the transformation counters.

use crate::artifacts::normalize::inline_markup::normalize_inline_markup;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub(super) type TransformStats = BTreeMap<String, usize>;

static UNORDERED_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)([*+-])\s+(.*)$").expect("unordered list pattern"));
static ORDERED_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)\d+[.)]\s+(.*)$").expect("ordered list pattern"));
static HORIZONTAL_RULE_COMPACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[*\-_]{3,}$").expect("horizontal rule pattern"));
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(`{3,}|~{3,})(.*)$").expect("fence pattern"));
static SETEXT_UNDERLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(=+|-+)\s*$").expect("setext underline pattern"));
static TABLE_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)+\|?\s*$").expect("table separator pattern")
});
static ATX_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})(\s.*)?$").expect("atx heading pattern"));
static ATX_TRAILING_DECORATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*#+\s*$").expect("atx decoration pattern"));
static SPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("space run pattern"));

fn bump(stats: &mut TransformStats, key: &str, count: usize) {
    if count > 0 {
        *stats.entry(key.to_string()).or_insert(0) += count;
    }
}

/// Apply block-level normalization to the whole document body.
///
/// Returns the canonical text without a trailing newline; the outer
/// pipeline trims blank edges and terminates it.
pub(super) fn normalize_blocks(text: &str, stats: &mut TransformStats) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            if output.last().is_some_and(|last| !last.is_empty()) {
                output.push(String::new());
            }
            i += 1;
            continue;
        }

        if let Some((marker, language)) = match_fence_start(line) {
            let consumed = normalize_code_fence(&lines, i, marker, language, &mut output, stats);
            i += consumed;
            continue;
        }

        if is_setext_heading(&lines, i) {
            output.push(normalize_setext_heading(lines[i], lines[i + 1]));
            bump(stats, "setext_to_atx", 1);
            i += 2;
            continue;
        }

        let stripped = line.trim();
        if looks_like_horizontal_rule(stripped) {
            if stripped != "---" {
                bump(stats, "horizontal_rule", 1);
            }
            output.push("---".to_string());
            i += 1;
            continue;
        }

        if ATX_HEADING_RE.is_match(stripped) {
            output.push(normalize_atx_heading(line));
            i += 1;
            continue;
        }

        if is_table_block_start(&lines, i) {
            let consumed = normalize_table_block(&lines, i, &mut output, stats);
            i += consumed;
            continue;
        }

        if is_blockquote_line(line) {
            let consumed = normalize_blockquote_block(&lines, i, &mut output, stats);
            i += consumed;
            continue;
        }

        if is_list_item_line(line) {
            let consumed = normalize_list_block(&lines, i, &mut output, stats);
            i += consumed;
            continue;
        }

        let mut paragraph_lines: Vec<&str> = Vec::new();
        while i < lines.len() {
            let current = lines[i];
            if current.trim().is_empty() || is_block_start(&lines, i) {
                break;
            }
            paragraph_lines.push(current.trim_end());
            i += 1;
        }
        if !paragraph_lines.is_empty() {
            let paragraph = collapse_spaces(&paragraph_lines.join(" "));
            output.push(normalize_inline_markup(&paragraph));
        }
    }

    squash_blank_lines(output).join("\n")
}

/// True when the stripped line resembles a horizontal rule once embedded
/// spaces are removed.
fn looks_like_horizontal_rule(stripped: &str) -> bool {
    let compact: String = stripped.chars().filter(|&c| c != ' ').collect();
    !compact.is_empty() && HORIZONTAL_RULE_COMPACT_RE.is_match(&compact)
}

fn is_blockquote_line(line: &str) -> bool {
    line.trim_start().starts_with('>')
}

/// Match a potential fence marker, yielding the marker run and the trimmed
/// language tag.
fn match_fence_start(line: &str) -> Option<(&str, &str)> {
    let captures = FENCE_RE.captures(line.trim_start())?;
    let marker = captures.get(1).map(|m| m.as_str())?;
    let rest = captures.get(2).map_or("", |m| m.as_str());
    Some((marker, rest.trim()))
}

/// Normalize a fenced code block: canonical ``` markers, body right-trimmed
/// and otherwise verbatim. Returns the number of source lines consumed.
fn normalize_code_fence(
    lines: &[&str],
    start: usize,
    marker: &str,
    language: &str,
    output: &mut Vec<String>,
    stats: &mut TransformStats,
) -> usize {
    let mut changed = usize::from(marker != "```");
    if language.is_empty() {
        output.push("```".to_string());
    } else {
        output.push(format!("``` {language}"));
    }

    let fence_char = marker.chars().next().unwrap_or('`');
    let mut i = start + 1;
    while i < lines.len() {
        if let Some((closing, _)) = match_fence_start(lines[i])
            && closing.starts_with(fence_char)
        {
            output.push("```".to_string());
            if closing != "```" {
                changed += 1;
            }
            bump(stats, "code_fence_marker", changed);
            return i - start + 1;
        }
        output.push(lines[i].trim_end().to_string());
        i += 1;
    }

    // Unterminated fence; close it ourselves.
    output.push("```".to_string());
    bump(stats, "code_fence_marker", changed + 1);
    i - start + 1
}

/// A non-blank line followed by a `=`/`-` underline forms a setext heading.
fn is_setext_heading(lines: &[&str], index: usize) -> bool {
    index + 1 < lines.len()
        && !lines[index].trim().is_empty()
        && SETEXT_UNDERLINE_RE.is_match(lines[index + 1])
}

fn normalize_setext_heading(title_line: &str, underline_line: &str) -> String {
    let level = if underline_line.trim().starts_with('=') {
        1
    } else {
        2
    };
    let text = collapse_spaces(title_line.trim());
    format!("{} {}", "#".repeat(level), text)
        .trim_end()
        .to_string()
}

/// Peel one `>` level, recursively canonicalize the inner document, then
/// re-prefix every resulting line. Terminates because each level strips
/// exactly one marker.
fn normalize_blockquote_block(
    lines: &[&str],
    start: usize,
    output: &mut Vec<String>,
    stats: &mut TransformStats,
) -> usize {
    let mut raw_lines: Vec<&str> = Vec::new();
    let mut i = start;
    while i < lines.len() && is_blockquote_line(lines[i]) {
        raw_lines.push(lines[i]);
        i += 1;
    }

    let inner: Vec<&str> = raw_lines
        .iter()
        .map(|line| strip_one_blockquote_marker(line))
        .collect();
    let inner_text = normalize_blocks(&inner.join("\n"), stats);

    let mut block: Vec<String> = Vec::new();
    if inner_text.is_empty() {
        block.push(">".to_string());
    } else {
        for inner_line in inner_text.split('\n') {
            if inner_line.starts_with('>') {
                block.push(format!(">{inner_line}"));
            } else if inner_line.is_empty() {
                block.push(">".to_string());
            } else {
                block.push(format!("> {inner_line}"));
            }
        }
    }

    bump(
        stats,
        "blockquote_prefix",
        count_line_differences(&raw_lines, &block),
    );
    output.append(&mut block);
    raw_lines.len()
}

fn strip_one_blockquote_marker(line: &str) -> &str {
    let stripped = line.trim_start();
    match stripped.strip_prefix('>') {
        Some(rest) => rest.trim_start(),
        None => stripped,
    }
}

fn count_line_differences(original: &[&str], updated: &[String]) -> usize {
    let len = original.len().max(updated.len());
    (0..len)
        .filter(|&idx| {
            let before = original.get(idx).map_or("", |line| line.trim());
            let after = updated.get(idx).map_or("", |line| line.trim());
            before != after
        })
        .count()
}

/// Normalize list markers and indentation for a contiguous list block.
fn normalize_list_block(
    lines: &[&str],
    start: usize,
    output: &mut Vec<String>,
    stats: &mut TransformStats,
) -> usize {
    let mut i = start;
    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            break;
        }

        let (normalized, stat_key) = if let Some(captures) = UNORDERED_LIST_RE.captures(line) {
            let indent = " ".repeat(indent_depth(&captures[1]) * 4);
            let rest = normalize_inline_markup(captures[3].trim_start());
            let rendered = if rest.is_empty() {
                format!("{indent}-")
            } else {
                format!("{indent}- {rest}")
            };
            (rendered, "unordered_list_marker")
        } else if let Some(captures) = ORDERED_LIST_RE.captures(line) {
            let indent = " ".repeat(indent_depth(&captures[1]) * 4);
            let rest = normalize_inline_markup(captures[2].trim_start());
            let rendered = if rest.is_empty() {
                format!("{indent}1.")
            } else {
                format!("{indent}1. {rest}")
            };
            (rendered, "ordered_list_marker")
        } else {
            break;
        };

        if normalized != line.trim_end() {
            bump(stats, stat_key, 1);
        }
        output.push(normalized);
        i += 1;
    }
    i - start
}

/// Map leading whitespace to a logical nesting depth: tabs expand to four
/// spaces; clean multiples of four nest directly, anything else rounds up
/// by half-steps.
fn indent_depth(indent: &str) -> usize {
    let expanded = indent.replace('\t', "    ");
    let len = expanded.chars().count();
    if len == 0 {
        0
    } else if len % 4 == 0 {
        len / 4
    } else {
        (len.div_ceil(2)).max(1)
    }
}

/// True when the line begins a new structural block, ending any paragraph.
fn is_block_start(lines: &[&str], index: usize) -> bool {
    let line = lines[index];
    if match_fence_start(line).is_some()
        || is_blockquote_line(line)
        || is_list_item_line(line)
    {
        return true;
    }
    let stripped = line.trim();
    ATX_HEADING_RE.is_match(stripped)
        || looks_like_horizontal_rule(stripped)
        || is_setext_heading(lines, index)
}

fn is_list_item_line(line: &str) -> bool {
    UNORDERED_LIST_RE.is_match(line) || ORDERED_LIST_RE.is_match(line)
}

/// Collapse runs of spaces and tabs into single spaces and trim the ends.
fn collapse_spaces(text: &str) -> String {
    SPACE_RUN_RE.replace_all(text, " ").trim().to_string()
}

/// Reduce runs of blank lines to at most one and drop trailing blanks.
fn squash_blank_lines(lines: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_empty()
            && result.last().is_some_and(|last| last.is_empty())
        {
            continue;
        }
        result.push(line);
    }
    while result.last().is_some_and(|last| last.is_empty()) {
        result.pop();
    }
    result
}

fn is_table_block_start(lines: &[&str], index: usize) -> bool {
    index + 1 < lines.len()
        && looks_like_table_row(lines[index])
        && is_table_separator_line(lines[index + 1])
}

/// Re-emit a table block with padded `| cell |` rows and canonical
/// separator cells. Returns the number of source lines consumed.
fn normalize_table_block(
    lines: &[&str],
    start: usize,
    output: &mut Vec<String>,
    stats: &mut TransformStats,
) -> usize {
    let mut i = start;
    while i < lines.len() {
        let stripped = lines[i].trim();
        if stripped.is_empty()
            || !(looks_like_table_row(stripped) || is_table_separator_line(stripped))
        {
            break;
        }

        if is_table_separator_line(stripped) {
            let normalized = normalize_table_separator_line(stripped);
            if normalized != stripped {
                bump(stats, "table_separator", 1);
            }
            output.push(normalized);
        } else {
            let normalized = normalize_table_row_line(stripped);
            if normalized != stripped {
                bump(stats, "table_cells", 1);
            }
            output.push(normalized);
        }
        i += 1;
    }
    i - start
}

fn looks_like_table_row(line: &str) -> bool {
    let stripped = line.trim();
    !stripped.is_empty() && !stripped.starts_with('`') && stripped.contains('|')
}

fn is_table_separator_line(line: &str) -> bool {
    TABLE_SEPARATOR_RE.is_match(line.trim())
}

fn normalize_table_row_line(line: &str) -> String {
    let cells: Vec<String> = split_table_cells(line)
        .iter()
        .map(|cell| normalize_inline_markup(cell.trim()))
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn normalize_table_separator_line(line: &str) -> String {
    let cells: Vec<String> = split_table_cells(line)
        .iter()
        .map(|cell| normalize_table_separator_cell(cell))
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn split_table_cells(line: &str) -> Vec<&str> {
    let mut stripped = line.trim();
    stripped = stripped.strip_prefix('|').unwrap_or(stripped);
    stripped = stripped.strip_suffix('|').unwrap_or(stripped);
    stripped.split('|').collect()
}

/// Canonicalize one separator cell: at least three dashes, alignment colons
/// preserved.
fn normalize_table_separator_cell(cell: &str) -> String {
    let stripped = cell.trim();
    let align_left = stripped.starts_with(':');
    let align_right = stripped.ends_with(':') && !stripped.is_empty();
    let dashes = "-".repeat(stripped.matches('-').count().max(3));
    match (align_left, align_right) {
        (true, true) => format!(":{dashes}:"),
        (true, false) => format!(":{dashes}"),
        (false, true) => format!("{dashes}:"),
        (false, false) => dashes,
    }
}

/// Re-emit an ATX heading with a single space after the marker and without
/// trailing `#` decoration.
fn normalize_atx_heading(line: &str) -> String {
    let stripped = line.trim();
    let Some(captures) = ATX_HEADING_RE.captures(stripped) else {
        return stripped.to_string();
    };
    let marker = &captures[1];
    let body = captures.get(2).map_or("", |m| m.as_str()).trim();
    let body = ATX_TRAILING_DECORATION_RE.replace(body, "");
    let body = if body.is_empty() {
        String::new()
    } else {
        collapse_spaces(&body)
    };
    format!("{marker} {body}").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn blocks(text: &str) -> (String, TransformStats) {
        let mut stats = TransformStats::new();
        let result = normalize_blocks(text, &mut stats);
        (result, stats)
    }

    #[rstest]
    #[case("***", true)]
    #[case("- - -", true)]
    #[case("___", true)]
    #[case("*-*", true)]
    #[case("--", false)]
    #[case("-- x", false)]
    fn horizontal_rule_detection(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(looks_like_horizontal_rule(line), expected);
    }

    #[test]
    fn setext_headings_become_atx() {
        let (text, stats) = blocks("Title\n=====\n\nSubtitle\n-----");
        assert_eq!(text, "# Title\n\n## Subtitle");
        assert_eq!(stats["setext_to_atx"], 2);
    }

    #[test]
    fn atx_headings_lose_decoration_and_extra_spaces() {
        let (text, _) = blocks("##   Wide    Title   ###");
        assert_eq!(text, "## Wide Title");
    }

    #[test]
    fn list_markers_are_flattened() {
        let (text, stats) = blocks("* a\n+ b\n- c\n2. d\n3) e");
        assert_eq!(text, "- a\n- b\n- c\n1. d\n1. e");
        assert_eq!(stats["unordered_list_marker"], 2);
        assert_eq!(stats["ordered_list_marker"], 2);
    }

    #[rstest]
    #[case("", 0)]
    #[case("    ", 1)]
    #[case("        ", 2)]
    #[case("\t", 1)]
    #[case("  ", 1)]
    #[case("   ", 2)]
    #[case("      ", 3)]
    fn indent_depths(#[case] indent: &str, #[case] expected: usize) {
        assert_eq!(indent_depth(indent), expected);
    }

    #[test]
    fn fences_are_canonicalized_and_bodies_kept_verbatim() {
        let (text, stats) = blocks("~~~~python\nx = 1\n  indented\n~~~~");
        assert_eq!(text, "``` python\nx = 1\n  indented\n```");
        assert_eq!(stats["code_fence_marker"], 2);
    }

    #[test]
    fn any_run_of_the_fence_character_closes_the_fence() {
        let (text, _) = blocks("````\ncode\n```\nmore\n````");
        assert_eq!(text, "```\ncode\n```\nmore\n```\n```");

        let (again, _) = blocks(&text);
        assert_eq!(again, text);
    }

    #[test]
    fn unterminated_fences_are_closed() {
        let (text, stats) = blocks("```rust\nlet x = 1;");
        assert_eq!(text, "``` rust\nlet x = 1;\n```");
        assert_eq!(stats["code_fence_marker"], 1);
    }

    #[test]
    fn paragraphs_join_and_collapse_whitespace() {
        let (text, _) = blocks("Paragraph spread\nacross   lines.");
        assert_eq!(text, "Paragraph spread across lines.");
    }

    #[test]
    fn blockquotes_are_peeled_and_reprefixed() {
        let (text, _) = blocks(">  quoted   text\n> more");
        assert_eq!(text, "> quoted text more");

        let (nested, _) = blocks("> > inner");
        assert_eq!(nested, ">> inner");
    }

    #[test]
    fn table_blocks_are_padded_and_aligned() {
        let (text, stats) = blocks("|a|b|\n|:-|-:|\n|1|2|");
        assert_eq!(text, "| a | b |\n| :--- | ---: |\n| 1 | 2 |");
        assert!(stats["table_cells"] >= 1);
        assert_eq!(stats["table_separator"], 1);
    }

    #[test]
    fn blank_runs_collapse_to_one() {
        let (text, _) = blocks("a\n\n\n\nb");
        assert_eq!(text, "a\n\nb");
    }
}
