//! Inline markup canonicalization
//!
//! Rewrites `__strong__` to `**strong**` and `_em_` to `*em*` while leaving
//! code spans and backslash-escaped delimiters untouched. The emphasis
//! patterns need look-around (a delimiter only opens when not glued to a
//! word character, and only closes against non-space text), so the rewrite
//! is a small hand-rolled scanner rather than a regex.

use regex::Regex;
use std::sync::LazyLock;

static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`+[^`]+?`+").expect("inline code pattern"));

/// Canonicalize inline emphasis while respecting escapes.
pub(super) fn normalize_inline_markup(text: &str) -> String {
    if text.is_empty() || !text.contains('_') {
        return text.to_string();
    }

    // Code spans are stashed behind placeholders so their contents never
    // get rewritten, then restored at the end in insertion order.
    let mut placeholders: Vec<(String, String)> = Vec::new();
    let mut stashed = String::with_capacity(text.len());
    let mut last = 0;
    for found in INLINE_CODE_RE.find_iter(text) {
        let token = format!("@@CODE{}@@", placeholders.len());
        stashed.push_str(&text[last..found.start()]);
        stashed.push_str(&token);
        placeholders.push((token, found.as_str().to_string()));
        last = found.end();
    }
    stashed.push_str(&text[last..]);

    let mut rewritten = rewrite_emphasis(&stashed, 2, "**");
    rewritten = rewrite_emphasis(&rewritten, 1, "*");

    // A handful of adjacent-escape collisions collapse to one stable form.
    rewritten = rewritten
        .replace(r"\\*\_", r"\\_\_")
        .replace(r"\\_\*", r"\\_\_")
        .replace(r"\\*\*", r"\\_\_");

    for (token, original) in placeholders {
        rewritten = rewritten.replace(&token, &original);
    }
    rewritten
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn run_of_underscores(chars: &[char], at: usize, width: usize) -> bool {
    at + width <= chars.len() && chars[at..at + width].iter().all(|&c| c == '_')
}

/// Replace `_..._` (or `__...__`) delimiter pairs with `mark` on both sides.
///
/// A pair matches when the opener is not preceded by a word character, the
/// enclosed text starts and ends with non-space, and the closer is not
/// followed by a word character. The closer is the earliest valid one, and
/// a backslash directly before the opener suppresses the rewrite while
/// still consuming the matched span.
fn rewrite_emphasis(text: &str, width: usize, mark: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;

    while pos + 2 * width < chars.len() + 1 {
        if !run_of_underscores(&chars, pos, width)
            || (pos > 0 && is_word(chars[pos - 1]))
            || chars
                .get(pos + width)
                .is_none_or(|c| c.is_whitespace())
        {
            pos += 1;
            continue;
        }

        let inner_start = pos + width;
        let mut close = inner_start + 1;
        let mut matched = None;
        while close + width <= chars.len() {
            if run_of_underscores(&chars, close, width)
                && !chars[close - 1].is_whitespace()
                && chars.get(close + width).is_none_or(|&c| !is_word(c))
            {
                matched = Some(close);
                break;
            }
            close += 1;
        }

        let Some(close) = matched else {
            pos += 1;
            continue;
        };

        let end = close + width;
        if pos > 0 && chars[pos - 1] == '\\' {
            // Escaped delimiter: keep the span verbatim but do not rescan it.
            pos = end;
            continue;
        }

        out.extend(chars[copied..pos].iter());
        out.push_str(mark);
        out.extend(chars[inner_start..close].iter());
        out.push_str(mark);
        copied = end;
        pos = end;
    }

    out.extend(chars[copied..].iter());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("__bold__", "**bold**")]
    #[case("_em_", "*em*")]
    #[case("mix __bold__ and _em_", "mix **bold** and *em*")]
    #[case("snake_case_name stays", "snake_case_name stays")]
    #[case("no markup here", "no markup here")]
    #[case("", "")]
    fn rewrites_underscore_emphasis(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_inline_markup(input), expected);
    }

    #[test]
    fn code_spans_are_protected() {
        assert_eq!(
            normalize_inline_markup("use `_internal_` and _em_"),
            "use `_internal_` and *em*"
        );
        assert_eq!(normalize_inline_markup("`__raw__`"), "`__raw__`");
    }

    #[test]
    fn escaped_delimiters_are_left_alone() {
        assert_eq!(normalize_inline_markup(r"\_literal\_"), r"\_literal\_");
        assert_eq!(normalize_inline_markup(r"\__literal\__"), r"\__literal\__");
    }

    #[test]
    fn delimiters_must_hug_non_space_text() {
        assert_eq!(normalize_inline_markup("_ not em _"), "_ not em _");
        assert_eq!(normalize_inline_markup("a _b_ c"), "a *b* c");
    }

    #[test]
    fn unterminated_delimiters_pass_through() {
        assert_eq!(normalize_inline_markup("_dangling"), "_dangling");
        assert_eq!(normalize_inline_markup("__dangling"), "__dangling");
    }
}
