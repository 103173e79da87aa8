use mdiff::{ChangeType, diff, normalize};
use proptest::prelude::*;

/// Markdown-ish documents assembled from a mix of block shapes.
fn markdown_document_strategy() -> impl Strategy<Value = String> {
    let word = "[a-z]{1,8}";
    let words = proptest::collection::vec(word, 1..6).prop_map(|w| w.join(" "));

    let heading = (1..4usize, words.clone())
        .prop_map(|(level, text)| format!("{} {}", "#".repeat(level), text));
    let setext = words.clone().prop_map(|text| format!("{text}\n====="));
    let paragraph = proptest::collection::vec(words.clone(), 1..4).prop_map(|lines| lines.join("\n"));
    let list = (proptest::sample::select(vec!["-", "*", "+"]), words.clone())
        .prop_map(|(marker, text)| format!("{marker} {text}"));
    let quote = words.clone().prop_map(|text| format!("> {text}"));
    let fence = ("`{3,6}|~{3,6}", words.clone())
        .prop_map(|(marker, body)| format!("{marker}\n{body}\n{marker}"));

    let block = prop_oneof![heading, setext, paragraph, list, quote, fence];
    proptest::collection::vec(block, 1..8).prop_map(|blocks| {
        let mut doc = blocks.join("\n\n");
        doc.push('\n');
        doc
    })
}

proptest! {
    #[test]
    fn prop_normalization_is_idempotent(doc in markdown_document_strategy()) {
        let once = normalize(doc.as_str(), "doc").unwrap();
        let twice = normalize(once.text().as_str(), "doc").unwrap();
        prop_assert_eq!(once.text(), twice.text());
        prop_assert_eq!(once.digest, twice.digest);
    }

    #[test]
    fn prop_normalization_is_deterministic(doc in any::<String>()) {
        let first = normalize(doc.as_str(), "doc").unwrap();
        let second = normalize(doc.as_str(), "doc").unwrap();
        prop_assert_eq!(first.text(), second.text());
        prop_assert_eq!(first.digest, second.digest);
    }

    #[test]
    fn prop_normalized_lines_concatenate_to_the_text(doc in any::<String>()) {
        let normalized = normalize(doc.as_str(), "doc").unwrap();
        prop_assert_eq!(normalized.lines.concat(), normalized.text());
        prop_assert!(normalized.text().ends_with('\n'));
    }

    #[test]
    fn prop_self_diff_has_no_changes(doc in markdown_document_strategy()) {
        let result = diff(doc.as_str(), doc.as_str(), "left", "right", None, None).unwrap();
        prop_assert!(!result.has_changes());
        prop_assert!(result.lines.iter().all(|line| line.kind() == ChangeType::Unchanged));
    }

    #[test]
    fn prop_diff_line_counts_cover_both_documents(
        left in markdown_document_strategy(),
        right in markdown_document_strategy(),
    ) {
        let result = diff(left.as_str(), right.as_str(), "left", "right", None, None).unwrap();

        let left_lines = result
            .lines
            .iter()
            .filter(|line| line.left_lineno().is_some())
            .count();
        let right_lines = result
            .lines
            .iter()
            .filter(|line| line.right_lineno().is_some())
            .count();

        prop_assert_eq!(left_lines, result.left.lines.len());
        prop_assert_eq!(right_lines, result.right.lines.len());
    }
}
