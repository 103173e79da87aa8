//! Document normalization pipeline
//!
//! Turns raw Markdown input into a [`NormalizedDocument`]: line endings
//! unified, BOM stripped, block structure canonicalized, inline emphasis
//! rewritten, blank edges trimmed, and a SHA-256 digest taken over the
//! canonical text. Normalizing an already normalized document is a no-op.

mod block;
mod inline_markup;

use crate::artifacts::error::{MdiffError, Result};
use crate::artifacts::model::{NormalizationMetadata, NormalizedDocument};
use sha2::{Digest, Sha256};
use std::io::Read;

/// Raw input accepted by [`normalize`].
pub enum DocumentSource<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
    Reader(Box<dyn Read + 'a>),
}

impl<'a> From<&'a str> for DocumentSource<'a> {
    fn from(text: &'a str) -> Self {
        DocumentSource::Text(text)
    }
}

impl<'a> From<&'a String> for DocumentSource<'a> {
    fn from(text: &'a String) -> Self {
        DocumentSource::Text(text)
    }
}

impl<'a> From<&'a [u8]> for DocumentSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        DocumentSource::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for DocumentSource<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        DocumentSource::Bytes(bytes)
    }
}

impl<'a, R: Read + 'a> From<Box<R>> for DocumentSource<'a> {
    fn from(reader: Box<R>) -> Self {
        DocumentSource::Reader(reader)
    }
}

/// Normalize one Markdown document into its canonical form.
///
/// `source_id` labels the document in diff output; it carries no meaning
/// for normalization itself.
pub fn normalize<'a>(
    source: impl Into<DocumentSource<'a>>,
    source_id: &str,
) -> Result<NormalizedDocument> {
    let raw = coerce_text(source.into())?;

    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let body = unified.trim_start_matches('\u{feff}');
    let original_length = body.chars().count();

    let mut transformations = block::TransformStats::new();
    let canonical = block::normalize_blocks(body, &mut transformations);
    let canonical = trim_blank_ends(&canonical);
    let canonical = ensure_trailing_newline(canonical);

    let lines = split_keepends(&canonical);
    let digest = hex_digest(&canonical);
    let metadata = NormalizationMetadata::new(
        original_length,
        canonical.chars().count(),
        transformations,
    );

    Ok(NormalizedDocument {
        source_id: source_id.to_string(),
        lines,
        metadata,
        digest,
    })
}

fn coerce_text(source: DocumentSource<'_>) -> Result<String> {
    match source {
        DocumentSource::Text(text) => Ok(text.to_string()),
        DocumentSource::Bytes(bytes) => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(MdiffError::Decoding),
        DocumentSource::Reader(mut reader) => {
            let mut buffer = Vec::new();
            reader.read_to_end(&mut buffer)?;
            String::from_utf8(buffer).map_err(|err| MdiffError::Decoding(err.utf8_error()))
        }
    }
}

/// Drop blank lines from both edges of the document body.
fn trim_blank_ends(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.first().is_some_and(|line| line.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Every non-empty canonical document ends with exactly one newline; an
/// empty document is a single newline.
fn ensure_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Split into lines that keep their terminating newline, so that line
/// content round-trips through concatenation.
fn split_keepends(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (index, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            lines.push(text[start..=index].to_string());
            start = index + 1;
        }
    }
    if start < text.len() {
        lines.push(text[start..].to_string());
    }
    lines
}

fn hex_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn normalization_is_idempotent() {
        let first = normalize("Title\n=====\n\n* item one\n+ item   two\n", "doc").unwrap();
        let second = normalize(first.text().as_str(), "doc").unwrap();
        assert_eq!(first.text(), second.text());
        assert_eq!(first.digest, second.digest);
        assert!(second.metadata.transformations.is_empty());
    }

    #[test]
    fn long_fence_with_interior_backtick_run_stays_stable() {
        let first = normalize("````\ncode\n```\nmore\n````\n", "doc").unwrap();
        assert_eq!(first.text(), "```\ncode\n```\nmore\n```\n```\n");

        let second = normalize(first.text().as_str(), "doc").unwrap();
        assert_eq!(first.text(), second.text());
        assert_eq!(first.digest, second.digest);
    }

    #[test]
    fn setext_heading_and_paragraph_wrap() {
        let doc = normalize("Title\n=====\n\nParagraph spread\nacross lines.\n", "doc").unwrap();
        assert_eq!(doc.text(), "# Title\n\nParagraph spread across lines.\n");
    }

    #[test]
    fn byte_input_and_marker_stats() {
        let doc = normalize(b"- a\n* b\n", "doc").unwrap();
        assert_eq!(doc.text(), "- a\n- b\n");
        assert!(doc.metadata.transformations["unordered_list_marker"] >= 1);
    }

    #[rstest]
    #[case("")]
    #[case("\n\n\n")]
    #[case("   \n \n")]
    fn blank_documents_normalize_to_a_single_newline(#[case] input: &str) {
        let doc = normalize(input, "doc").unwrap();
        assert_eq!(doc.text(), "\n");
        assert_eq!(doc.lines, vec!["\n"]);
    }

    #[test]
    fn crlf_and_bom_are_removed() {
        let doc = normalize("\u{feff}alpha\r\nbeta\r", "doc").unwrap();
        assert_eq!(doc.text(), "alpha beta\n");
        // Measured once line endings are unified and the BOM is gone.
        assert_eq!(doc.metadata.original_length, "alpha\nbeta\n".chars().count());
    }

    #[test]
    fn digest_is_lowercase_hex_over_canonical_text() {
        let a = normalize("# Title\n", "left").unwrap();
        let b = normalize("#   Title   #\n", "right").unwrap();
        assert_eq!(a.digest.len(), 64);
        assert!(a.digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a.digest, b.digest);
    }

    #[test]
    fn invalid_utf8_is_a_decoding_error() {
        let result = normalize(&[0xff, 0xfe, 0x00][..], "doc");
        assert!(matches!(result, Err(MdiffError::Decoding(_))));
    }

    #[test]
    fn reader_input_is_supported() {
        let reader = Box::new(std::io::Cursor::new(b"# Hi\n".to_vec()));
        let doc = normalize(reader, "doc").unwrap();
        assert_eq!(doc.text(), "# Hi\n");
    }

    #[test]
    fn lines_concatenate_back_to_the_text() {
        let doc = normalize("a\n\nb\n", "doc").unwrap();
        assert_eq!(doc.lines.concat(), doc.text());
    }

    #[test]
    fn metadata_tracks_lengths() {
        let doc = normalize("x  y\n", "doc").unwrap();
        assert_eq!(doc.metadata.original_length, 5);
        assert_eq!(doc.metadata.normalized_length, 4);
    }
}
