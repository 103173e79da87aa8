//! Normalization-aware Markdown diffing.
//!
//! Documents are first canonicalized (headings, list markers, fences,
//! emphasis, whitespace), then compared line by line; similar replaced
//! lines are refined into word-level segments, and the result can be
//! reduced to context hunks. Cosmetic Markdown differences never show
//! up as changes.
//!
//! ```
//! use mdiff::{diff, render_unified};
//!
//! # fn main() -> mdiff::Result<()> {
//! let result = diff("# One\n", "# Two\n", "a.md", "b.md", None, None)?;
//! if result.has_changes() {
//!     print!("{}", render_unified(&result));
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod commands;
pub mod render;

pub use artifacts::diff::line::{diff, diff_normalized};
pub use artifacts::error::{MdiffError, Result};
pub use artifacts::model::{
    ChangeType, DiffLine, DiffResult, InlineDiffConfig, InlineDiffSegment,
    NormalizationMetadata, NormalizedDocument,
};
pub use artifacts::normalize::{DocumentSource, normalize};
pub use render::{
    HtmlLayout, HtmlRenderOptions, default_html_styles, render_html, render_unified,
    render_unified_colored,
};
