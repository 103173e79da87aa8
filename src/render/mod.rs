//! Presentation of diff results
//!
//! Two renderers over the structured [`DiffResult`]: plain or colored
//! unified text for terminals, and annotated HTML for embedding.
//!
//! [`DiffResult`]: crate::artifacts::model::DiffResult

pub mod html;
pub mod text;

pub use html::{HtmlLayout, HtmlRenderOptions, default_html_styles, render_html};
pub use text::{render_unified, render_unified_colored};
