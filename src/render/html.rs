//! HTML rendering
//!
//! Emits the diff as a self-contained `<div>` with namespaced CSS
//! classes and data attributes, in either a split (side by side) or a
//! unified (single column) layout. The default stylesheet is optional
//! and keyed off the same class prefix, so multiple diffs with
//! different prefixes can share a page.

use crate::artifacts::model::{ChangeType, DiffLine, DiffResult, InlineDiffSegment};
use std::fmt::Write;

const DEFAULT_CLASS_PREFIX: &str = "mdiff";

/// Layout of the rendered diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HtmlLayout {
    #[default]
    Split,
    Unified,
}

impl HtmlLayout {
    fn as_str(self) -> &'static str {
        match self {
            HtmlLayout::Split => "split",
            HtmlLayout::Unified => "unified",
        }
    }
}

/// Tunable options for HTML diff rendering.
#[derive(Debug, Clone)]
pub struct HtmlRenderOptions {
    pub include_styles: bool,
    pub class_prefix: String,
    pub show_line_numbers: bool,
    pub layout: HtmlLayout,
}

impl Default for HtmlRenderOptions {
    fn default() -> Self {
        Self {
            include_styles: true,
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
            show_line_numbers: true,
            layout: HtmlLayout::Split,
        }
    }
}

/// Render a diff result as annotated HTML.
pub fn render_html(result: &DiffResult, options: &HtmlRenderOptions) -> String {
    let classes = ClassRegistry::new(&options.class_prefix);
    let mut html = String::new();

    if options.include_styles {
        let stylesheet = default_html_styles(&classes.prefix);
        let _ = write!(html, r#"<style type="text/css">{stylesheet}</style>"#);
    }

    let mut root_attrs = format!(
        r#"class="{} {}""#,
        classes.root,
        classes.root_layout(options.layout)
    );
    if let Some(context) = result.context {
        let _ = write!(root_attrs, r#" data-context="{context}""#);
    }
    let _ = write!(html, "<div {root_attrs}>");

    for line in &result.lines {
        match options.layout {
            HtmlLayout::Split => render_split_line(&mut html, line, &classes, options),
            HtmlLayout::Unified => render_unified_line(&mut html, line, &classes, options),
        }
    }

    html.push_str("</div>");
    html
}

fn render_split_line(
    html: &mut String,
    line: &DiffLine,
    classes: &ClassRegistry,
    options: &HtmlRenderOptions,
) {
    if line.kind() == ChangeType::Skipped {
        render_hunk_line(html, line, classes);
        return;
    }

    push_line_open(html, line.kind(), line.left_lineno(), line.right_lineno(), classes);
    push_gutters(html, line.left_lineno(), line.right_lineno(), classes, options);
    push_side_content(html, line, Side::Left, classes);
    push_side_content(html, line, Side::Right, classes);
    html.push_str("</div>");
}

fn render_unified_line(
    html: &mut String,
    line: &DiffLine,
    classes: &ClassRegistry,
    options: &HtmlRenderOptions,
) {
    if line.kind() == ChangeType::Skipped {
        render_hunk_line(html, line, classes);
        return;
    }

    push_line_open(html, line.kind(), line.left_lineno(), line.right_lineno(), classes);
    push_gutters(html, line.left_lineno(), line.right_lineno(), classes, options);

    let content = unified_content(line, classes);
    let mut content_classes = format!("{} {}", classes.content, classes.content_unified);
    if content.trim().is_empty() {
        content_classes.push(' ');
        content_classes.push_str(&classes.content_empty);
    }
    let _ = write!(html, r#"<span class="{content_classes}">{content}</span>"#);
    html.push_str("</div>");
}

fn render_hunk_line(html: &mut String, line: &DiffLine, classes: &ClassRegistry) {
    let text = line
        .left_text()
        .or_else(|| line.right_text())
        .unwrap_or("")
        .trim_end_matches('\n');
    let left = line.left_lineno().map_or(String::new(), |n| n.to_string());
    let right = line.right_lineno().map_or(String::new(), |n| n.to_string());
    let _ = write!(
        html,
        r#"<div class="{}" data-change-kind="skipped" data-left-start="{left}" data-right-start="{right}">{}</div>"#,
        classes.hunk,
        escape(text)
    );
}

fn push_line_open(
    html: &mut String,
    kind: ChangeType,
    left_lineno: Option<usize>,
    right_lineno: Option<usize>,
    classes: &ClassRegistry,
) {
    let _ = write!(
        html,
        r#"<div class="{} {}" data-change-kind="{}""#,
        classes.line,
        classes.line_kind(kind),
        kind.as_str()
    );
    if let Some(lineno) = left_lineno {
        let _ = write!(html, r#" data-left-lineno="{lineno}""#);
    }
    if let Some(lineno) = right_lineno {
        let _ = write!(html, r#" data-right-lineno="{lineno}""#);
    }
    html.push('>');
}

fn push_gutters(
    html: &mut String,
    left_lineno: Option<usize>,
    right_lineno: Option<usize>,
    classes: &ClassRegistry,
    options: &HtmlRenderOptions,
) {
    if options.show_line_numbers {
        push_gutter(html, left_lineno, Side::Left, classes, false);
        push_gutter(html, right_lineno, Side::Right, classes, false);
    } else {
        push_gutter(html, None, Side::Left, classes, true);
        push_gutter(html, None, Side::Right, classes, true);
    }
}

fn push_gutter(
    html: &mut String,
    value: Option<usize>,
    side: Side,
    classes: &ClassRegistry,
    hidden: bool,
) {
    let mut gutter_classes = format!("{} {}", classes.gutter, classes.gutter_side(side));
    if hidden {
        gutter_classes.push(' ');
        gutter_classes.push_str(&classes.gutter_hidden);
    }
    if value.is_none() {
        gutter_classes.push(' ');
        gutter_classes.push_str(&classes.gutter_empty);
    }
    match value {
        Some(number) => {
            let _ = write!(
                html,
                r#"<span class="{gutter_classes}" data-lineno="{number}">{number}</span>"#
            );
        }
        None => {
            let _ = write!(html, r#"<span class="{gutter_classes}"></span>"#);
        }
    }
}

fn push_side_content(html: &mut String, line: &DiffLine, side: Side, classes: &ClassRegistry) {
    let rendered = if line.is_edited() {
        let segments = inline_segments(line, side, classes, true);
        if segments.is_empty() {
            escape(side_text(line, side))
        } else {
            segments
        }
    } else {
        escape(side_text(line, side))
    };

    let mut content_classes = format!("{} {}", classes.content, classes.content_side(side));
    if rendered.is_empty() {
        content_classes.push(' ');
        content_classes.push_str(&classes.content_empty);
    }
    let _ = write!(html, r#"<span class="{content_classes}">{rendered}</span>"#);
}

fn unified_content(line: &DiffLine, classes: &ClassRegistry) -> String {
    match line.kind() {
        ChangeType::Edited => combined_segments(line, classes),
        ChangeType::Deleted => escape(&strip_newlines(line.left_text().unwrap_or(""))),
        ChangeType::Inserted => escape(&strip_newlines(line.right_text().unwrap_or(""))),
        _ => {
            let text = line.right_text().or_else(|| line.left_text()).unwrap_or("");
            escape(&strip_newlines(text))
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

fn side_text<'a>(line: &'a DiffLine, side: Side) -> &'a str {
    match side {
        Side::Left => line.left_text().unwrap_or(""),
        Side::Right => line.right_text().unwrap_or(""),
    }
}

/// One `<span>` per visible segment on the requested side of an edited
/// line. When `include_newline` is false, bare newline segments are
/// dropped so the unified column stays single-line.
fn inline_segments(
    line: &DiffLine,
    side: Side,
    classes: &ClassRegistry,
    include_newline: bool,
) -> String {
    let mut html = String::new();
    for segment in line.segments() {
        let Some(text) = segment_text(segment, side) else {
            continue;
        };
        let mut text = text.to_string();
        if !include_newline {
            if text == "\n" {
                continue;
            }
            if text.ends_with('\n') {
                text = text.trim_end_matches('\n').to_string();
                if text.is_empty() {
                    continue;
                }
            }
        }
        let _ = write!(
            html,
            r#"<span class="{} {} {}">{}</span>"#,
            classes.segment,
            classes.segment_kind(segment_display_kind(segment, side)),
            classes.segment_side(side),
            escape(&text)
        );
    }
    html
}

fn segment_display_kind(segment: &InlineDiffSegment, side: Side) -> ChangeType {
    if segment.kind == ChangeType::Edited {
        match side {
            Side::Left => ChangeType::Deleted,
            Side::Right => ChangeType::Inserted,
        }
    } else {
        segment.kind
    }
}

fn segment_text<'a>(segment: &'a InlineDiffSegment, side: Side) -> Option<&'a str> {
    match side {
        Side::Left if segment.kind == ChangeType::Inserted => None,
        Side::Left => Some(&segment.left_text),
        Side::Right if segment.kind == ChangeType::Deleted => None,
        Side::Right => Some(&segment.right_text),
    }
}

/// Edited lines in the unified layout show deletions and insertions in a
/// single combined run of segments.
fn combined_segments(line: &DiffLine, classes: &ClassRegistry) -> String {
    let mut html = String::new();
    for segment in line.segments() {
        match segment.kind {
            ChangeType::Unchanged => {
                let text = if segment.right_text.is_empty() {
                    &segment.left_text
                } else {
                    &segment.right_text
                };
                push_combined_span(&mut html, &strip_newlines(text), ChangeType::Unchanged, None, classes);
            }
            ChangeType::Inserted => {
                push_combined_span(
                    &mut html,
                    &strip_newlines(&segment.right_text),
                    ChangeType::Inserted,
                    Some(Side::Right),
                    classes,
                );
            }
            ChangeType::Deleted => {
                push_combined_span(
                    &mut html,
                    &strip_newlines(&segment.left_text),
                    ChangeType::Deleted,
                    Some(Side::Left),
                    classes,
                );
            }
            ChangeType::Edited => {
                push_combined_span(
                    &mut html,
                    &strip_newlines(&segment.left_text),
                    ChangeType::Deleted,
                    Some(Side::Left),
                    classes,
                );
                push_combined_span(
                    &mut html,
                    &strip_newlines(&segment.right_text),
                    ChangeType::Inserted,
                    Some(Side::Right),
                    classes,
                );
            }
            ChangeType::Skipped => {}
        }
    }
    html
}

fn push_combined_span(
    html: &mut String,
    text: &str,
    kind: ChangeType,
    side: Option<Side>,
    classes: &ClassRegistry,
) {
    if text.is_empty() {
        return;
    }
    let mut span_classes = format!("{} {}", classes.segment, classes.segment_kind(kind));
    if let Some(side) = side {
        span_classes.push(' ');
        span_classes.push_str(&classes.segment_side(side));
    }
    let _ = write!(html, r#"<span class="{span_classes}">{}</span>"#, escape(text));
}

fn strip_newlines(text: &str) -> String {
    text.replace('\n', "")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Namespaced CSS class names derived from one prefix.
struct ClassRegistry {
    prefix: String,
    root: String,
    hunk: String,
    line: String,
    segment: String,
    gutter: String,
    content: String,
    content_empty: String,
    content_unified: String,
    gutter_empty: String,
    gutter_hidden: String,
}

impl ClassRegistry {
    fn new(prefix: &str) -> Self {
        let prefix = normalize_prefix(prefix);
        Self {
            root: format!("{prefix}-diff"),
            hunk: format!("{prefix}-hunk"),
            line: format!("{prefix}-line"),
            segment: format!("{prefix}-segment"),
            gutter: format!("{prefix}-gutter"),
            content: format!("{prefix}-content"),
            content_empty: format!("{prefix}-content--empty"),
            content_unified: format!("{prefix}-content--unified"),
            gutter_empty: format!("{prefix}-gutter--empty"),
            gutter_hidden: format!("{prefix}-gutter--hidden"),
            prefix,
        }
    }

    fn root_layout(&self, layout: HtmlLayout) -> String {
        format!("{}-diff--layout-{}", self.prefix, layout.as_str())
    }

    fn line_kind(&self, kind: ChangeType) -> String {
        format!("{}-line--{}", self.prefix, kind.as_str())
    }

    fn gutter_side(&self, side: Side) -> String {
        format!("{}-gutter--{}", self.prefix, side.as_str())
    }

    fn content_side(&self, side: Side) -> String {
        format!("{}-content--{}", self.prefix, side.as_str())
    }

    fn segment_kind(&self, kind: ChangeType) -> String {
        format!("{}-segment--{}", self.prefix, kind.as_str())
    }

    fn segment_side(&self, side: Side) -> String {
        format!("{}-segment--side-{}", self.prefix, side.as_str())
    }
}

/// Keep only characters valid in a CSS class name; an empty result falls
/// back to the default prefix.
fn normalize_prefix(prefix: &str) -> String {
    let sanitized: String = prefix
        .trim()
        .chars()
        .filter(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_'))
        .collect();
    if sanitized.is_empty() {
        DEFAULT_CLASS_PREFIX.to_string()
    } else {
        sanitized
    }
}

/// The default CSS used by [`render_html`], namespaced by `class_prefix`.
pub fn default_html_styles(class_prefix: &str) -> String {
    let prefix = normalize_prefix(class_prefix);
    format!(
        r#".{prefix}-diff {{
  font-family: var(--{prefix}-font, SFMono-Regular, Menlo, Monaco, Consolas, "Liberation Mono", "Courier New", monospace);
  font-size: 13px;
  line-height: 1.45;
  color: var(--{prefix}-foreground, #1f2933);
  background: var(--{prefix}-background, #f8f9fb);
  border: 1px solid var(--{prefix}-border, #d2d6dc);
  border-radius: 6px;
  overflow: auto;
}}
.{prefix}-hunk {{
  padding: 4px 12px;
  background: var(--{prefix}-hunk-background, #e5edff);
  color: var(--{prefix}-hunk-foreground, #1e3a8a);
  font-weight: 600;
  border-bottom: 1px solid var(--{prefix}-border, #d2d6dc);
  white-space: pre;
}}
.{prefix}-line {{
  display: grid;
  gap: 8px;
  padding: 2px 12px;
  align-items: start;
  border-bottom: 1px solid var(--{prefix}-divider, #eaecf0);
  white-space: pre-wrap;
  word-break: break-word;
}}
.{prefix}-diff--layout-split .{prefix}-line {{
  grid-template-columns: minmax(3ch, auto) minmax(3ch, auto) 1fr 1fr;
}}
.{prefix}-diff--layout-unified .{prefix}-line {{
  grid-template-columns: minmax(3ch, auto) minmax(3ch, auto) minmax(2ch, auto) 1fr;
}}
.{prefix}-line:last-child {{
  border-bottom: none;
}}
.{prefix}-line--unchanged {{
  background: var(--{prefix}-unchanged-background, transparent);
}}
.{prefix}-line--inserted {{
  background: var(--{prefix}-inserted-background, #e6ffed);
}}
.{prefix}-line--deleted {{
  background: var(--{prefix}-deleted-background, #ffeef0);
}}
.{prefix}-line--edited {{
  background: var(--{prefix}-edited-background, #fff8e1);
}}
.{prefix}-gutter {{
  font-variant-numeric: tabular-nums;
  text-align: right;
  color: var(--{prefix}-gutter-foreground, #6b7280);
  min-width: 3ch;
}}
.{prefix}-gutter--hidden {{
  visibility: hidden;
}}
.{prefix}-gutter--empty::before {{
  content: '\00a0';
}}
.{prefix}-content {{
  white-space: inherit;
}}
.{prefix}-content--left, .{prefix}-content--right {{
  white-space: inherit;
}}
.{prefix}-content--unified {{
  white-space: inherit;
}}
.{prefix}-content--empty {{
  color: var(--{prefix}-empty-foreground, #9ca3af);
}}
.{prefix}-segment {{
  white-space: inherit;
}}
.{prefix}-segment--unchanged {{
  background: transparent;
  color: inherit;
}}
.{prefix}-segment--inserted {{
  background: var(--{prefix}-segment-inserted, #bbf7d0);
  color: var(--{prefix}-segment-inserted-foreground, #065f46);
}}
.{prefix}-segment--deleted {{
  background: var(--{prefix}-segment-deleted, #fecdd3);
  color: var(--{prefix}-segment-deleted-foreground, #9f1239);
  text-decoration-line: line-through;
  text-decoration-thickness: 2px;
  text-decoration-color: currentColor;
}}
.{prefix}-segment--edited {{
  background: var(--{prefix}-segment-edited, #fde68a);
  color: var(--{prefix}-segment-edited-foreground, #92400e);
}}
.{prefix}-segment--side-left {{
  white-space: inherit;
}}
.{prefix}-segment--side-right {{
  white-space: inherit;
}}
.{prefix}-line--skipped {{
  background: var(--{prefix}-skipped-background, #f3f4f6);
  color: var(--{prefix}-skipped-foreground, #4b5563);
}}
"#
    )
}
