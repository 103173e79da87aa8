//! The diff command
//!
//! Loads the two inputs, runs the comparison pipeline, and writes the
//! rendered output. Text output goes through the pager when stdout is a
//! terminal; everything else goes straight to stdout.

use crate::artifacts::core::PagerWriter;
use crate::artifacts::error::MdiffError;
use crate::artifacts::model::{DiffResult, InlineDiffConfig};
use crate::render::{HtmlLayout, HtmlRenderOptions, render_html, render_unified_colored};
use anyhow::{Context, bail};
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::{Read, Write};
use std::path::Path;

/// How the diff is presented on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    HtmlSplit,
    HtmlUnified,
}

/// Resolved options for one diff invocation.
pub struct DiffOptions {
    pub left: String,
    pub right: String,
    pub context: Option<i64>,
    pub inline_config: Option<InlineDiffConfig>,
    pub format: OutputFormat,
}

/// Run the diff command. Returns true when the documents differ.
pub fn run(options: &DiffOptions) -> anyhow::Result<bool> {
    if options.left == "-" && options.right == "-" {
        bail!("cannot read both inputs from stdin");
    }

    let (left_text, left_id) = load_input(&options.left)?;
    let (right_text, right_id) = load_input(&options.right)?;

    let result = crate::artifacts::diff::line::diff(
        left_text.as_str(),
        right_text.as_str(),
        &left_id,
        &right_id,
        options.inline_config,
        options.context,
    )?;

    if result.has_changes() {
        let output = match options.format {
            OutputFormat::Text => render_unified_colored(&result),
            OutputFormat::HtmlSplit => render_layout(&result, HtmlLayout::Split),
            OutputFormat::HtmlUnified => render_layout(&result, HtmlLayout::Unified),
        };
        write_output(&output, options.format)?;
    }
    Ok(result.has_changes())
}

fn render_layout(result: &DiffResult, layout: HtmlLayout) -> String {
    let options = HtmlRenderOptions {
        layout,
        ..HtmlRenderOptions::default()
    };
    render_html(result, &options)
}

/// Read one input, from stdin when the identifier is `-`.
fn load_input(identifier: &str) -> anyhow::Result<(String, String)> {
    if identifier == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok((text, "stdin".to_string()));
    }

    let path = Path::new(identifier);
    if path.exists() && !path.is_file() {
        return Err(MdiffError::UnsupportedInput(identifier.to_string()).into());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {identifier}"))?;
    Ok((text, identifier.to_string()))
}

/// Only the text format is paged; HTML is meant to be redirected and goes
/// straight to stdout even on a terminal.
fn uses_pager(format: OutputFormat, terminal: bool) -> bool {
    format == OutputFormat::Text && terminal
}

fn write_output(output: &str, format: OutputFormat) -> anyhow::Result<()> {
    if uses_pager(format, std::io::stdout().is_terminal()) {
        let pager = Pager::new();
        let mut writer = PagerWriter::new(pager.clone());
        writer.write_all(output.as_bytes())?;
        if !output.ends_with('\n') {
            writeln!(writer)?;
        }
        minus::page_all(pager)?;
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(output.as_bytes())?;
        if !output.ends_with('\n') {
            writeln!(handle)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OutputFormat::Text, true, true)]
    #[case(OutputFormat::Text, false, false)]
    #[case(OutputFormat::HtmlSplit, true, false)]
    #[case(OutputFormat::HtmlUnified, true, false)]
    fn only_terminal_text_output_is_paged(
        #[case] format: OutputFormat,
        #[case] terminal: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(uses_pager(format, terminal), expected);
    }
}
