use clap::Parser;
use mdiff::InlineDiffConfig;
use mdiff::commands::diff::{DiffOptions, OutputFormat, run};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "mdiff",
    version,
    about = "Unified Markdown diff with normalization-aware comparison",
    long_about = "Compares two Markdown documents after canonicalizing cosmetic \
    markup differences (heading styles, list markers, fence characters, emphasis \
    and whitespace), so only meaningful edits are reported.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(index = 1, help = "Path to the left (original) document, or '-' for stdin")]
    left: String,
    #[arg(index = 2, help = "Path to the right (updated) document, or '-' for stdin")]
    right: String,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Number of unchanged context lines to keep around differences"
    )]
    context: Option<i64>,
    #[arg(
        long,
        value_name = "RATIO",
        help = "Minimum real-quick similarity ratio for inline edits (default: 0.2)"
    )]
    inline_min_real_quick: Option<f64>,
    #[arg(
        long,
        value_name = "RATIO",
        help = "Minimum quick similarity ratio for inline edits (default: 0.3)"
    )]
    inline_min_quick: Option<f64>,
    #[arg(
        long,
        value_name = "RATIO",
        help = "Minimum similarity ratio for inline edits (default: 0.35)"
    )]
    inline_min_ratio: Option<f64>,
    #[arg(
        long,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for changes"
    )]
    format: OutputFormat,
}

impl Cli {
    fn inline_config(&self) -> Option<InlineDiffConfig> {
        if self.inline_min_real_quick.is_none()
            && self.inline_min_quick.is_none()
            && self.inline_min_ratio.is_none()
        {
            return None;
        }
        let defaults = InlineDiffConfig::default();
        Some(InlineDiffConfig {
            min_real_quick_ratio: self
                .inline_min_real_quick
                .unwrap_or(defaults.min_real_quick_ratio),
            min_quick_ratio: self.inline_min_quick.unwrap_or(defaults.min_quick_ratio),
            min_ratio: self.inline_min_ratio.unwrap_or(defaults.min_ratio),
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let options = DiffOptions {
        left: cli.left.clone(),
        right: cli.right.clone(),
        context: cli.context,
        inline_config: cli.inline_config(),
        format: cli.format,
    };

    match run(&options) {
        Ok(true) => ExitCode::from(1),
        Ok(false) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mdiff: {err:#}");
            ExitCode::from(2)
        }
    }
}
