//! `tagsoup render` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use tagsoup_markup::{MathFormat, RenderOptions};

use super::{EngineArgs, build_engine, read_input};
use crate::error::CliError;
use crate::output::Output;

/// Output representation of the parsed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Sanitized HTML.
    #[default]
    Html,
    /// Plain text with media dropped.
    Text,
    /// Canonical markup with every tag closed.
    Markup,
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markup file to render (default: stdin).
    file: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    format: Format,

    /// Embed width in pixels (overrides config).
    #[arg(short, long)]
    width: Option<u32>,

    /// Keep newlines as-is instead of emitting `<br />`.
    #[arg(long)]
    no_breaks: bool,

    /// Render formulas as SVG instead of PNG.
    #[arg(long)]
    svg_math: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or input cannot be read.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.engine.load_config(self.width)?;
        let engine = build_engine(&config, version);

        let source = read_input(self.file.as_deref())?;
        let doc = engine.parse(&source);

        let rendered = match self.format {
            Format::Html => doc.html_with(&self.render_options(config.render.width)),
            Format::Text => doc.text(),
            Format::Markup => doc.to_markup(),
        };
        output.document(&rendered)?;
        Ok(())
    }

    fn render_options(&self, width: u32) -> RenderOptions {
        let math_format = if self.svg_math {
            MathFormat::Svg
        } else {
            MathFormat::Png
        };
        let options = RenderOptions::default()
            .with_width(width)
            .with_math_format(math_format);
        if self.no_breaks {
            options.without_breaks()
        } else {
            options
        }
    }
}
