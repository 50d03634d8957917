//! `tagsoup select` command implementation.

use std::path::PathBuf;

use clap::Args;

use super::{EngineArgs, build_engine, read_input};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the select command.
#[derive(Args)]
pub(crate) struct SelectArgs {
    /// Node names separated by spaces (descendants) or commas (groups),
    /// e.g. `"quote __at__"` or `"img, video"`.
    selector: String,

    /// Markup file to search (default: stdin).
    file: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl SelectArgs {
    /// Execute the select command.
    ///
    /// Prints the canonical markup of every match on its own line.
    ///
    /// # Errors
    ///
    /// Returns an error if the selector is unsupported or input cannot be read.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.engine.load_config(None)?;
        let engine = build_engine(&config, version);

        let source = read_input(self.file.as_deref())?;
        let doc = engine.parse(&source);
        let matches = doc.filter(&self.selector)?;

        if matches.is_empty() {
            output.warning(&format!("No nodes match {:?}", self.selector));
        }
        for node in matches {
            output.document(&node.to_markup())?;
        }
        Ok(())
    }
}
