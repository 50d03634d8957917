//! CLI error types.

use tagsoup_config::ConfigError;
use tagsoup_markup::error::SelectorError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Selector(#[from] SelectorError),

    #[error("{path}: {source}")]
    Input {
        path: String,
        source: std::io::Error,
    },
}
