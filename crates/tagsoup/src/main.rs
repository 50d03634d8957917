//! tagsoup CLI - bracket markup renderer.
//!
//! Provides commands for:
//! - `render`: Render markup as HTML, plain text or canonical markup
//! - `select`: Print the nodes matching a selector

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, SelectArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// tagsoup - forgiving bracket markup renderer.
#[derive(Parser)]
#[command(name = "tagsoup", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markup.
    Render(RenderArgs),
    /// Print nodes matching a selector.
    Select(SelectArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Render(args) => args.engine.verbose,
        Commands::Select(args) => args.engine.verbose,
    };

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(VERSION),
        Commands::Select(args) => args.execute(VERSION),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_flags() {
        let cli = Cli::try_parse_from([
            "tagsoup", "render", "post.txt", "--format", "text", "--no-lookups", "-v",
        ])
        .unwrap();
        let Commands::Render(args) = cli.command else {
            panic!("expected render command");
        };
        assert!(args.engine.verbose);
    }

    #[test]
    fn test_select_requires_selector() {
        assert!(Cli::try_parse_from(["tagsoup", "select"]).is_err());
    }
}
