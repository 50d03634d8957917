//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod select;

pub(crate) use render::RenderArgs;
pub(crate) use select::SelectArgs;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tagsoup_cache::FileCache;
use tagsoup_config::{CliSettings, Config};
use tagsoup_fetch::{FormulaClient, HttpFetcher};
use tagsoup_markup::{Engine, FormulaUrls, ProfileUrlTemplate};
use tracing::debug;

use crate::error::CliError;

/// Options shared by every command that parses markup.
#[derive(Args)]
pub(crate) struct EngineArgs {
    /// Path to configuration file (default: auto-discover tagsoup.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable the lookup cache.
    #[arg(long)]
    no_cache: bool,

    /// Disable network lookups for video identifiers.
    #[arg(long)]
    no_lookups: bool,

    /// Enable verbose output (debug logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl EngineArgs {
    /// Load configuration with these flags applied on top.
    pub(crate) fn load_config(&self, width: Option<u32>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            width,
            cache_enabled: self.no_cache.then_some(false),
            lookups: self.no_lookups.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            debug!(path = %path.display(), "Loaded configuration");
        }
        Ok(config)
    }
}

/// Wire the engine's collaborators from configuration.
pub(crate) fn build_engine(config: &Config, version: &str) -> Engine {
    let mut builder = Engine::builder().ref_hosts(config.refs.hosts.iter().cloned());

    let timeout = Duration::from_secs(config.video.timeout_secs);
    if config.video.lookups {
        builder = builder.fetcher(Arc::new(HttpFetcher::new(timeout)));
    }

    if config.cache_resolved.enabled {
        debug!(dir = %config.cache_resolved.dir.display(), "Lookup cache enabled");
        builder = builder.cache(Arc::new(FileCache::new(
            config.cache_resolved.dir.clone(),
            version,
        )));
    }

    if let Some(template) = &config.mentions.profile_url {
        builder = builder.mentions(Arc::new(ProfileUrlTemplate::new(template.as_str())));
    }

    builder = match &config.formula.service_url {
        Some(service_url) => builder.formula_service(Arc::new(FormulaClient::new(
            service_url,
            &config.formula.image_url,
            timeout,
        ))),
        None => builder.formula_urls(FormulaUrls::new(config.formula.image_url.as_str())),
    };

    builder.build()
}

/// Read markup from `file`, or from stdin when no file (or `-`) is given.
pub(crate) fn read_input(file: Option<&Path>) -> Result<String, CliError> {
    match file {
        Some(path) if path != Path::new("-") => {
            std::fs::read_to_string(path).map_err(|source| CliError::Input {
                path: path.display().to_string(),
                source,
            })
        }
        _ => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tagsoup_markup::AFTER_PARSE;

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.video.lookups = false;
        config.cache_resolved.enabled = false;
        config
    }

    #[test]
    fn test_build_engine_offline() {
        let engine = build_engine(&offline_config(), "test");
        assert!(engine.services().fetch().is_none());
        assert_eq!(engine.hooks().count(AFTER_PARSE), 0);
    }

    #[test]
    fn test_build_engine_with_lookups() {
        let mut config = offline_config();
        config.video.lookups = true;
        let engine = build_engine(&config, "test");
        assert!(engine.services().fetch().is_some());
    }

    #[test]
    fn test_build_engine_links() {
        let mut config = offline_config();
        config.mentions.profile_url = Some("/people/{nickname}/".to_owned());
        config.refs.hosts = vec!["guo.kr".to_owned()];
        let engine = build_engine(&config, "test");

        let html = engine.parse("@sela [ref]http://guo.kr/article/1[/ref]").html();
        assert!(html.contains("href=\"/people/sela/\""), "{html}");
        assert!(html.contains("href=\"http://guo.kr/article/1/\""), "{html}");
    }

    #[test]
    fn test_build_engine_formula_service() {
        let mut config = offline_config();
        config.formula.service_url = Some("http://formula.local".to_owned());
        let engine = build_engine(&config, "test");
        assert_eq!(engine.hooks().count(AFTER_PARSE), 1);
    }

    #[test]
    fn test_read_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.txt");
        std::fs::write(&path, "[b]x[/b]").unwrap();
        assert_eq!(read_input(Some(&path)).unwrap(), "[b]x[/b]");

        let missing = dir.path().join("missing.txt");
        let err = read_input(Some(&missing)).unwrap_err();
        assert!(err.to_string().starts_with(&missing.display().to_string()));
    }
}
