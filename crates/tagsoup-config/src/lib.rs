//! Configuration management for tagsoup.
//!
//! Parses `tagsoup.toml` with serde and discovers it in the current
//! directory or its parents. [`CliSettings`] override file values after
//! loading.
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` (error if unset) and `${VAR:-default}`.
//!
//! Expanded fields:
//! - `cache.dir`
//! - `mentions.profile_url`
//! - `refs.hosts`
//! - `formula.service_url`
//! - `formula.image_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override embed width.
    pub width: Option<u32>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override network lookups for video identifiers.
    pub lookups: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tagsoup.toml";

/// Default cache directory, relative to the configuration file.
const DEFAULT_CACHE_DIR: &str = ".tagsoup/cache";

/// Widest embed accepted, in pixels.
const MAX_WIDTH: u32 = 4096;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub video: VideoConfig,
    /// Cache section as written (directory relative to the file).
    cache: CacheConfigRaw,
    pub mentions: MentionsConfig,
    pub refs: RefsConfig,
    pub formula: FormulaConfig,

    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Embed width in pixels; heights follow a 6:5 ratio.
    pub width: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { width: 480 }
    }
}

/// Video lookup configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Whether indirect video identifiers may be looked up over the network.
    pub lookups: bool,
    /// Timeout of a single lookup request.
    pub timeout_secs: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            lookups: true,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
}

/// Resolved cache configuration with an absolute directory.
#[derive(Debug, Default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

/// Mention link configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct MentionsConfig {
    /// Profile URL template with a `{nickname}` placeholder. Mentions link
    /// to `#` when unset.
    pub profile_url: Option<String>,
}

/// `[ref]` link configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RefsConfig {
    /// Hosts accepted in front of internal reference paths.
    pub hosts: Vec<String>,
}

/// Formula rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FormulaConfig {
    /// Service asked to render new formulas. Pre-rendering is off when unset.
    pub service_url: Option<String>,
    /// Image URL template with `{hash}` and `{format}` placeholders.
    pub image_url: String,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            image_url: "/formula/{hash}.{format}".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`formula.service_url`").
        field: String,
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn require_placeholder(value: &str, placeholder: &str, field: &str) -> Result<(), ConfigError> {
    if !value.contains(placeholder) {
        return Err(ConfigError::Validation(format!(
            "{field} must contain {placeholder}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `tagsoup.toml` in the current directory and parents,
    /// falling back to defaults. CLI settings are applied last and the result
    /// is validated again.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(width) = settings.width {
            self.render.width = width;
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = cache_enabled;
        }
        if let Some(lookups) = settings.lookups {
            self.video.lookups = lookups;
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            render: RenderConfig::default(),
            video: VideoConfig::default(),
            cache: CacheConfigRaw::default(),
            mentions: MentionsConfig::default(),
            refs: RefsConfig::default(),
            formula: FormulaConfig::default(),
            cache_resolved: CacheConfig {
                enabled: true,
                dir: base.join(DEFAULT_CACHE_DIR),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_render()?;
        self.validate_video()?;
        self.validate_links()?;
        self.validate_formula()?;
        Ok(())
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        let width = self.render.width;
        if width == 0 {
            return Err(ConfigError::Validation(
                "render.width must be greater than 0".to_owned(),
            ));
        }
        if width > MAX_WIDTH {
            return Err(ConfigError::Validation(format!(
                "render.width cannot exceed {MAX_WIDTH}"
            )));
        }
        Ok(())
    }

    fn validate_video(&self) -> Result<(), ConfigError> {
        if self.video.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "video.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_links(&self) -> Result<(), ConfigError> {
        if let Some(ref profile_url) = self.mentions.profile_url {
            require_non_empty(profile_url, "mentions.profile_url")?;
            require_placeholder(profile_url, "{nickname}", "mentions.profile_url")?;
        }
        for host in &self.refs.hosts {
            require_non_empty(host, "refs.hosts")?;
            if host.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "refs.hosts entry {host:?} must be a bare host name"
                )));
            }
        }
        Ok(())
    }

    fn validate_formula(&self) -> Result<(), ConfigError> {
        if let Some(ref service_url) = self.formula.service_url {
            require_http_url(service_url, "formula.service_url")?;
        }
        require_placeholder(&self.formula.image_url, "{hash}", "formula.image_url")?;
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.cache.dir {
            self.cache.dir = Some(expand::expand_env(dir, "cache.dir")?);
        }
        if let Some(ref url) = self.mentions.profile_url {
            self.mentions.profile_url = Some(expand::expand_env(url, "mentions.profile_url")?);
        }
        for host in &mut self.refs.hosts {
            *host = expand::expand_env(host, "refs.hosts")?;
        }
        // An empty service URL (e.g. `${FORMULA_URL:-}`) turns pre-rendering off
        if let Some(ref url) = self.formula.service_url {
            let url = expand::expand_env(url, "formula.service_url")?;
            self.formula.service_url = Some(url).filter(|u| !u.is_empty());
        }
        self.formula.image_url = expand::expand_env(&self.formula.image_url, "formula.image_url")?;
        Ok(())
    }

    fn resolve_paths(&mut self, config_dir: &Path) {
        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(true),
            dir: config_dir.join(self.cache.dir.as_deref().unwrap_or(DEFAULT_CACHE_DIR)),
        };
    }
}

/// Search for the config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
