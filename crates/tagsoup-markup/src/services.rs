//! External collaborators consulted while building and rendering nodes.
//!
//! The parser itself never performs I/O. Anything that needs the outside
//! world goes through one of these traits:
//!
//! - [`Fetch`]: HTTP lookups for video identifiers hidden behind a page URL
//! - [`ImageResolver`]: resized image URLs and stored image dimensions
//! - [`MentionLinks`]: profile links for `@nickname` mentions
//! - [`FormulaService`]: formula image URLs and pre-rendering
//!
//! Lookup results are memoized through a [`tagsoup_cache::Cache`].
//! [`Services::default`] wires offline implementations of everything.

use std::sync::Arc;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tagsoup_cache::{Cache, NullCache};

use crate::error::ServiceError;
use crate::render::MathFormat;

/// Response of a [`Fetch`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Response`] if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value, ServiceError> {
        serde_json::from_str(&self.body).map_err(|e| ServiceError::Response(e.to_string()))
    }
}

/// Synchronous HTTP client used by video lookups.
pub trait Fetch: Send + Sync {
    /// `GET url` with query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the request could not be completed.
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<FetchResponse, ServiceError>;

    /// `POST url` with a form-encoded body.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the request could not be completed.
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<FetchResponse, ServiceError>;
}

/// Stored dimensions of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
    pub hashkey: String,
}

/// Resolves image URLs for display.
pub trait ImageResolver: Send + Sync {
    /// URL of the image scaled to `width` pixels.
    fn resize(&self, url: &str, _width: u32) -> String {
        url.to_owned()
    }

    /// Known dimensions of the image, if it is a locally stored upload.
    fn metadata(&self, _url: &str) -> Option<ImageMeta> {
        None
    }
}

/// Uses image URLs as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughImages;

impl ImageResolver for PassthroughImages {}

/// Resolves `@nickname` mentions to profile links.
pub trait MentionLinks: Send + Sync {
    /// Profile URL for `nickname`, or `None` for an unknown user.
    fn profile_url(&self, nickname: &str) -> Option<String>;
}

/// Leaves every mention unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfiles;

impl MentionLinks for NoProfiles {
    fn profile_url(&self, _nickname: &str) -> Option<String> {
        None
    }
}

/// Builds profile URLs from a template containing `{nickname}`.
///
/// # Example
///
/// ```
/// use tagsoup_markup::{MentionLinks, ProfileUrlTemplate};
///
/// let links = ProfileUrlTemplate::new("/people/{nickname}/");
/// assert_eq!(links.profile_url("小明").as_deref(), Some("/people/%E5%B0%8F%E6%98%8E/"));
/// ```
#[derive(Debug, Clone)]
pub struct ProfileUrlTemplate {
    template: String,
}

impl ProfileUrlTemplate {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl MentionLinks for ProfileUrlTemplate {
    fn profile_url(&self, nickname: &str) -> Option<String> {
        let encoded = utf8_percent_encode(nickname, NON_ALPHANUMERIC).to_string();
        Some(self.template.replace("{nickname}", &encoded))
    }
}

/// Formula image hosting.
pub trait FormulaService: Send + Sync {
    /// URL of the rendered image for the formula with SHA-1 `hash`.
    fn image_url(&self, hash: &str, format: MathFormat) -> String;

    /// Ask the service to render `tex` ahead of first display.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service rejected or did not answer the request.
    fn create(&self, tex: &str) -> Result<(), ServiceError>;
}

/// Formula URLs from a template with `{hash}` and `{format}` placeholders.
///
/// Never pre-renders anything.
#[derive(Debug, Clone)]
pub struct FormulaUrls {
    template: String,
}

impl FormulaUrls {
    pub const DEFAULT_TEMPLATE: &str = "/formula/{hash}.{format}";

    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Default for FormulaUrls {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TEMPLATE)
    }
}

impl FormulaService for FormulaUrls {
    fn image_url(&self, hash: &str, format: MathFormat) -> String {
        self.template
            .replace("{hash}", hash)
            .replace("{format}", format.as_str())
    }

    fn create(&self, _tex: &str) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// The set of collaborators an [`Engine`](crate::Engine) works with.
#[derive(Clone)]
pub struct Services {
    pub(crate) fetch: Option<Arc<dyn Fetch>>,
    pub(crate) cache: Arc<dyn Cache>,
    pub(crate) images: Arc<dyn ImageResolver>,
    pub(crate) mentions: Arc<dyn MentionLinks>,
    pub(crate) formulas: Arc<dyn FormulaService>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            fetch: None,
            cache: Arc::new(NullCache),
            images: Arc::new(PassthroughImages),
            mentions: Arc::new(NoProfiles),
            formulas: Arc::new(FormulaUrls::default()),
        }
    }
}

impl Services {
    /// HTTP client for lookups, if network lookups are enabled.
    #[must_use]
    pub fn fetch(&self) -> Option<&dyn Fetch> {
        self.fetch.as_deref()
    }

    #[must_use]
    pub fn cache(&self) -> &dyn Cache {
        self.cache.as_ref()
    }

    #[must_use]
    pub fn images(&self) -> &dyn ImageResolver {
        self.images.as_ref()
    }

    #[must_use]
    pub fn mentions(&self) -> &dyn MentionLinks {
        self.mentions.as_ref()
    }

    #[must_use]
    pub fn formulas(&self) -> &dyn FormulaService {
        self.formulas.as_ref()
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("lookups", &self.fetch.is_some())
            .finish_non_exhaustive()
    }
}
