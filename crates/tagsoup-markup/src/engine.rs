//! Entry point: an [`Engine`] holds the registry and collaborators shared
//! by every parse, a [`Document`] is one parsed input.

use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

use tagsoup_cache::Cache;

use crate::error::SelectorError;
use crate::hooks::{AFTER_PARSE, Hook, Hooks};
use crate::node::{NodeRef, Tree};
use crate::parser;
use crate::registry::Registry;
use crate::render::RenderOptions;
use crate::selector::Selector;
use crate::services::{Fetch, FormulaService, FormulaUrls, ImageResolver, MentionLinks, Services};
use crate::tags::{RefPattern, prerender_formulas};

/// Shared, immutable parsing setup.
///
/// Build one at startup and reuse it; an engine is `Send + Sync` and
/// parses of different inputs never interact.
pub struct Engine {
    registry: Registry,
    hooks: Hooks,
    services: Arc<Services>,
    refs: RefPattern,
}

impl Engine {
    /// Standard tags, offline collaborators and no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Wrap `source` in a document. Parsing happens on first access.
    #[must_use]
    pub fn parse<'e>(&'e self, source: &str) -> Document<'e> {
        Document {
            engine: self,
            source: parser::normalize(source),
            tree: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    fn build_tree(&self, source: &str) -> Tree {
        let mut tree = Tree::new(Arc::clone(&self.services));
        parser::parse_into(&mut tree, source, &self.registry, &self.refs);
        tracing::debug!(bytes = source.len(), nodes = tree.len(), "parsed document");
        tree
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("tags", &self.registry.tag_names().count())
            .field("hooks", &self.hooks)
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    registry: Option<Registry>,
    services: Services,
    hooks: Hooks,
    ref_hosts: Vec<String>,
}

impl EngineBuilder {
    /// Replace the standard registry.
    #[must_use]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Enable network lookups for indirect video identifiers.
    #[must_use]
    pub fn fetcher(mut self, fetch: Arc<dyn Fetch>) -> Self {
        self.services.fetch = Some(fetch);
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.services.cache = cache;
        self
    }

    #[must_use]
    pub fn images(mut self, images: Arc<dyn ImageResolver>) -> Self {
        self.services.images = images;
        self
    }

    #[must_use]
    pub fn mentions(mut self, mentions: Arc<dyn MentionLinks>) -> Self {
        self.services.mentions = mentions;
        self
    }

    /// Use `formulas` for math image URLs and pre-render formulas after
    /// every parse.
    #[must_use]
    pub fn formula_service(mut self, formulas: Arc<dyn FormulaService>) -> Self {
        self.services.formulas = formulas;
        self.hooks.add(AFTER_PARSE, Box::new(prerender_formulas));
        self
    }

    /// Build math image URLs from `urls` without pre-rendering.
    #[must_use]
    pub fn formula_urls(mut self, urls: FormulaUrls) -> Self {
        self.services.formulas = Arc::new(urls);
        self
    }

    /// Hosts accepted as prefix of `[ref]` targets.
    #[must_use]
    pub fn ref_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ref_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn hook(mut self, name: impl Into<String>, hook: Hook) -> Self {
        self.hooks.add(name, hook);
        self
    }

    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            registry: self.registry.unwrap_or_else(Registry::standard),
            hooks: self.hooks,
            services: Arc::new(self.services),
            refs: RefPattern::new(&self.ref_hosts),
        }
    }
}

/// One parsed input.
///
/// The tree is built on first access; `after_parse` hooks run right after.
pub struct Document<'e> {
    engine: &'e Engine,
    source: String,
    tree: OnceCell<Tree>,
}

impl<'e> Document<'e> {
    /// The normalized source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    pub fn tree(&self) -> &Tree {
        if let Some(tree) = self.tree.get() {
            return tree;
        }
        let tree = self
            .tree
            .get_or_init(|| self.engine.build_tree(&self.source));
        self.engine.hooks.run(AFTER_PARSE, self);
        tree
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.tree().root()
    }

    /// Render as HTML with default options.
    pub fn html(&self) -> String {
        self.html_with(&RenderOptions::default())
    }

    pub fn html_with(&self, options: &RenderOptions) -> String {
        self.root().html(options)
    }

    pub fn text(&self) -> String {
        self.root().text()
    }

    /// Canonical markup: every tag closed, values quoted.
    pub fn to_markup(&self) -> String {
        self.root().to_markup()
    }

    /// Nodes matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] if the selector is empty or uses syntax
    /// other than node names and descendant chains.
    pub fn filter(&self, selector: &str) -> Result<Vec<NodeRef<'_>>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(selector.select(self.root()))
    }
}

impl fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("source", &self.source)
            .field("parsed", &self.tree.get().is_some())
            .finish_non_exhaustive()
    }
}
