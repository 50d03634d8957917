//! Forgiving bracket markup ("BBCode") to sanitized HTML.
//!
//! Input like `[b]bold[/b] [url]http://example.com[/url]` is parsed into a
//! node tree and rendered as HTML, plain text or canonical markup. Malformed
//! input never fails: unknown, mismatched or rejected tags are kept as
//! literal text and unclosed tags are closed at the end of the input.
//!
//! # Architecture
//!
//! - [`Registry`]: the tags and inline patterns the parser recognizes
//! - [`Engine`]: registry, collaborators ([`Services`]) and hooks shared by
//!   every parse
//! - [`Document`]: one parsed input with its [`Tree`] of nodes
//! - [`tags`]: the standard tag set and the [`Element`]s it renders
//!
//! URLs in links, images and embeds go through [`safe_url`]: script schemes
//! are replaced by [`XSS_PLACEHOLDER`] and the rest is percent-quoted.
//!
//! # Example
//!
//! ```
//! use tagsoup_markup::Engine;
//!
//! let engine = Engine::new();
//! let doc = engine.parse("[b]hi[/b] [i]there");
//! assert_eq!(doc.html(), "<strong>hi</strong> <i>there</i>");
//! assert_eq!(doc.text(), "hi there");
//! assert_eq!(doc.to_markup(), "[b]hi[/b] [i]there[/i]");
//! ```

mod engine;
pub mod error;
mod hooks;
mod inline;
mod node;
mod parser;
mod registry;
mod render;
mod selector;
mod services;
pub mod tags;
mod video;

pub use engine::{Document, Engine, EngineBuilder};
pub use hooks::{AFTER_PARSE, Hook, Hooks};
pub use inline::{
    EMAIL_PATTERN, InlineDef, InlineKind, InlineMatch, MENTION_PATTERN, URL_PATTERN,
};
pub use node::{Display, NodeId, NodeKind, NodeRef, PLAIN, TOP, TagNode, Tree};
pub use parser::MAX_DEPTH;
pub use registry::{Registry, TagEntry};
pub use render::{
    DEFAULT_WIDTH, MathFormat, RenderOptions, XSS_PLACEHOLDER, escape_attr, escape_text,
    quote_url, safe_url,
};
pub use services::{
    Fetch, FetchResponse, FormulaService, FormulaUrls, ImageMeta, ImageResolver, MentionLinks,
    NoProfiles, PassthroughImages, ProfileUrlTemplate, Services,
};
pub use tags::{Construct, Element, FORMULA_BUCKET, RefPattern, TagDef};
pub use video::{Player, SOHU_BUCKET, VideoEmbed, WEIBO_BUCKET, resolve as resolve_video};
