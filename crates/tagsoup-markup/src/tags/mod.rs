//! The standard tag set.
//!
//! A [`TagDef`] describes one bracket tag: its name and aliases, which tags
//! and inline patterns may appear inside it, and a constructor that checks
//! the parsed value and children and produces an [`Element`]. Rendering is
//! driven by the element.

mod block;
mod format;
mod link;
mod list;
mod math;
mod media;

use crate::error::NodeError;
use crate::node::{Display, NodeId, NodeKind, NodeRef, TagNode, Tree};
use crate::render::RenderOptions;
use crate::services::Services;
use crate::video::VideoEmbed;

pub use block::{CELL, CODE, FLOAT, INDENT, QUOTE, TABLE};
pub use format::{BOLD, COLOR, ITALIC};
pub use link::{REF, RefPattern, URL};
pub use list::{OL, UL};
pub use math::{FORMULA_BUCKET, MATH, prerender_formulas};
pub use media::{FLASH, IMAGE, VIDEO};

/// Builds an element from a parsed tag, or rejects the tag.
pub type BuildFn = fn(&mut Construct<'_>) -> Result<Element, NodeError>;

/// Definition of a bracket tag.
#[derive(Debug)]
pub struct TagDef {
    /// Primary name. Names starting with `_` are only usable through aliases.
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Whitelist of tags and inline patterns allowed inside; `None` allows all.
    pub includes: Option<&'static [&'static str]>,
    /// Tags and inline patterns removed from what is allowed inside.
    pub excludes: &'static [&'static str],
    pub build: BuildFn,
}

/// Every standard tag, in registration order.
pub static STANDARD: &[&TagDef] = &[
    &UL, &OL, &URL, &IMAGE, &BOLD, &ITALIC, &COLOR, &QUOTE, &CODE, &TABLE, &CELL, &REF,
    &FLASH, &VIDEO, &MATH, &INDENT, &FLOAT,
];

/// What a tag node renders as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    List { ordered: bool },
    Link { url: String },
    Image { url: String },
    Bold,
    Italic,
    /// Text color taken from the tag value.
    Color,
    Quote,
    Code,
    /// `table`, `tr` or `th`, named after the tag.
    Table,
    /// `td` or a heading, named after the tag.
    Cell,
    Ref { url: String },
    Flash { url: String },
    Video(VideoEmbed),
    Math { tex: String, hash: String },
    Indent,
    /// Floating box, side taken from the tag value.
    Float,
}

impl Element {
    #[must_use]
    pub fn display(&self) -> Display {
        match self {
            Self::List { .. }
            | Self::Quote
            | Self::Table
            | Self::Cell
            | Self::Indent
            | Self::Float => Display::Block,
            _ => Display::Inline,
        }
    }

    pub(crate) fn html(&self, node: NodeRef<'_>, tag: &TagNode, options: &RenderOptions) -> String {
        match self {
            Self::List { ordered } => list::html(node, *ordered, options),
            Self::Link { url } => link::link_html(node, url, options),
            Self::Image { url } => media::image_html(node, url, options),
            Self::Bold => format::wrap(node, "<strong>", "</strong>", options),
            Self::Italic => format::wrap(node, "<i>", "</i>", options),
            Self::Color => format::color_html(node, tag.value.as_deref(), options),
            Self::Quote => block::quote_html(node, options),
            Self::Code => block::code_html(node, options),
            Self::Table => block::table_html(node, tag.name, options),
            Self::Cell => block::cell_html(node, tag.name, options),
            Self::Ref { url } => link::ref_html(url),
            Self::Flash { url } => media::flash_html(url, options),
            Self::Video(embed) => embed.html(options),
            Self::Math { tex, hash } => math::html(node, tex, hash, options),
            Self::Indent => block::indent_html(node, options),
            Self::Float => block::float_html(node, tag.value.as_deref(), options),
        }
    }

    pub(crate) fn text(&self, node: NodeRef<'_>) -> String {
        match self {
            Self::Image { .. } | Self::Flash { .. } | Self::Video(_) | Self::Math { .. } => {
                String::new()
            }
            _ => node.children_text(),
        }
    }
}

/// Input handed to a tag constructor.
pub struct Construct<'a> {
    tag: &'static str,
    value: Option<String>,
    children: Vec<NodeId>,
    tree: &'a mut Tree,
    refs: &'a RefPattern,
}

impl<'a> Construct<'a> {
    pub(crate) fn new(
        tag: &'static str,
        value: Option<String>,
        children: Vec<NodeId>,
        tree: &'a mut Tree,
        refs: &'a RefPattern,
    ) -> Self {
        Self {
            tag,
            value,
            children,
            tree,
            refs,
        }
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Vec<NodeId>) {
        (self.value, self.children)
    }

    /// Tag name as written, lowercased.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// The tag value, unless absent or empty.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Canonical markup of the children.
    #[must_use]
    pub fn children_markup(&self) -> String {
        self.children
            .iter()
            .map(|&id| self.tree.get(id).to_markup())
            .collect()
    }

    /// Replace the children with a single plain text node.
    pub fn set_text_child(&mut self, text: &str) {
        let id = self.tree.push(NodeKind::Plain(text.to_owned()), Vec::new());
        self.children = vec![id];
    }

    #[must_use]
    pub fn services(&self) -> &Services {
        self.tree.services()
    }

    #[must_use]
    pub fn refs(&self) -> &RefPattern {
        self.refs
    }

    /// Reject a tag that carries a value.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::UnexpectedValue`] if the tag has a value.
    pub fn forbid_value(&self) -> Result<(), NodeError> {
        match self.value() {
            Some(_) => Err(NodeError::UnexpectedValue { tag: self.tag }),
            None => Ok(()),
        }
    }

    /// Reject a tag without children.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Empty`] if the tag has no children.
    pub fn require_children(&self) -> Result<(), NodeError> {
        if self.has_children() {
            Ok(())
        } else {
            Err(NodeError::Empty { tag: self.tag })
        }
    }
}
