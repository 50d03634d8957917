//! Block containers: quotes, code, tables, cells, indents and floats.

use std::sync::LazyLock;

use regex::Regex;

use super::{Construct, Element, TagDef};
use crate::error::NodeError;
use crate::node::{NodeKind, NodeRef};
use crate::render::{RenderOptions, XSS_PLACEHOLDER, escape_attr};

static FLOAT_SIDE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:left|right)$").unwrap());

pub static QUOTE: TagDef = TagDef {
    name: "quote",
    aliases: &["blockquote"],
    includes: None,
    excludes: &["quote", "blockquote"],
    build: build_quote,
};

pub static CODE: TagDef = TagDef {
    name: "code",
    aliases: &[],
    includes: None,
    excludes: &["code"],
    build: build_code,
};

pub static TABLE: TagDef = TagDef {
    name: "table",
    aliases: &["th", "tr"],
    includes: None,
    excludes: &[],
    build: build_table,
};

/// Cells and headings. Only reachable through its aliases.
pub static CELL: TagDef = TagDef {
    name: "_cell",
    aliases: &["td", "h1", "h2", "h3", "h4", "h5", "h6"],
    includes: None,
    excludes: &[],
    build: build_cell,
};

pub static INDENT: TagDef = TagDef {
    name: "indent",
    aliases: &[],
    includes: None,
    excludes: &[],
    build: build_indent,
};

pub static FLOAT: TagDef = TagDef {
    name: "float",
    aliases: &[],
    includes: None,
    excludes: &["float"],
    build: build_float,
};

fn build_quote(_: &mut Construct<'_>) -> Result<Element, NodeError> {
    Ok(Element::Quote)
}

fn build_code(_: &mut Construct<'_>) -> Result<Element, NodeError> {
    Ok(Element::Code)
}

fn build_table(_: &mut Construct<'_>) -> Result<Element, NodeError> {
    Ok(Element::Table)
}

fn build_cell(_: &mut Construct<'_>) -> Result<Element, NodeError> {
    Ok(Element::Cell)
}

fn build_indent(_: &mut Construct<'_>) -> Result<Element, NodeError> {
    Ok(Element::Indent)
}

fn build_float(_: &mut Construct<'_>) -> Result<Element, NodeError> {
    Ok(Element::Float)
}

pub(super) fn quote_html(node: NodeRef<'_>, options: &RenderOptions) -> String {
    format!("<blockquote>{}</blockquote>", node.children_html(options))
}

pub(super) fn code_html(node: NodeRef<'_>, options: &RenderOptions) -> String {
    format!("<pre>{}</pre>", node.children_html(&options.without_breaks()))
}

/// Table rows keep their layout newlines without `<br />`.
pub(super) fn table_html(node: NodeRef<'_>, name: &str, options: &RenderOptions) -> String {
    let plain_options = options.without_breaks();
    let inner: String = node
        .children()
        .map(|child| match child.kind() {
            NodeKind::Plain(_) => child.html(&plain_options),
            _ => child.html(options),
        })
        .collect();
    format!("<{name}>{inner}</{name}>")
}

pub(super) fn cell_html(node: NodeRef<'_>, name: &str, options: &RenderOptions) -> String {
    format!("<{name}>{}</{name}>", node.children_html(options))
}

pub(super) fn indent_html(node: NodeRef<'_>, options: &RenderOptions) -> String {
    if !node.has_children() {
        return String::new();
    }
    format!(
        "<div class=\"bbcode-indent\">{}</div>",
        node.children_html(&options.without_breaks())
    )
}

pub(super) fn float_html(node: NodeRef<'_>, value: Option<&str>, options: &RenderOptions) -> String {
    if !node.has_children() {
        return String::new();
    }
    let side = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("left");
    let class = if FLOAT_SIDE.is_match(side) {
        format!("bbcode-float-{side}")
    } else {
        XSS_PLACEHOLDER.to_owned()
    };
    format!(
        "<div class=\"{}\">{}</div>",
        escape_attr(&class),
        node.children_html(&options.without_breaks())
    )
}
