//! Inline formatting: bold, italic and color.

use std::sync::LazyLock;

use regex::Regex;

use super::{Construct, Element, TagDef};
use crate::error::NodeError;
use crate::node::NodeRef;
use crate::render::{RenderOptions, XSS_PLACEHOLDER};

static COLOR_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z]+|#[0-9A-Fa-f]{0,6})$").unwrap());

const DEFAULT_COLOR: &str = "#000000";

pub static BOLD: TagDef = TagDef {
    name: "bold",
    aliases: &["b"],
    includes: None,
    excludes: &["bold", "b"],
    build: build_bold,
};

pub static ITALIC: TagDef = TagDef {
    name: "italic",
    aliases: &["i"],
    includes: None,
    excludes: &["italic", "i"],
    build: build_italic,
};

pub static COLOR: TagDef = TagDef {
    name: "color",
    aliases: &[],
    includes: None,
    excludes: &["color"],
    build: build_color,
};

fn build_bold(_: &mut Construct<'_>) -> Result<Element, NodeError> {
    Ok(Element::Bold)
}

fn build_italic(_: &mut Construct<'_>) -> Result<Element, NodeError> {
    Ok(Element::Italic)
}

fn build_color(_: &mut Construct<'_>) -> Result<Element, NodeError> {
    Ok(Element::Color)
}

/// Children between `open` and `close`, or nothing when there are no children.
pub(super) fn wrap(node: NodeRef<'_>, open: &str, close: &str, options: &RenderOptions) -> String {
    if !node.has_children() {
        return String::new();
    }
    format!("{open}{}{close}", node.children_html(options))
}

/// `<span>` with the color from the tag value, checked against an allowlist.
///
/// Only a missing or empty value falls back to the default; a value that is
/// blank once trimmed is rejected like any other invalid color.
pub(super) fn color_html(node: NodeRef<'_>, value: Option<&str>, options: &RenderOptions) -> String {
    if !node.has_children() {
        return String::new();
    }
    let color = value
        .filter(|v| !v.is_empty())
        .map_or(DEFAULT_COLOR, str::trim);
    let style = if COLOR_VALUE.is_match(color) {
        format!("color: {color};")
    } else {
        XSS_PLACEHOLDER.to_owned()
    };
    format!(
        "<span style=\"{style}\">{}</span>",
        node.children_html(options)
    )
}
