//! `[ul]` and `[ol]` lists.
//!
//! Lists have no explicit item markup. A new item starts after every line of
//! plain text and after every block child, and blank items are dropped.

use super::{Construct, Element, TagDef};
use crate::error::NodeError;
use crate::node::{NodeKind, NodeRef};
use crate::render::RenderOptions;

pub static UL: TagDef = TagDef {
    name: "ul",
    aliases: &[],
    includes: None,
    excludes: &[],
    build: build_unordered,
};

pub static OL: TagDef = TagDef {
    name: "ol",
    aliases: &[],
    includes: None,
    excludes: &[],
    build: build_ordered,
};

fn build_unordered(_: &mut Construct<'_>) -> Result<Element, NodeError> {
    Ok(Element::List { ordered: false })
}

fn build_ordered(_: &mut Construct<'_>) -> Result<Element, NodeError> {
    Ok(Element::List { ordered: true })
}

pub(super) fn html(node: NodeRef<'_>, ordered: bool, options: &RenderOptions) -> String {
    let tag = if ordered { "ol" } else { "ul" };
    let mut items = Items::default();

    for child in node.children() {
        if child.is_empty() {
            continue;
        }
        if let NodeKind::Plain(text) = child.kind() {
            items.current.push_str(&child.html(&options.without_breaks()));
            if text.contains('\n') {
                items.close();
            }
        } else {
            items.current.push_str(&child.html(options));
            if child.is_block() {
                items.close();
            }
        }
    }
    items.close();

    let mut out = format!("<{tag}>");
    for item in items.done {
        out.push_str("<li>");
        out.push_str(&item);
        out.push_str("</li>");
    }
    out.push_str(&format!("</{tag}>"));
    out
}

#[derive(Default)]
struct Items {
    done: Vec<String>,
    current: String,
}

impl Items {
    fn close(&mut self) {
        let item = self.current.trim();
        if !item.is_empty() {
            self.done.push(item.to_owned());
        }
        self.current.clear();
    }
}
