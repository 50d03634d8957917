//! Parsed document tree.
//!
//! Nodes live in an arena owned by [`Tree`] and refer to each other by
//! [`NodeId`]. Every node except the root has exactly one parent, and each
//! node remembers its position in the parent's child list, so sibling lookups
//! are constant time. [`NodeRef`] is the borrowed view used for navigation
//! and rendering.

use std::fmt;
use std::sync::Arc;

use crate::inline::InlineMatch;
use crate::render::{RenderOptions, escape_text};
use crate::services::Services;
use crate::tags::Element;

/// Name of the synthetic root node.
pub const TOP: &str = "__top__";
/// Name of plain text nodes.
pub const PLAIN: &str = "__plain__";

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// How a node takes part in line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Inline,
    Block,
}

/// A node built from a bracket tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    /// Tag name as matched in the source, lowercased (aliases keep their own name).
    pub name: &'static str,
    /// Argument given after `=`, if any.
    pub value: Option<String>,
    pub element: Element,
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic root.
    Top,
    /// A run of literal text, at most one line including its `\n`.
    Plain(String),
    /// Text recognized by an inline pattern.
    Inline(InlineMatch),
    Tag(TagNode),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    index: usize,
    children: Vec<NodeId>,
}

/// Arena holding every node of one parsed document.
///
/// The root is allocated up front and receives its children once parsing
/// has finished.
pub struct Tree {
    nodes: Vec<NodeData>,
    services: Arc<Services>,
}

const ROOT: NodeId = NodeId(0);

impl Tree {
    pub(crate) fn new(services: Arc<Services>) -> Self {
        let root = NodeData {
            kind: NodeKind::Top,
            parent: None,
            index: 0,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            services,
        }
    }

    /// Add a node adopting `children`, which must not have a parent yet.
    pub(crate) fn push(&mut self, kind: NodeKind, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            index: 0,
            children: Vec::new(),
        });
        self.adopt(id, children);
        id
    }

    /// Hand the top-level nodes to the root.
    pub(crate) fn finish(&mut self, children: Vec<NodeId>) {
        self.adopt(ROOT, children);
    }

    fn adopt(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for (index, child) in children.iter().enumerate() {
            let data = &mut self.nodes[child.0];
            debug_assert!(data.parent.is_none(), "node adopted twice");
            data.parent = Some(parent);
            data.index = index;
        }
        self.nodes[parent.0].children = children;
    }

    /// Number of allocated nodes, used as a rollback mark.
    pub(crate) fn mark(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node allocated after `mark`.
    pub(crate) fn rollback(&mut self, mark: usize) {
        self.nodes.truncate(mark);
    }

    pub(crate) fn services(&self) -> &Services {
        &self.services
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        self.get(ROOT)
    }

    /// View of the node `id`.
    #[must_use]
    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root().fmt(f)
    }
}

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl<'t> NodeRef<'t> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &'t NodeKind {
        &self.tree.data(self.id).kind
    }

    /// Name used by selectors: the tag name, an inline pattern name,
    /// [`PLAIN`] or [`TOP`].
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.kind() {
            NodeKind::Top => TOP,
            NodeKind::Plain(_) => PLAIN,
            NodeKind::Inline(m) => m.name,
            NodeKind::Tag(tag) => tag.name,
        }
    }

    /// Tag argument, or the text of a plain or inline node.
    #[must_use]
    pub fn value(&self) -> Option<&'t str> {
        match self.kind() {
            NodeKind::Top => None,
            NodeKind::Plain(text) => Some(text),
            NodeKind::Inline(m) => Some(&m.text),
            NodeKind::Tag(tag) => tag.value.as_deref(),
        }
    }

    /// The inline match, for nodes produced by an inline pattern.
    #[must_use]
    pub fn inline(&self) -> Option<&'t InlineMatch> {
        match self.kind() {
            NodeKind::Inline(m) => Some(m),
            _ => None,
        }
    }

    /// The built element, for tag nodes.
    #[must_use]
    pub fn element(&self) -> Option<&'t Element> {
        match self.kind() {
            NodeKind::Tag(tag) => Some(&tag.element),
            _ => None,
        }
    }

    #[must_use]
    pub fn display(&self) -> Display {
        match self.kind() {
            NodeKind::Tag(tag) => tag.element.display(),
            _ => Display::Inline,
        }
    }

    #[must_use]
    pub fn is_block(&self) -> bool {
        self.display() == Display::Block
    }

    /// A node with neither a value nor children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value().is_none_or(str::is_empty) && !self.has_children()
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.tree.data(self.id).children.is_empty()
    }

    pub fn children(self) -> impl ExactSizeIterator<Item = NodeRef<'t>> + 't {
        let tree = self.tree;
        tree.data(self.id)
            .children
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.tree.data(self.id).parent.map(|id| self.tree.get(id))
    }

    #[must_use]
    pub fn previous_sibling(&self) -> Option<NodeRef<'t>> {
        let index = self.tree.data(self.id).index;
        self.sibling_at(index.checked_sub(1)?)
    }

    #[must_use]
    pub fn next_sibling(&self) -> Option<NodeRef<'t>> {
        let index = self.tree.data(self.id).index;
        self.sibling_at(index + 1)
    }

    fn sibling_at(&self, index: usize) -> Option<NodeRef<'t>> {
        let parent = self.tree.data(self.id).parent?;
        let id = *self.tree.data(parent).children.get(index)?;
        Some(self.tree.get(id))
    }

    pub(crate) fn services(&self) -> &'t Services {
        self.tree.services()
    }

    /// Render as sanitized HTML.
    #[must_use]
    pub fn html(&self, options: &RenderOptions) -> String {
        match self.kind() {
            NodeKind::Top => self.children_html(options),
            NodeKind::Plain(text) => self.plain_html(text, options),
            NodeKind::Inline(m) => m.html(self.services()),
            NodeKind::Tag(tag) => tag.element.html(*self, tag, options),
        }
    }

    /// Render as plain text with all markup removed.
    #[must_use]
    pub fn text(&self) -> String {
        match self.kind() {
            NodeKind::Top => self.children_text(),
            NodeKind::Plain(text) => text.clone(),
            NodeKind::Inline(m) => m.text.clone(),
            NodeKind::Tag(tag) => tag.element.text(*self),
        }
    }

    /// Render back to canonical markup, closing every tag explicitly.
    #[must_use]
    pub fn to_markup(&self) -> String {
        match self.kind() {
            NodeKind::Top => self.children_markup(),
            NodeKind::Plain(text) => text.clone(),
            NodeKind::Inline(m) => m.text.clone(),
            NodeKind::Tag(tag) => {
                let mut out = format!("[{}", tag.name);
                if let Some(value) = tag.value.as_deref().filter(|v| !v.is_empty()) {
                    out.push('=');
                    out.push_str(&quote_value(value));
                }
                out.push(']');
                out.push_str(&self.children_markup());
                out.push_str("[/");
                out.push_str(tag.name);
                out.push(']');
                out
            }
        }
    }

    #[must_use]
    pub fn children_html(&self, options: &RenderOptions) -> String {
        self.children().map(|child| child.html(options)).collect()
    }

    #[must_use]
    pub fn children_text(&self) -> String {
        self.children().map(|child| child.text()).collect()
    }

    #[must_use]
    pub fn children_markup(&self) -> String {
        self.children().map(|child| child.to_markup()).collect()
    }

    /// Escaped text; a trailing newline becomes `<br />` unless a block
    /// element sits right before or after this node.
    fn plain_html(&self, text: &str, options: &RenderOptions) -> String {
        let escaped = escape_text(text);
        let next_to_block = self.previous_sibling().is_some_and(|n| n.is_block())
            || self.next_sibling().is_some_and(|n| n.is_block());
        match escaped.strip_suffix('\n') {
            Some(line) if options.break_on_newline && !next_to_block => {
                format!("{line}<br />\n")
            }
            _ => escaped,
        }
    }
}

/// Quote a tag value as a JSON string literal.
fn quote_value(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Plain(text) => write!(f, "Plain({text:?})"),
            NodeKind::Inline(m) => write!(f, "{}({:?})", m.name, m.text),
            _ => {
                let mut t = f.debug_tuple(self.name());
                if let Some(value) = self.value() {
                    t.field(&value);
                }
                t.field(&self.children().collect::<Vec<_>>()).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(tree: &mut Tree, text: &str) -> NodeId {
        tree.push(NodeKind::Plain(text.to_owned()), Vec::new())
    }

    fn quote(tree: &mut Tree, children: Vec<NodeId>) -> NodeId {
        let tag = TagNode {
            name: "quote",
            value: None,
            element: Element::Quote,
        };
        tree.push(NodeKind::Tag(tag), children)
    }

    #[test]
    fn test_siblings() {
        let mut tree = Tree::new(Arc::default());
        let a = plain(&mut tree, "a\n");
        let b = plain(&mut tree, "b\n");
        let c = plain(&mut tree, "c");
        tree.finish(vec![a, b, c]);

        let b = tree.get(b);
        assert_eq!(b.previous_sibling().map(|n| n.id()), Some(a));
        assert_eq!(b.next_sibling().map(|n| n.id()), Some(c));
        assert_eq!(tree.get(a).previous_sibling(), None);
        assert_eq!(tree.get(c).next_sibling(), None);
        assert_eq!(b.parent(), Some(tree.root()));
    }

    #[test]
    fn test_plain_break() {
        let mut tree = Tree::new(Arc::default());
        let a = plain(&mut tree, "a<b\n");
        tree.finish(vec![a]);
        assert_eq!(tree.root().html(&RenderOptions::default()), "a&lt;b<br />\n");
        assert_eq!(
            tree.root().html(&RenderOptions::default().without_breaks()),
            "a&lt;b\n"
        );
    }

    #[test]
    fn test_plain_break_suppressed_next_to_block() {
        let mut tree = Tree::new(Arc::default());
        let before = plain(&mut tree, "before\n");
        let inner = plain(&mut tree, "q");
        let q = quote(&mut tree, vec![inner]);
        let after = plain(&mut tree, "\n");
        let tail = plain(&mut tree, "tail\n");
        tree.finish(vec![before, q, after, tail]);

        assert_eq!(
            tree.root().html(&RenderOptions::default()),
            "before\n<blockquote>q</blockquote>\ntail<br />\n"
        );
    }

    #[test]
    fn test_to_markup_quotes_value() {
        let mut tree = Tree::new(Arc::default());
        let inner = plain(&mut tree, "x");
        let tag = TagNode {
            name: "color",
            value: Some("say \"hi\"".to_owned()),
            element: Element::Color,
        };
        let color = tree.push(NodeKind::Tag(tag), vec![inner]);
        tree.finish(vec![color]);

        assert_eq!(tree.root().to_markup(), r#"[color="say \"hi\""]x[/color]"#);
    }

    #[test]
    fn test_is_empty() {
        let mut tree = Tree::new(Arc::default());
        let empty = quote(&mut tree, Vec::new());
        let text = plain(&mut tree, "x");
        let full = quote(&mut tree, vec![text]);
        tree.finish(vec![empty, full]);

        assert!(tree.get(empty).is_empty());
        assert!(!tree.get(full).is_empty());
        assert!(!tree.get(text).is_empty());
    }

    #[test]
    fn test_rollback_discards_nodes() {
        let mut tree = Tree::new(Arc::default());
        let a = plain(&mut tree, "a");
        let mark = tree.mark();
        plain(&mut tree, "b");
        tree.rollback(mark);
        tree.finish(vec![a]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.root().to_markup(), "a");
    }
}
