//! Forgiving bracket-markup parser.
//!
//! The parser never fails. Bracket text it cannot accept is kept as literal
//! text and parsing resumes right after the consumed part:
//!
//! - an opening tag with an unknown name or a malformed value
//! - a closing tag that does not close the innermost open tag
//! - a tag whose element refuses its value or content (the whole span, up
//!   to and including its closing tag, becomes literal)
//! - an opening tag beyond [`MAX_DEPTH`] levels of nesting
//!
//! Tags still open at the end of the input are closed implicitly. Closing
//! tags only ever match the innermost open tag, so overlapping markup like
//! `[b]x[i]y[/b]z[/i]` keeps `[/b]` as text inside the italic run.

use crate::error::SyntaxError;
use crate::inline::split_text;
use crate::node::{NodeId, NodeKind, TagNode, Tree};
use crate::registry::{Registry, Scope};
use crate::tags::{Construct, RefPattern};

/// Maximum number of simultaneously open tags.
pub const MAX_DEPTH: usize = 256;

/// Unify line endings and replace no-break spaces with plain spaces.
pub(crate) fn normalize(source: &str) -> String {
    source
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{a0}', " ")
}

/// Parse normalized `source` into `tree`.
pub(crate) fn parse_into(tree: &mut Tree, source: &str, registry: &Registry, refs: &RefPattern) {
    let mut parser = Parser {
        src: source,
        pos: 0,
        stack: Vec::new(),
        tree,
        refs,
    };
    let scope = registry.scope();
    let nodes = parser.parse_nodes(&scope);
    parser.tree.finish(nodes);
}

/// Opened or closed a tag.
enum Step {
    Opened(NodeId),
    Closed,
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    /// Names of the open tags, innermost last.
    stack: Vec<&'static str>,
    tree: &'a mut Tree,
    refs: &'a RefPattern,
}

impl Parser<'_> {
    /// Parse until the innermost open tag is closed or the input ends.
    fn parse_nodes(&mut self, scope: &Scope<'_>) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        let mut literal = String::new();

        let src = self.src;
        loop {
            let rest = &src[self.pos..];
            let Some(bracket) = rest.find('[') else {
                literal.push_str(rest);
                self.pos = src.len();
                break;
            };
            literal.push_str(&rest[..bracket]);
            self.pos += bracket;

            let start = self.pos;
            let attempt = if is_closing(&src[start..]) {
                self.parse_close().map(|()| Step::Closed)
            } else {
                self.parse_open(scope).map(Step::Opened)
            };
            match attempt {
                Ok(Step::Opened(node)) => {
                    self.flush(&mut literal, &mut nodes, scope);
                    nodes.push(node);
                }
                Ok(Step::Closed) => break,
                Err(e) => {
                    let end = start + e.consumed;
                    tracing::trace!(offset = start, consumed = e.consumed, "kept as literal text");
                    literal.push_str(&src[start..end]);
                    self.pos = end;
                }
            }
        }

        self.flush(&mut literal, &mut nodes, scope);
        nodes
    }

    fn flush(&mut self, literal: &mut String, nodes: &mut Vec<NodeId>, scope: &Scope<'_>) {
        if !literal.is_empty() {
            split_text(self.tree, nodes, literal, scope.patterns());
            literal.clear();
        }
    }

    /// Parse `[/name]` closing the innermost open tag.
    fn parse_close(&mut self) -> Result<(), SyntaxError> {
        let src = self.src;
        let source = &src[self.pos..];
        let Some(&open) = self.stack.last() else {
            return Err(SyntaxError::at(1));
        };
        let mut offset = 1;
        let (ws, part) = skip_ws(&source[1..]);
        offset += ws;
        let Some(part) = part.strip_prefix('/') else {
            return Err(SyntaxError::at(offset));
        };
        let (ws, part) = skip_ws(part);
        offset += 1 + ws;
        if !starts_with_name(part, open) {
            return Err(SyntaxError::at(offset));
        }
        let (ws, part) = skip_ws(&part[open.len()..]);
        offset += open.len() + ws;
        if !part.starts_with(']') {
            return Err(SyntaxError::at(offset));
        }
        self.stack.pop();
        self.pos += offset + 1;
        Ok(())
    }

    /// Parse `[name]` or `[name=value]`, its children and build the node.
    fn parse_open(&mut self, scope: &Scope<'_>) -> Result<NodeId, SyntaxError> {
        let start = self.pos;
        let src = self.src;
        let source = &src[start..];
        let mut offset = 1;
        let (ws, part) = skip_ws(&source[1..]);
        offset += ws;
        let entry = scope.match_tag(part).ok_or(SyntaxError::at(offset))?;

        let (ws, part) = skip_ws(&part[entry.name.len()..]);
        offset += entry.name.len() + ws;
        let value = if part.starts_with(']') {
            None
        } else if let Some(part) = part.strip_prefix('=') {
            offset += 1;
            let (value, consumed) = parse_value(part).map_err(|at| SyntaxError::at(offset + at))?;
            offset += consumed;
            Some(value)
        } else {
            return Err(SyntaxError::at(offset));
        };
        // past the closing `]`
        offset += 1;

        if self.stack.len() >= MAX_DEPTH {
            return Err(SyntaxError::at(offset));
        }
        let depth = self.stack.len();
        self.stack.push(entry.name);
        self.pos = start + offset;

        let mark = self.tree.mark();
        let inner = scope.narrow(entry.def);
        let children = self.parse_nodes(&inner);
        self.stack.truncate(depth);

        let mut construct = Construct::new(entry.name, value, children, self.tree, self.refs);
        match (entry.def.build)(&mut construct) {
            Ok(element) => {
                let (value, children) = construct.into_parts();
                let tag = TagNode {
                    name: entry.name,
                    value,
                    element,
                };
                Ok(self.tree.push(NodeKind::Tag(tag), children))
            }
            Err(e) => {
                tracing::debug!(tag = entry.name, error = %e, "tag rejected, kept as literal text");
                self.tree.rollback(mark);
                Err(SyntaxError::at(self.pos - start))
            }
        }
    }
}

/// Whether the bracket at the start of `source` opens a closing tag.
fn is_closing(source: &str) -> bool {
    source[1..].trim_start().starts_with('/')
}

/// Strip leading whitespace, returning how many bytes were skipped.
fn skip_ws(s: &str) -> (usize, &str) {
    let trimmed = s.trim_start();
    (s.len() - trimmed.len(), trimmed)
}

fn starts_with_name(s: &str, name: &str) -> bool {
    s.get(..name.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(name))
}

/// Parse a tag value after `=`, up to and including the closing `]`.
///
/// `source` starts right after the `=`. Returns the value and the number of
/// bytes consumed, or on failure the number of bytes to keep as literal.
fn parse_value(source: &str) -> Result<(String, usize), usize> {
    let (ws, part) = skip_ws(source);
    let mut offset = ws;

    let quote = part.chars().next();
    match quote {
        Some(q @ ('"' | '\'')) => {
            let body = &part[1..];
            offset += 1;
            let end = find_unescaped(body, q).ok_or(offset)?;
            let raw = &body[..end];
            let value = match q {
                '"' => decode_double_quoted(raw),
                _ => decode_single_quoted(raw),
            }
            .ok_or(offset)?;
            let (ws, rest) = skip_ws(&body[end + 1..]);
            offset += end + 1 + ws;
            if !rest.starts_with(']') {
                return Err(offset);
            }
            Ok((value, offset))
        }
        _ => {
            let end = find_unescaped(part, ']').ok_or(offset)?;
            Ok((part[..end].to_owned(), offset + end))
        }
    }
}

/// Position of the first `needle` not preceded by a backslash.
fn find_unescaped(s: &str, needle: char) -> Option<usize> {
    s.match_indices(needle)
        .map(|(i, _)| i)
        .find(|&i| !s[..i].ends_with('\\'))
}

/// Decode the body of a double-quoted value with JSON string escapes.
fn decode_double_quoted(raw: &str) -> Option<String> {
    serde_json::from_str(&format!("\"{raw}\"")).ok()
}

/// Decode the body of a single-quoted value: `\'` is a quote, other escapes
/// follow JSON.
fn decode_single_quoted(raw: &str) -> Option<String> {
    let mut json = String::with_capacity(raw.len() + 2);
    json.push('"');
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'\'') => {
                chars.next();
                json.push('\'');
            }
            '\\' => {
                json.push('\\');
                if let Some(next) = chars.next() {
                    json.push(next);
                }
            }
            '"' => json.push_str("\\\""),
            _ => json.push(c),
        }
    }
    json.push('"');
    serde_json::from_str(&json).ok()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::Services;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a\r\nb\rc\u{a0}d"), "a\nb\nc d");
    }

    #[test]
    fn test_value_bare() {
        assert_eq!(parse_value("red]x"), Ok(("red".to_owned(), 3)));
        assert_eq!(parse_value("  http://g.cn]"), Ok(("http://g.cn".to_owned(), 13)));
    }

    #[test]
    fn test_value_bare_escaped_bracket() {
        assert_eq!(parse_value(r"a\]b]"), Ok((r"a\]b".to_owned(), 4)));
    }

    #[test]
    fn test_value_double_quoted() {
        assert_eq!(
            parse_value(r#""say \"hi\"\n" ]"#),
            Ok(("say \"hi\"\n".to_owned(), 15))
        );
    }

    #[test]
    fn test_value_double_quoted_unicode_escape() {
        assert_eq!(parse_value(r#""\u679c"]"#), Ok(("果".to_owned(), 8)));
        assert_eq!(parse_value(r#""果"]"#), Ok(("果".to_owned(), 5)));
    }

    #[test]
    fn test_value_single_quoted() {
        assert_eq!(
            parse_value(r#"'it\'s "x"']"#),
            Ok((r#"it's "x""#.to_owned(), 11))
        );
    }

    #[test]
    fn test_value_unterminated_quote() {
        assert_eq!(parse_value(r#""abc]"#), Err(1));
    }

    #[test]
    fn test_value_junk_after_quote() {
        assert_eq!(parse_value(r#""abc"x]"#), Err(5));
    }

    #[test]
    fn test_value_missing_bracket() {
        assert_eq!(parse_value("abc"), Err(0));
    }

    #[test]
    fn test_find_unescaped() {
        assert_eq!(find_unescaped(r#"a\"b"c"#, '"'), Some(4));
        assert_eq!(find_unescaped(r#""x"#, '"'), Some(0));
        assert_eq!(find_unescaped(r"\]", ']'), None);
    }

    fn parse(source: &str) -> Tree {
        let mut tree = Tree::new(Arc::new(Services::default()));
        parse_into(
            &mut tree,
            &normalize(source),
            &Registry::standard(),
            &RefPattern::default(),
        );
        tree
    }

    fn markup(source: &str) -> String {
        parse(source).root().to_markup()
    }

    #[test]
    fn test_parse_nested() {
        let tree = parse("[b]x[i]y[/i][/b]");
        let root = tree.root();
        let bold = root.children().next().unwrap();
        assert_eq!(bold.name(), "b");
        let names: Vec<_> = bold.children().map(|n| n.name()).collect();
        assert_eq!(names, vec!["__plain__", "i"]);
    }

    #[test]
    fn test_parse_auto_close() {
        assert_eq!(markup("[b]x[i]y"), "[b]x[i]y[/i][/b]");
    }

    #[test]
    fn test_parse_overlap_keeps_closer_as_text() {
        assert_eq!(markup("[b]x[i]y[/b]z[/i]"), "[b]x[i]y[/b]z[/i][/b]");
    }

    #[test]
    fn test_parse_stray_closer() {
        assert_eq!(markup("a[/b]c"), "a[/b]c");
    }

    #[test]
    fn test_parse_unknown_tag() {
        let tree = parse("[foo]bar[/foo]");
        assert_eq!(tree.root().to_markup(), "[foo]bar[/foo]");
        assert!(tree.root().children().all(|n| n.name() == "__plain__"));
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(markup("[B]x[/b]"), "[b]x[/b]");
        assert_eq!(markup("[ b ]x[ / B ]"), "[b]x[/b]");
    }

    #[test]
    fn test_parse_value_requoted() {
        assert_eq!(markup("[color=red]x[/color]"), r#"[color="red"]x[/color]"#);
        assert_eq!(markup(r#"[color='r"d']x[/color]"#), r#"[color="r\"d"]x[/color]"#);
    }

    #[test]
    fn test_parse_rejected_tag_is_literal() {
        let tree = parse("[img=x]a.png[/img] [b]y[/b]");
        let names: Vec<_> = tree.root().children().map(|n| n.name()).collect();
        assert_eq!(names, vec!["__plain__", "b"]);
        assert_eq!(tree.root().to_markup(), "[img=x]a.png[/img] [b]y[/b]");
    }

    #[test]
    fn test_parse_rollback_drops_nodes() {
        let tree = parse("[ref]x[/ref]");
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.root().to_markup(), "[ref]x[/ref]");
    }

    #[test]
    fn test_parse_depth_limit() {
        let deep = "[ul][ol]".repeat(MAX_DEPTH / 2 + 1);
        let tree = parse(&deep);
        let mut depth = 0;
        let mut node = tree.root();
        while let Some(child) = node.children().find(|n| n.element().is_some()) {
            depth += 1;
            node = child;
        }
        assert_eq!(depth, MAX_DEPTH);
    }

    #[test]
    fn test_is_closing() {
        assert!(is_closing("[/b]"));
        assert!(is_closing("[ \t/b]"));
        assert!(!is_closing("[b]"));
        assert!(!is_closing("["));
    }
}
