//! Hyperlinks: `[url]` and internal `[ref]` links.

use regex::Regex;

use super::{Construct, Element, TagDef};
use crate::error::NodeError;
use crate::inline;
use crate::node::NodeRef;
use crate::render::{RenderOptions, escape_attr, escape_text, safe_url};

pub static URL: TagDef = TagDef {
    name: "url",
    aliases: &[],
    includes: None,
    excludes: &["url", inline::MENTION, inline::EMAIL, inline::URL],
    build: build_link,
};

pub static REF: TagDef = TagDef {
    name: "ref",
    aliases: &[],
    includes: Some(&[]),
    excludes: &[],
    build: build_ref,
};

/// `[url=target]text[/url]`, `[url]target[/url]` or `[url=target][/url]`.
fn build_link(c: &mut Construct<'_>) -> Result<Element, NodeError> {
    let url = match c.value() {
        Some(value) => value.to_owned(),
        None if c.has_children() => c.children_markup(),
        None => return Err(NodeError::Empty { tag: c.tag() }),
    };
    if !c.has_children() {
        c.set_text_child(&url);
    }
    Ok(Element::Link { url })
}

pub(super) fn link_html(node: NodeRef<'_>, url: &str, options: &RenderOptions) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        safe_url(url),
        node.children_html(options)
    )
}

fn build_ref(c: &mut Construct<'_>) -> Result<Element, NodeError> {
    c.forbid_value()?;
    c.require_children()?;
    let target = c.children_markup();
    let target = target.trim();
    if !c.refs().is_match(target) {
        return Err(NodeError::Rejected {
            tag: c.tag(),
            target: target.to_owned(),
        });
    }
    Ok(Element::Ref {
        url: format!("{}/", target.trim_end_matches('/')),
    })
}

pub(super) fn ref_html(url: &str) -> String {
    format!(
        "<a class=\"bbcode-ref\" href=\"{}\">{}</a>",
        escape_attr(url),
        escape_text(url)
    )
}

/// Allowlist of internal reference targets.
///
/// Accepts paths like `/article/123`, `/question/1/answer/2`, optionally
/// prefixed with `http://` or `https://` and one of the configured hosts.
///
/// # Example
///
/// ```
/// use tagsoup_markup::RefPattern;
///
/// let refs = RefPattern::new(&["guo.kr"]);
/// assert!(refs.is_match("/post/42"));
/// assert!(refs.is_match("http://guo.kr/question/1/answer/2/"));
/// assert!(!refs.is_match("http://evil.com/post/42"));
/// ```
#[derive(Debug, Clone)]
pub struct RefPattern {
    regex: Regex,
}

impl RefPattern {
    /// Build the allowlist for the given hosts.
    #[must_use]
    pub fn new<S: AsRef<str>>(hosts: &[S]) -> Self {
        let hosts: Vec<String> = hosts
            .iter()
            .map(|h| regex::escape(h.as_ref()))
            .collect();
        let prefix = if hosts.is_empty() {
            String::new()
        } else {
            format!("(?:https?://(?:{}))?", hosts.join("|"))
        };
        let pattern = format!(
            r"^{prefix}(?:/(?:article|blog|question|answer|post)/\d+|/question/\d+/answer/\d+)/?(?:\?|$)"
        );
        let regex = Regex::new(&pattern).expect("escaped hosts form a valid pattern");
        Self { regex }
    }

    #[must_use]
    pub fn is_match(&self, target: &str) -> bool {
        self.regex.is_match(target)
    }
}

impl Default for RefPattern {
    /// Only host-less paths.
    fn default() -> Self {
        Self::new::<&str>(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_pattern_paths() {
        let refs = RefPattern::default();
        assert!(refs.is_match("/article/123465"));
        assert!(refs.is_match("/blog/1/"));
        assert!(refs.is_match("/question/111/answer/3333"));
        assert!(refs.is_match("/post/7?from=feed"));
        assert!(!refs.is_match("/article/abc"));
        assert!(!refs.is_match("/user/1"));
        assert!(!refs.is_match("http://guo.kr/article/1"));
    }

    #[test]
    fn test_ref_pattern_hosts_are_literal() {
        let refs = RefPattern::new(&["www.guokr.com"]);
        assert!(refs.is_match("https://www.guokr.com/article/1"));
        assert!(!refs.is_match("https://wwwxguokr.com/article/1"));
    }

    #[test]
    fn test_ref_html_escapes() {
        assert_eq!(
            ref_html("/post/1/"),
            "<a class=\"bbcode-ref\" href=\"/post/1/\">/post/1/</a>"
        );
    }
}
