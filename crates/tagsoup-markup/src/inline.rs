//! Inline patterns recognized inside plain text runs.
//!
//! Text between tags is scanned for URLs, email addresses and `@nickname`
//! mentions. Patterns are tried in weight order and the first pattern with
//! any match in the remaining text wins, even if a lighter pattern matches
//! earlier. Whatever is left is split into line-sized plain nodes.

use std::sync::LazyLock;

use regex::Regex;

use crate::node::{NodeId, NodeKind, Tree};
use crate::render::{escape_attr, escape_text, safe_url};
use crate::services::Services;

/// Node name of autolinked URLs.
pub const URL: &str = "__url__";
/// Node name of autolinked email addresses.
pub const EMAIL: &str = "__email__";
/// Node name of `@nickname` mentions.
pub const MENTION: &str = "__at__";

/// What an inline pattern recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineKind {
    Url,
    Email,
    Mention,
}

/// A registrable inline pattern.
///
/// Patterns are registered by `'static` reference, so custom ones usually
/// live in a `LazyLock`:
///
/// ```
/// use std::sync::LazyLock;
///
/// use regex::Regex;
/// use tagsoup_markup::{InlineDef, InlineKind, Registry};
///
/// static WWW: LazyLock<InlineDef> = LazyLock::new(|| {
///     InlineDef::new("__www__", Regex::new(r"www\.[a-z0-9.-]+").unwrap(), 90, InlineKind::Url)
/// });
///
/// let mut registry = Registry::standard();
/// registry.register_pattern(&WWW);
/// ```
#[derive(Debug)]
pub struct InlineDef {
    pub name: &'static str,
    pub weight: usize,
    pub kind: InlineKind,
    regex: Regex,
}

pub static URL_PATTERN: LazyLock<InlineDef> = LazyLock::new(|| {
    let regex =
        Regex::new(r"(?i)(?:https?|ftps?|ssh|sftp|ed2k|git|svn|svn\+ssh|smb)://[\w?.=&+%/#;@:~!,()-]+")
            .unwrap();
    InlineDef::new(URL, regex, 100, InlineKind::Url)
});

pub static EMAIL_PATTERN: LazyLock<InlineDef> = LazyLock::new(|| {
    let regex =
        Regex::new(r"(?i)[0-9A-Za-z_+.-]+@[0-9A-Za-z_][0-9A-Za-z_.-]*\.[a-z]{2,10}").unwrap();
    InlineDef::new(EMAIL, regex, 80, InlineKind::Email)
});

pub static MENTION_PATTERN: LazyLock<InlineDef> = LazyLock::new(|| {
    let regex =
        Regex::new(r"@(?P<nickname>[\w\x{3400}-\x{4db5}\x{4e00}-\x{9fcb}.-]{1,20})").unwrap();
    InlineDef::new(MENTION, regex, 30, InlineKind::Mention)
});

impl InlineDef {
    /// A pattern named `name` whose matches render as `kind`.
    ///
    /// Heavier patterns are tried first. A pattern that can match empty text
    /// is refused by [`Registry::register_pattern`](crate::Registry::register_pattern).
    #[must_use]
    pub fn new(name: &'static str, regex: Regex, weight: usize, kind: InlineKind) -> Self {
        Self {
            name,
            weight,
            kind,
            regex,
        }
    }

    /// Byte range of the first match in `text`.
    ///
    /// # Panics
    ///
    /// Panics if the pattern produces an empty match, which would stall the
    /// splitter.
    pub(crate) fn find(&self, text: &str) -> Option<(usize, usize)> {
        let mut from = 0;
        while let Some(m) = self.regex.find_at(text, from) {
            assert!(
                m.start() < m.end(),
                "inline pattern {} produced an empty match",
                self.name
            );
            // `@@name` is not a mention
            if self.kind == InlineKind::Mention && text[..m.start()].ends_with('@') {
                from = m.start() + 1;
                continue;
            }
            return Some((m.start(), m.end()));
        }
        None
    }

    /// Whether the pattern can match the empty string.
    pub(crate) fn matches_empty(&self) -> bool {
        self.regex.is_match("")
    }
}

/// Text matched by an inline pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineMatch {
    pub name: &'static str,
    pub kind: InlineKind,
    pub text: String,
}

impl InlineMatch {
    /// Nickname of a mention, without the leading `@`.
    #[must_use]
    pub fn nickname(&self) -> Option<&str> {
        match self.kind {
            InlineKind::Mention => self.text.strip_prefix('@'),
            _ => None,
        }
    }

    pub(crate) fn html(&self, services: &Services) -> String {
        match self.kind {
            InlineKind::Url => format!(
                "<a href=\"{}\">{}</a>",
                safe_url(&self.text),
                escape_text(&self.text)
            ),
            InlineKind::Email => format!(
                "<a href=\"mailto:{}\">{}</a>",
                escape_attr(&self.text),
                escape_text(&self.text)
            ),
            InlineKind::Mention => {
                let nickname = self.nickname().unwrap_or_default();
                let href = services
                    .mentions()
                    .profile_url(nickname)
                    .unwrap_or_else(|| "#".to_owned());
                format!(
                    "<a href=\"{}\">@{}</a>",
                    escape_attr(&href),
                    escape_text(nickname)
                )
            }
        }
    }
}

/// Split literal text into inline-pattern and plain nodes, appending them to `out`.
pub(crate) fn split_text(
    tree: &mut Tree,
    out: &mut Vec<NodeId>,
    mut text: &str,
    patterns: &[&InlineDef],
) {
    'outer: while !text.is_empty() {
        for def in patterns {
            let Some((start, end)) = def.find(text) else {
                continue;
            };
            if start > 0 {
                split_text(tree, out, &text[..start], patterns);
            }
            let found = InlineMatch {
                name: def.name,
                kind: def.kind,
                text: text[start..end].to_owned(),
            };
            out.push(tree.push(NodeKind::Inline(found), Vec::new()));
            text = &text[end..];
            continue 'outer;
        }
        split_lines(tree, out, text);
        return;
    }
}

fn split_lines(tree: &mut Tree, out: &mut Vec<NodeId>, text: &str) {
    let mut rest = text;
    while let Some(pos) = rest.find('\n') {
        let (line, tail) = rest.split_at(pos + 1);
        out.push(tree.push(NodeKind::Plain(line.to_owned()), Vec::new()));
        rest = tail;
    }
    if !rest.is_empty() {
        out.push(tree.push(NodeKind::Plain(rest.to_owned()), Vec::new()));
    }
}
