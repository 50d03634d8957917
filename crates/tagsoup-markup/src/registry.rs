//! Tag and inline pattern registry.
//!
//! A [`Registry`] is assembled once, handed to an [`Engine`](crate::Engine)
//! and never changed afterwards. Tags are kept heaviest first (by default a
//! tag weighs the length of its name) so that `[bold]` is matched before
//! `[b]`. Each tag narrows what may appear inside it; the parser walks those
//! narrowed views as [`Scope`]s.

use crate::inline::{EMAIL_PATTERN, InlineDef, MENTION_PATTERN, URL_PATTERN};
use crate::tags::{STANDARD, TagDef};

/// A tag name bound to its definition.
#[derive(Debug, Clone, Copy)]
pub struct TagEntry {
    /// Name matched in the source: the definition's name or one of its aliases.
    pub name: &'static str,
    pub weight: usize,
    pub def: &'static TagDef,
}

/// Registered tags and inline patterns.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tags: Vec<TagEntry>,
    patterns: Vec<&'static InlineDef>,
}

impl Registry {
    /// A registry with nothing in it.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every standard tag plus the URL, email and mention patterns.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for def in STANDARD {
            registry.register(def);
        }
        for pattern in [&URL_PATTERN, &EMAIL_PATTERN, &MENTION_PATTERN] {
            registry.register_pattern(pattern);
        }
        registry
    }

    /// Register a tag and its aliases, weighted by name length.
    pub fn register(&mut self, def: &'static TagDef) {
        self.register_weighted(def, def.name.len());
    }

    /// Register a tag under an explicit weight.
    ///
    /// A name starting with `_` is not matched itself, only its aliases are.
    /// Aliases always weigh their own length. Registering a name again
    /// replaces the earlier entry.
    pub fn register_weighted(&mut self, def: &'static TagDef, weight: usize) {
        if !def.name.starts_with('_') {
            self.insert(TagEntry {
                name: def.name,
                weight,
                def,
            });
        }
        for &alias in def.aliases {
            self.insert(TagEntry {
                name: alias,
                weight: alias.len(),
                def,
            });
        }
        self.tags.sort_by(|a, b| {
            b.weight
                .cmp(&a.weight)
                .then_with(|| b.name.len().cmp(&a.name.len()))
        });
    }

    fn insert(&mut self, entry: TagEntry) {
        self.tags.retain(|e| e.name != entry.name);
        self.tags.push(entry);
    }

    /// Register an inline pattern.
    ///
    /// # Panics
    ///
    /// Panics if the pattern matches the empty string.
    pub fn register_pattern(&mut self, def: &'static InlineDef) {
        assert!(
            !def.matches_empty(),
            "inline pattern {} must not match empty text",
            def.name
        );
        self.patterns.retain(|p| p.name != def.name);
        self.patterns.push(def);
        self.patterns.sort_by(|a, b| b.weight.cmp(&a.weight));
    }

    /// Matchable tag names, in matching order.
    pub fn tag_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tags.iter().map(|e| e.name)
    }

    /// Inline pattern names, in matching order.
    pub fn pattern_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.patterns.iter().map(|p| p.name)
    }

    /// Everything allowed at the top level.
    pub(crate) fn scope(&self) -> Scope<'_> {
        Scope {
            tags: self.tags.iter().collect(),
            patterns: self.patterns.clone(),
        }
    }
}

/// Tags and patterns allowed at one nesting level.
#[derive(Debug, Clone)]
pub(crate) struct Scope<'r> {
    tags: Vec<&'r TagEntry>,
    patterns: Vec<&'static InlineDef>,
}

impl<'r> Scope<'r> {
    /// What is allowed inside a tag defined by `def`.
    pub(crate) fn narrow(&self, def: &TagDef) -> Scope<'r> {
        let allowed = |name: &str| {
            def.includes.is_none_or(|names| names.contains(&name)) && !def.excludes.contains(&name)
        };
        Scope {
            tags: self.tags.iter().copied().filter(|e| allowed(e.name)).collect(),
            patterns: self
                .patterns
                .iter()
                .copied()
                .filter(|p| allowed(p.name))
                .collect(),
        }
    }

    /// Heaviest tag whose name starts `text`, ignoring ASCII case.
    pub(crate) fn match_tag(&self, text: &str) -> Option<&'r TagEntry> {
        self.tags.iter().copied().find(|e| {
            text.get(..e.name.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(e.name))
        })
    }

    pub(crate) fn patterns(&self) -> &[&'static InlineDef] {
        &self.patterns
    }
}
