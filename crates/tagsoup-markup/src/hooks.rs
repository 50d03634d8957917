//! Named callbacks run at fixed points of a document's life.

use std::collections::HashMap;
use std::fmt;

use crate::engine::Document;

/// Runs once per document, right after its tree has been built.
pub const AFTER_PARSE: &str = "after_parse";

/// A callback receiving the document that triggered it.
pub type Hook = Box<dyn Fn(&Document<'_>) + Send + Sync>;

/// Callbacks grouped by hook name, run in registration order.
#[derive(Default)]
pub struct Hooks {
    hooks: HashMap<String, Vec<Hook>>,
}

impl Hooks {
    pub fn add(&mut self, name: impl Into<String>, hook: Hook) {
        self.hooks.entry(name.into()).or_default().push(hook);
    }

    /// Number of callbacks registered under `name`.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.hooks.get(name).map_or(0, Vec::len)
    }

    pub(crate) fn run(&self, name: &str, doc: &Document<'_>) {
        let Some(hooks) = self.hooks.get(name) else {
            return;
        };
        tracing::trace!(hook = name, count = hooks.len(), "running hooks");
        for hook in hooks {
            hook(doc);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, hooks) in &self.hooks {
            map.entry(name, &hooks.len());
        }
        map.finish()
    }
}
