//! Node selection by name.
//!
//! A selector is a comma-separated list of descendant chains, each chain a
//! whitespace-separated list of node names: `b i __at__` selects mentions
//! inside an italic run inside a bold run. A matching node is returned
//! without looking further inside it. Names are tag names as written
//! (aliases included) or the inline names `__url__`, `__email__`, `__at__`
//! and `__plain__`.

use crate::error::SelectorError;
use crate::node::NodeRef;

/// A parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selector {
    chains: Vec<Vec<String>>,
}

impl Selector {
    pub(crate) fn parse(selector: &str) -> Result<Self, SelectorError> {
        if selector.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut chains = Vec::new();
        for group in selector.split(',') {
            let chain: Vec<String> = group
                .split_whitespace()
                .map(str::to_ascii_lowercase)
                .collect();
            let valid = !chain.is_empty()
                && chain.iter().all(|name| {
                    name.chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                });
            if !valid {
                return Err(SelectorError::Unsupported {
                    selector: selector.to_owned(),
                });
            }
            chains.push(chain);
        }
        Ok(Self { chains })
    }

    /// Matches under `root`, chain by chain in document order, without
    /// duplicates.
    pub(crate) fn select<'t>(&self, root: NodeRef<'t>) -> Vec<NodeRef<'t>> {
        let mut found: Vec<NodeRef<'t>> = Vec::new();
        for chain in &self.chains {
            for node in select_chain(root, chain) {
                if !found.contains(&node) {
                    found.push(node);
                }
            }
        }
        found
    }
}

fn select_chain<'t>(root: NodeRef<'t>, chain: &[String]) -> Vec<NodeRef<'t>> {
    let Some((last, ancestors)) = chain.split_last() else {
        return Vec::new();
    };
    let mut scopes = vec![root];
    for name in ancestors {
        let mut next = Vec::new();
        for scope in scopes {
            for child in scope.children() {
                find_named(child, name, &mut next);
            }
        }
        scopes = next;
    }
    let mut found = Vec::new();
    for scope in scopes {
        for child in scope.children() {
            find_named(child, last, &mut found);
        }
    }
    found
}

/// Collect `node` if named `name`, otherwise search its descendants.
fn find_named<'t>(node: NodeRef<'t>, name: &str, out: &mut Vec<NodeRef<'t>>) {
    if node.name() == name {
        out.push(node);
        return;
    }
    for child in node.children() {
        find_named(child, name, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_chains() {
        let selector = Selector::parse("b i __at__, URL").unwrap();
        assert_eq!(
            selector.chains,
            vec![
                vec!["b".to_owned(), "i".to_owned(), "__at__".to_owned()],
                vec!["url".to_owned()],
            ]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Selector::parse("  "), Err(SelectorError::Empty));
    }

    #[test]
    fn test_parse_unsupported() {
        for selector in ["b > i", "b[x]", "b,", ".cls", "*"] {
            assert!(
                matches!(
                    Selector::parse(selector),
                    Err(SelectorError::Unsupported { .. })
                ),
                "{selector}"
            );
        }
    }
}
