//! `[math]` formulas rendered as images.
//!
//! The formula source is hashed with SHA-1 and the image is served by the
//! [`FormulaService`](crate::FormulaService) under that hash. Images are
//! produced ahead of time by [`prerender_formulas`], which runs as an
//! `after_parse` hook.

use std::collections::BTreeMap;

use sha1::{Digest, Sha1};
use tagsoup_cache::CacheBucketExt;

use super::{Construct, Element, TagDef};
use crate::Document;
use crate::error::NodeError;
use crate::node::NodeRef;
use crate::render::{RenderOptions, escape_attr};

/// Cache bucket recording formulas the service has already rendered.
pub const FORMULA_BUCKET: &str = "formula";

pub static MATH: TagDef = TagDef {
    name: "math",
    aliases: &[],
    includes: Some(&[]),
    excludes: &[],
    build: build_math,
};

fn build_math(c: &mut Construct<'_>) -> Result<Element, NodeError> {
    let tex = c.children_markup();
    let hash = hex::encode(Sha1::digest(tex.as_bytes()));
    Ok(Element::Math { tex, hash })
}

pub(super) fn html(node: NodeRef<'_>, tex: &str, hash: &str, options: &RenderOptions) -> String {
    let src = node
        .services()
        .formulas()
        .image_url(hash, options.math_format);
    format!(
        "<img src=\"{}\" class=\"edui-faked-insertmathjax\" data-code=\"{}\" \
         style=\"max-width: {}px\" />",
        escape_attr(&src),
        escape_attr(tex),
        options.width
    )
}

/// Ask the formula service to render every formula of `doc` not rendered yet.
///
/// Service failures are logged and skipped; the formula then shows up once
/// the service catches up.
pub fn prerender_formulas(doc: &Document<'_>) {
    let Ok(nodes) = doc.filter(MATH.name) else {
        return;
    };
    let formulas: BTreeMap<&str, &str> = nodes
        .iter()
        .filter_map(|node| match node.element() {
            Some(Element::Math { tex, hash }) => Some((hash.as_str(), tex.as_str())),
            _ => None,
        })
        .collect();
    if formulas.is_empty() {
        return;
    }

    let services = doc.engine().services();
    let bucket = services.cache().bucket(FORMULA_BUCKET);
    for (hash, tex) in formulas {
        if bucket.get(hash).is_some() {
            continue;
        }
        match services.formulas().create(tex) {
            Ok(()) => {
                tracing::debug!(hash, "formula rendered");
                bucket.set_string(hash, "1");
            }
            Err(e) => tracing::warn!(hash, error = %e, "failed to render formula"),
        }
    }
}
