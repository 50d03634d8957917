//! Embedded media: images, flash and videos.
//!
//! All three take their URL from the tag content only and allow no markup
//! inside, so the URL is exactly what was typed.

use super::{Construct, Element, TagDef};
use crate::error::NodeError;
use crate::node::NodeRef;
use crate::render::{RenderOptions, embed_html, escape_attr, safe_url};
use crate::video;

pub static IMAGE: TagDef = TagDef {
    name: "image",
    aliases: &["img"],
    includes: Some(&[]),
    excludes: &[],
    build: build_image,
};

pub static FLASH: TagDef = TagDef {
    name: "flash",
    aliases: &[],
    includes: Some(&[]),
    excludes: &[],
    build: build_flash,
};

pub static VIDEO: TagDef = TagDef {
    name: "video",
    aliases: &[],
    includes: Some(&[]),
    excludes: &[],
    build: build_video,
};

fn build_image(c: &mut Construct<'_>) -> Result<Element, NodeError> {
    c.forbid_value()?;
    c.require_children()?;
    Ok(Element::Image {
        url: c.children_markup(),
    })
}

pub(super) fn image_html(node: NodeRef<'_>, url: &str, options: &RenderOptions) -> String {
    let images = node.services().images();
    let src = safe_url(&images.resize(url, options.width));
    let width = options.width;
    match images.metadata(url) {
        Some(meta) => format!(
            "<img src=\"{src}\" style=\"max-width: {width}px\" data-orig-width=\"{}\" \
             data-orig-height=\"{}\" data-hashkey=\"{}\"/>",
            meta.width,
            meta.height,
            escape_attr(&meta.hashkey)
        ),
        None => format!("<img src=\"{src}\" style=\"max-width: {width}px\" />"),
    }
}

fn build_flash(c: &mut Construct<'_>) -> Result<Element, NodeError> {
    c.forbid_value()?;
    c.require_children()?;
    Ok(Element::Flash {
        url: c.children_markup().trim().to_owned(),
    })
}

pub(super) fn flash_html(url: &str, options: &RenderOptions) -> String {
    embed_html(url, options)
}

fn build_video(c: &mut Construct<'_>) -> Result<Element, NodeError> {
    let url = c.children_markup();
    let embed = video::resolve(url.trim(), c.services())?;
    Ok(Element::Video(embed))
}
