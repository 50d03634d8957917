//! Network lookups for video ids that are not part of the URL.
//!
//! Weibo short links carry a mixed id that must be exchanged for the
//! `vid`/`uid` pair of the canonical page, and Sohu page URLs only reveal
//! their numeric player id through an API call. Both answers are stable, so
//! they are kept in a cache bucket keyed by the original identifier.

use std::time::{SystemTime, UNIX_EPOCH};

use tagsoup_cache::CacheBucketExt;

use super::adapters::{Adapter, captures};
use crate::error::VideoError;
use crate::services::{Fetch, Services};

/// Cache bucket mapping Weibo mixed ids to `[vid, uid]`.
pub const WEIBO_BUCKET: &str = "video-weibo-url";

/// Cache bucket mapping Sohu page URLs to player ids.
pub const SOHU_BUCKET: &str = "video-sohu-url";

const WEIBO_API: &str = "http://video.weibo.com/";
const SOHU_API: &str = "http://open.tv.sohu.com/tools/flash/url/get.do";

fn fetcher<'s>(adapter: &Adapter, services: &'s Services) -> Result<&'s dyn Fetch, VideoError> {
    services
        .fetch()
        .ok_or_else(|| VideoError::not_recognized(adapter.name, "network lookups are disabled"))
}

/// Exchange a Weibo mixed id for the `(vid, uid)` pair.
pub(super) fn weibo_ids(
    adapter: &Adapter,
    mix_vid: &str,
    services: &Services,
) -> Result<(String, String), VideoError> {
    let bucket = services.cache().bucket(WEIBO_BUCKET);
    if let Some((vid, uid)) = bucket.get_json::<(String, String)>(mix_vid) {
        return Ok((vid, uid));
    }

    let fetch = fetcher(adapter, services)?;
    let fail = |reason: String| VideoError::not_recognized(adapter.name, reason);
    let date = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string();

    tracing::debug!(mix_vid, "looking up weibo video");
    let response = fetch
        .get(
            WEIBO_API,
            &[
                ("s", "v"),
                ("a", "play_list"),
                ("format", "json"),
                ("mix_video_id", mix_vid),
                ("date", date.as_str()),
                ("for", ""),
            ],
        )
        .map_err(|e| fail(e.to_string()))?;
    if response.status != 200 {
        return Err(fail(format!("lookup returned status {}", response.status)));
    }
    let json = response.json().map_err(|e| fail(e.to_string()))?;
    let page = json["result"]["data"][0]["play_page_url"]
        .as_str()
        .ok_or_else(|| fail("lookup response has no play page".to_owned()))?;
    let mut groups = captures(adapter.page_pattern(), page)
        .ok_or_else(|| fail(format!("unexpected play page {page}")))?;
    let (Some(vid), Some(uid)) = (groups.remove("vid"), groups.remove("uid")) else {
        return Err(fail(format!("unexpected play page {page}")));
    };

    bucket.set_json(mix_vid, &(&vid, &uid));
    Ok((vid, uid))
}

/// Find the player id of a Sohu page.
pub(super) fn sohu_id(
    adapter: &Adapter,
    page: &str,
    services: &Services,
) -> Result<String, VideoError> {
    let bucket = services.cache().bucket(SOHU_BUCKET);
    if let Some(id) = bucket.get_string(page) {
        return Ok(id);
    }

    let fetch = fetcher(adapter, services)?;
    let fail = |reason: String| VideoError::not_recognized(adapter.name, reason);

    tracing::debug!(page, "looking up sohu video");
    let response = fetch
        .post_form(SOHU_API, &[("url", page)])
        .map_err(|e| fail(e.to_string()))?;
    if response.status != 200 {
        return Err(fail(format!("lookup returned status {}", response.status)));
    }
    let json = response.json().map_err(|e| fail(e.to_string()))?;
    let flash = json["flash"]
        .as_str()
        .ok_or_else(|| fail("lookup response has no player".to_owned()))?;
    let id = captures(adapter.page_pattern(), flash)
        .and_then(|mut groups| groups.remove("id"))
        .and_then(|id| id.parse::<u64>().ok())
        .ok_or_else(|| fail(format!("unexpected player {flash}")))?
        .to_string();

    bucket.set_string(page, &id);
    Ok(id)
}
