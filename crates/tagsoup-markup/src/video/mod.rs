//! Video URL recognition.
//!
//! A `[video]` tag holds the URL of a page or player on a known video site.
//! Each site has an adapter with a list of URL patterns and a player
//! template. Adapters are tried in a fixed order; the first one whose pattern
//! matches and whose identifier can be completed produces the embed. An
//! adapter that matches but cannot complete its identifier (for example
//! because a lookup failed) passes the URL on to the next adapter.

mod adapters;
mod lookup;

use crate::error::VideoError;
use crate::render::{RenderOptions, embed_html, iframe_html};
use crate::services::Services;

pub use lookup::{SOHU_BUCKET, WEIBO_BUCKET};

/// How a video player is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    /// HTML5 player page in an `<iframe>`.
    Iframe,
    /// Flash player in an `<embed>`.
    Flash,
}

/// A recognized video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEmbed {
    /// Name of the adapter that recognized the URL.
    pub adapter: &'static str,
    pub player: Player,
    /// Player URL.
    pub src: String,
}

impl VideoEmbed {
    /// Player element sized from `options`.
    #[must_use]
    pub fn html(&self, options: &RenderOptions) -> String {
        match self.player {
            Player::Iframe => iframe_html(&self.src, options),
            Player::Flash => embed_html(&self.src, options),
        }
    }
}

/// Find the player for a video page or player URL.
///
/// # Errors
///
/// Returns [`VideoError::NoMatch`] if no adapter knows the URL, or the
/// failure of the last adapter that matched but could not complete it.
///
/// # Example
///
/// ```
/// use tagsoup_markup::{Player, Services, resolve_video};
///
/// let embed = resolve_video(
///     "http://v.youku.com/v_show/id_XNDg1NzIzNjYw.html",
///     &Services::default(),
/// )
/// .unwrap();
/// assert_eq!(embed.player, Player::Iframe);
/// assert_eq!(embed.src, "http://player.youku.com/embed/XNDg1NzIzNjYw");
/// ```
pub fn resolve(url: &str, services: &Services) -> Result<VideoEmbed, VideoError> {
    let mut failure = None;
    for adapter in adapters::all() {
        match adapter.resolve(url, services) {
            Ok(Some(embed)) => {
                tracing::debug!(adapter = adapter.name, url, "video recognized");
                return Ok(embed);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(adapter = adapter.name, error = %e, "video adapter gave up");
                failure = Some(e);
            }
        }
    }
    Err(failure.unwrap_or(VideoError::NoMatch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn src(url: &str) -> String {
        resolve(url, &Services::default()).unwrap().src
    }

    #[test]
    fn test_youku_urls() {
        let expected = "http://player.youku.com/embed/XNDg1NzIzNjYw";
        assert_eq!(src("http://v.youku.com/v_show/id_XNDg1NzIzNjYw.html"), expected);
        assert_eq!(
            src("http://player.youku.com/player.php/sid/XNDg1NzIzNjYw/v.swf"),
            expected
        );
        assert_eq!(
            src("http://player.youku.com/player.php/Type/Folder/Fid/1/Ob/1/sid/XNDg1NzIzNjYw/v.swf"),
            expected
        );
    }

    #[test]
    fn test_tudou_iframe() {
        let embed = resolve(
            "http://www.tudou.com/programs/view/abc-DEF_1/",
            &Services::default(),
        )
        .unwrap();
        assert_eq!(embed.adapter, "tudou");
        assert_eq!(embed.player, Player::Iframe);
        assert_eq!(
            embed.src,
            "http://www.tudou.com/programs/view/html5embed.action?code=abc-DEF_1"
        );
    }

    #[test]
    fn test_56_picture_player() {
        assert_eq!(
            src("http://player.56.com/deux_v_MTIzNDU2.swf"),
            "http://player.56.com/deux_v_MTIzNDU2.swf"
        );
    }

    #[test]
    fn test_56_picture_undecodable_page_id() {
        let result = resolve("http://www.56.com/p12/v_v_MTIz.html", &Services::default());
        assert!(matches!(
            result,
            Err(VideoError::NotRecognized { adapter: "56pic", .. })
        ));
    }

    #[test]
    fn test_netease_type_table() {
        assert_eq!(
            src("http://v.163.com/paike/V8H1BIE6T/V8H1BJ9LL.html"),
            "http://swf.ws.126.net/v/ljk/shareplayer/ShareFlvPlayer.swf?pltype=10&topicid=1000&vid=V8H1BJ9LL&sid=V8H1BIE6T&autoplay=false"
        );
    }

    #[test]
    fn test_netease_unknown_type_falls_through() {
        assert_eq!(
            resolve(
                "http://v.163.com/unknown/V8H1BIE6T/V8H1BJ9LL.html",
                &Services::default()
            ),
            Err(VideoError::NotRecognized {
                adapter: "netease",
                reason: "unknown video type unknown".to_owned(),
            })
        );
    }

    #[test]
    fn test_bilibili_default_page() {
        assert_eq!(
            src("http://www.bilibili.tv/video/av12345/"),
            "http://static.hdslb.com/miniloader.swf?aid=12345&page=1"
        );
        assert_eq!(
            src("http://www.bilibili.tv/video/av12345/index_3.html"),
            "http://static.hdslb.com/miniloader.swf?aid=12345&page=3"
        );
    }

    #[test]
    fn test_whitelisted_flash_passthrough() {
        let embed = resolve("http://player.cntv.cn/flashplayer/a.swf", &Services::default())
            .unwrap();
        assert_eq!(embed.adapter, "whitelist");
        assert_eq!(embed.player, Player::Flash);
        assert_eq!(embed.src, "http://player.cntv.cn/flashplayer/a.swf");
    }

    #[test]
    fn test_unknown_site() {
        assert_eq!(
            resolve("http://youku.com/fakeurl.swf", &Services::default()),
            Err(VideoError::NoMatch)
        );
    }

    #[test]
    fn test_html_sizes() {
        let embed = VideoEmbed {
            adapter: "qq",
            player: Player::Flash,
            src: "http://static.video.qq.com/TPout.swf?vid=abc&auto=0".to_owned(),
        };
        assert_eq!(
            embed.html(&RenderOptions::default().with_width(600)),
            "<embed src=\"http://static.video.qq.com/TPout.swf?vid=abc&amp;auto=0\" \
             type=\"application/x-shockwave-flash\" allowscriptaccess=\"sameDomain\" \
             allowfullscreen=\"true\" wmode=\"transparent\" quality=\"high\" \
             width=\"600\" height=\"500\"></embed>"
        );
    }
}
