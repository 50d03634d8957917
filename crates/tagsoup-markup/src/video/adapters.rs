//! Per-site URL patterns and player templates.

use std::collections::HashMap;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use regex::Regex;

use super::lookup;
use super::{Player, VideoEmbed};
use crate::error::VideoError;
use crate::services::Services;

/// Named groups captured from a video URL.
pub(super) type Groups = HashMap<String, String>;

/// Extra step completing the template parameters after a pattern matched.
#[derive(Debug, Clone, Copy)]
enum Complete {
    /// Captured groups are used as they are.
    Nothing,
    /// `id` may come base64-encoded in `id_b64decode`.
    DecodeId,
    /// `vid`/`uid` may hide behind a `mix_vid` needing a lookup.
    Weibo,
    /// `id` may hide behind a page `url` needing a lookup.
    Sohu,
    /// `pltype`/`topicid` derived from the `vtype` path segment.
    NeteaseType,
    /// `page` defaults to 1.
    DefaultPage,
}

pub(super) struct Adapter {
    pub name: &'static str,
    player: Player,
    patterns: Vec<Regex>,
    template: &'static str,
    complete: Complete,
}

impl Adapter {
    fn new(
        name: &'static str,
        player: Player,
        patterns: &[&str],
        template: &'static str,
        complete: Complete,
    ) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p).expect("valid video pattern"))
            .collect();
        Self {
            name,
            player,
            patterns,
            template,
            complete,
        }
    }

    /// First pattern of the adapter, which recognizes the canonical page URL.
    pub(super) fn page_pattern(&self) -> &Regex {
        &self.patterns[0]
    }

    /// Build the embed if one of the patterns matches `url`.
    ///
    /// Returns `Ok(None)` when no pattern matches.
    pub(super) fn resolve(
        &self,
        url: &str,
        services: &Services,
    ) -> Result<Option<VideoEmbed>, VideoError> {
        let Some(mut groups) = self.patterns.iter().find_map(|re| captures(re, url)) else {
            return Ok(None);
        };
        self.complete_groups(&mut groups, services)?;
        let src = fill(self.template, &groups)
            .ok_or_else(|| VideoError::not_recognized(self.name, "incomplete identifier"))?;
        Ok(Some(VideoEmbed {
            adapter: self.name,
            player: self.player,
            src,
        }))
    }

    fn complete_groups(&self, groups: &mut Groups, services: &Services) -> Result<(), VideoError> {
        match self.complete {
            Complete::Nothing => {}
            Complete::DecodeId => {
                if !groups.contains_key("id")
                    && let Some(encoded) = groups.remove("id_b64decode")
                {
                    let id = URL_SAFE
                        .decode(&encoded)
                        .ok()
                        .and_then(|bytes| String::from_utf8(bytes).ok())
                        .ok_or_else(|| {
                            VideoError::not_recognized(self.name, "undecodable video id")
                        })?;
                    groups.insert("id".to_owned(), id);
                }
            }
            Complete::Weibo => {
                if !(groups.contains_key("vid") && groups.contains_key("uid"))
                    && let Some(mix_vid) = groups.remove("mix_vid")
                {
                    let (vid, uid) = lookup::weibo_ids(self, &mix_vid, services)?;
                    groups.insert("vid".to_owned(), vid);
                    groups.insert("uid".to_owned(), uid);
                }
            }
            Complete::Sohu => {
                if !groups.contains_key("id")
                    && let Some(page) = groups.remove("url")
                {
                    let id = lookup::sohu_id(self, &page, services)?;
                    groups.insert("id".to_owned(), id);
                }
            }
            Complete::NeteaseType => {
                if !groups.contains_key("pltype") {
                    let vtype = groups.remove("vtype").unwrap_or_default();
                    let (pltype, topicid) = netease_type(&vtype).ok_or_else(|| {
                        VideoError::not_recognized(
                            self.name,
                            format!("unknown video type {vtype}"),
                        )
                    })?;
                    groups.insert("pltype".to_owned(), pltype.to_owned());
                    groups.insert("topicid".to_owned(), topicid.to_owned());
                }
            }
            Complete::DefaultPage => {
                groups
                    .entry("page".to_owned())
                    .or_insert_with(|| "1".to_owned());
            }
        }
        Ok(())
    }
}

/// Named groups that took part in the match.
pub(super) fn captures(re: &Regex, url: &str) -> Option<Groups> {
    let caps = re.captures(url)?;
    let groups = re
        .capture_names()
        .flatten()
        .filter_map(|name| {
            caps.name(name)
                .map(|m| (name.to_owned(), m.as_str().to_owned()))
        })
        .collect();
    Some(groups)
}

/// Substitute `{name}` placeholders; `None` if a group is missing.
fn fill(template: &str, groups: &Groups) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let close = open + rest[open..].find('}')?;
        out.push_str(groups.get(&rest[open + 1..close])?);
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    Some(out)
}

fn netease_type(vtype: &str) -> Option<(&'static str, &'static str)> {
    let pair = match vtype {
        "zongyi" => ("4", "0085"),
        "jishi" => ("5", "0085"),
        "zixun" => ("6", "0085"),
        "yule" => ("8", "0085"),
        "mv" => ("9", "0085"),
        "paike" => ("10", "1000"),
        _ => return None,
    };
    Some(pair)
}

static ADAPTERS: LazyLock<Vec<Adapter>> = LazyLock::new(|| {
    use Complete::{DecodeId, DefaultPage, NeteaseType, Nothing, Sohu, Weibo};
    use Player::{Flash, Iframe};

    vec![
        Adapter::new(
            "youku",
            Iframe,
            &[
                r"^http://v\.youku\.com/v_show/id_(?P<id>X[\w=-]+)\.html",
                r"^http://player\.youku\.com/player\.php/+(?:.+?/)?sid/(?P<id>X[\w=-]+)/v\.swf",
                r"^http://player\.youku\.com/embed/(?P<id>X[\w=-]+)",
            ],
            "http://player.youku.com/embed/{id}",
            Nothing,
        ),
        Adapter::new(
            "tudou",
            Iframe,
            &[
                r"^http://(?:www\.)?tudou\.com/programs/view/(?P<id>[\w-]+)/",
                r"^http://(?:www\.)?tudou\.com/programs/view/html5embed\.action\?code=(?P<id>[\w-]+)",
                r"^http://(?:www\.)?tudou\.com/(?:listplay|albumplay)/(?:[\w-]+)/(?P<id>[\w-]+)\.html",
                r"^http://(?:www\.)?tudou\.com/v/(?P<id>[\w-]+)/v\.swf",
            ],
            "http://www.tudou.com/programs/view/html5embed.action?code={id}",
            Nothing,
        ),
        Adapter::new(
            "ku6",
            Flash,
            &[
                r"^http://v\.ku6\.com/show/(?P<id>[\w.-]+)\.html",
                r"^http://player\.ku6\.com/refer/(?P<id>[\w.-]+)/v\.swf",
            ],
            "http://player.ku6.com/refer/{id}/v.swf",
            Nothing,
        ),
        Adapter::new(
            "56",
            Iframe,
            &[
                r"^http://(?:www\.)?56\.com/(?:u\d+/v_|w\d+/play_album-aid-\d+_vid-)(?P<id>[\w=-]+)\.html",
                r"^http://player\.56\.com/v_(?P<id>[\w=-]+)\.swf",
                r"^http://(?:www\.)?56\.com/iframe/(?P<id>[\w=-]+)",
            ],
            "http://www.56.com/iframe/{id}",
            Nothing,
        ),
        Adapter::new(
            "56pic",
            Flash,
            &[
                r"^http://(?:www\.)?56\.com/p\d+/v_(?P<id_b64decode>v_[\w=-]+)\.html",
                r"^http://player\.56\.com/deux_(?P<id>v_[\w=-]+)\.swf",
            ],
            "http://player.56.com/deux_{id}.swf",
            DecodeId,
        ),
        Adapter::new(
            "qq",
            Flash,
            &[
                r"^http://v\.qq\.com/cover/./[\w=-]+\.html\?vid=(?P<id>[\w=-]+)",
                r"^http://v\.qq\.com/cover/./[\w=-]+/(?P<id>[\w=-]+)\.html",
                r"^http://v\.qq\.com/page/./././(?P<id>[\w=-]+)\.html",
                r"^http://static\.video\.qq\.com/TPout\.swf\?vid=(?P<id>[\w=-]+)",
            ],
            "http://static.video.qq.com/TPout.swf?vid={id}&auto=0",
            Nothing,
        ),
        Adapter::new(
            "sina",
            Flash,
            &[
                r"^http://video\.sina\.com\.cn/v/b/(?P<vid>\d+)-(?P<uid>\d+)\.html",
                r"^http://video\.weibo\.com/v/weishipin/(?P<mix_vid>[\w-]+)\.htm",
                r"^http://you\.video\.sina\.com\.cn/api/sinawebApi/outplayrefer\.php/vid=(?P<vid>\d+)_(?P<uid>\d+)",
            ],
            "http://you.video.sina.com.cn/api/sinawebApi/outplayrefer.php/vid={vid}_{uid}/s.swf",
            Weibo,
        ),
        Adapter::new(
            "sohu",
            Flash,
            &[
                r"^http://share\.vrs\.sohu\.com/(?P<id>\d+)/v\.swf",
                r"^(?P<url>http://tv\.sohu\.com/\d+/n\d+\.shtml)",
            ],
            // the player really takes `&` here
            "http://share.vrs.sohu.com/{id}/v.swf&autoplay=false",
            Sohu,
        ),
        Adapter::new(
            "open163",
            Flash,
            &[
                r"^http://v\.163\.com/movie/\d{4}/\d{1,2}/[A-Z\d]/[A-Z\d]/(?P<id>[A-Z\d]+_[A-Z\d]+)\.html",
                r"^http://swf\.ws\.126\.net/openplayer/v01/-0-2_(?P<id>[A-Z\d]+_[A-Z\d]+)-",
            ],
            "http://swf.ws.126.net/openplayer/v01/-0-2_{id}-.swf",
            Nothing,
        ),
        Adapter::new(
            "netease",
            Flash,
            &[
                r"^http://v\.163\.com/(?P<vtype>[^/]+)/(?P<sid>[A-Z\d]+)/(?P<vid>[A-Z\d]+)\.html",
                r"^http://swf\.ws\.126\.net/v/ljk/shareplayer/ShareFlvPlayer\.swf\?pltype=(?P<pltype>\d+)&topicid=(?P<topicid>\d+)&vid=(?P<vid>[A-Z\d]+)&sid=(?P<sid>[A-Z\d]+)",
            ],
            "http://swf.ws.126.net/v/ljk/shareplayer/ShareFlvPlayer.swf?pltype={pltype}&topicid={topicid}&vid={vid}&sid={sid}&autoplay=false",
            NeteaseType,
        ),
        Adapter::new(
            "letv",
            Flash,
            &[
                r"^http://www\.letv\.com/ptv/vplay/(?P<id>\d+)\.html",
                r"^http://(?:i7\.imgs|img1\.c0)\.letv\.com/.+?/swfPlayer\.swf\?.*?id=(?P<id>\d+)",
            ],
            "http://i7.imgs.letv.com/player/swfPlayer.swf?id={id}&autoplay=0",
            Nothing,
        ),
        Adapter::new(
            "acfun",
            Flash,
            &[
                r"^(?P<id>http://www\.acfun\.tv/v/ac\d+)",
                r"^http://cdn\.acfun\.tv/player/ACFlashPlayer\.weibo2\.swf\?type=page&url=(?P<id>[^&]+)",
            ],
            "http://cdn.acfun.tv/player/ACFlashPlayer.weibo2.swf?type=page&url={id}",
            Nothing,
        ),
        Adapter::new(
            "bilibili",
            Flash,
            &[
                r"^http://www\.bilibili\.tv/video/av(?P<id>\d+)(?:/index_(?P<page>\d+))?",
                r"^http://static\.hdslb\.com/miniloader\.swf\?aid=(?P<id>\d+)(?:&page=(?P<page>\d+))?",
            ],
            "http://static.hdslb.com/miniloader.swf?aid={id}&page={page}",
            DefaultPage,
        ),
        Adapter::new(
            "whitelist",
            Flash,
            &[concat!(
                r"^(?P<url>https?://(?:player\.youku\.com|www\.tudou\.com|",
                r"player\.ku6\.com|player\.56\.com|",
                r"share\.vrs\.sohu\.com|\w+\.video\.sina\.com\.cn|",
                r"\w+\.video\.qq\.com|swf\.ws\.126\.net|",
                r"player\.cntv\.cn|",
                r"union\.bokecc\.com|\w+\.video\.qiyi\.com)/.+)$"
            )],
            "{url}",
            Nothing,
        ),
    ]
});

/// Every adapter in the order they are tried.
pub(super) fn all() -> &'static [Adapter] {
    &ADAPTERS
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn groups(pairs: &[(&str, &str)]) -> Groups {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_fill_template() {
        assert_eq!(
            fill("a/{id}/b?p={page}", &groups(&[("id", "1"), ("page", "2")])).as_deref(),
            Some("a/1/b?p=2")
        );
    }

    #[test]
    fn test_fill_missing_group() {
        assert_eq!(fill("a/{id}", &groups(&[])), None);
    }

    #[test]
    fn test_captures_skip_unmatched_groups() {
        let re = Regex::new(r"^a(?P<x>\d+)(?:-(?P<y>\d+))?").unwrap();
        assert_eq!(captures(&re, "a12"), Some(groups(&[("x", "12")])));
        assert_eq!(captures(&re, "b"), None);
    }

    #[test]
    fn test_adapter_names_are_unique() {
        let mut names: Vec<_> = all().iter().map(|a| a.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), all().len());
    }

    #[test]
    fn test_page_patterns() {
        let sina = all().iter().find(|a| a.name == "sina").unwrap();
        assert!(
            sina.page_pattern()
                .is_match("http://video.sina.com.cn/v/b/123-456.html")
        );
    }
}
