//! HTML output helpers shared by every node kind.
//!
//! Text is escaped with [`escape_text`] before it reaches the output, attribute
//! values with [`escape_attr`]. URLs pass through [`safe_url`], which swaps
//! script schemes for [`XSS_PLACEHOLDER`] and percent-quotes everything outside
//! a fixed allowlist.

use std::cmp::Ordering;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Harmless replacement emitted instead of a rejected URL or style value.
pub const XSS_PLACEHOLDER: &str = "<!-- XSS removed -->";

/// Default embed width in pixels.
pub const DEFAULT_WIDTH: u32 = 480;

/// Characters left untouched by URL quoting: alphanumerics plus `-_.+/:;"%&#()=?`.
const URL_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'+')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'"')
    .remove(b'%')
    .remove(b'&')
    .remove(b'#')
    .remove(b'(')
    .remove(b')')
    .remove(b'=')
    .remove(b'?');

/// Image format used for rendered math formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MathFormat {
    Svg,
    #[default]
    Png,
}

impl MathFormat {
    /// File extension of the format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    /// Pick the formula format a browser can display.
    ///
    /// Browsers known to render inline SVG get [`MathFormat::Svg`]; anything
    /// unknown, or a missing name or version, falls back to PNG.
    ///
    /// # Example
    ///
    /// ```
    /// use tagsoup_markup::MathFormat;
    ///
    /// assert_eq!(MathFormat::for_browser("firefox", "31.0"), MathFormat::Svg);
    /// assert_eq!(MathFormat::for_browser("msie", "8.0"), MathFormat::Png);
    /// assert_eq!(MathFormat::for_browser("", ""), MathFormat::Png);
    /// ```
    #[must_use]
    pub fn for_browser(browser: &str, version: &str) -> Self {
        if browser.is_empty() || version.is_empty() {
            return Self::Png;
        }
        let version = parse_version(version);
        let at_least = |min: &[u32]| compare_versions(&version, min) != Ordering::Less;
        let svg = match browser.to_ascii_lowercase().as_str() {
            "msie" => at_least(&[9]),
            "firefox" => at_least(&[4]),
            "webkit" => at_least(&[522]),
            "chrome" | "konqueror" => true,
            "safari" => at_least(&[3, 0]),
            "opera" => compare_versions(&version, &[9, 5]) == Ordering::Greater,
            _ => false,
        };
        if svg { Self::Svg } else { Self::Png }
    }
}

/// Numeric components of a dotted version, stopping at the first non-numeric part.
fn parse_version(version: &str) -> Vec<u32> {
    version
        .split('.')
        .map_while(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .collect()
}

/// Compare versions component-wise, missing components counting as zero.
fn compare_versions(a: &[u32], b: &[u32]) -> Ordering {
    (0..a.len().max(b.len()))
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Options controlling HTML rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Embed width in pixels for images, videos and flash.
    pub width: u32,
    /// Turn trailing newlines of plain text into `<br />`.
    pub break_on_newline: bool,
    /// Formula image format.
    pub math_format: MathFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            break_on_newline: true,
            math_format: MathFormat::default(),
        }
    }
}

impl RenderOptions {
    /// Set the embed width.
    #[must_use]
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Set the formula image format.
    #[must_use]
    pub fn with_math_format(mut self, format: MathFormat) -> Self {
        self.math_format = format;
        self
    }

    /// Same options with automatic line breaks turned off.
    #[must_use]
    pub fn without_breaks(self) -> Self {
        Self {
            break_on_newline: false,
            ..self
        }
    }

    /// Embed height derived from the width.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.width / 6 * 5 + self.width % 6 * 5 / 6
    }
}

/// Escape `&`, `<` and `>` for use in element content.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape for use inside a double-quoted attribute value.
#[must_use]
pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

/// Whether a URL uses a script scheme.
pub(crate) fn is_script_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("javascript:") || lower.starts_with("vbscript:")
}

/// Percent-quote a URL with the safe allowlist.
#[must_use]
pub fn quote_url(url: &str) -> String {
    utf8_percent_encode(url, URL_SAFE).to_string()
}

/// Prepare a URL for an HTML attribute.
///
/// Script schemes become [`XSS_PLACEHOLDER`]; the result is then
/// percent-quoted and attribute-escaped.
///
/// # Example
///
/// ```
/// use tagsoup_markup::safe_url;
///
/// assert_eq!(safe_url("http://g.cn/a b"), "http://g.cn/a%20b");
/// assert_eq!(
///     safe_url("JavaScript:alert(1)"),
///     "%3C%21--%20XSS%20removed%20--%3E"
/// );
/// ```
#[must_use]
pub fn safe_url(url: &str) -> String {
    let url = if is_script_url(url) {
        XSS_PLACEHOLDER
    } else {
        url
    };
    escape_attr(&quote_url(url))
}

/// Flash plugin `<embed>` element.
pub(crate) fn embed_html(src: &str, options: &RenderOptions) -> String {
    format!(
        "<embed src=\"{}\" type=\"application/x-shockwave-flash\" \
         allowscriptaccess=\"sameDomain\" allowfullscreen=\"true\" \
         wmode=\"transparent\" quality=\"high\" width=\"{}\" height=\"{}\"></embed>",
        safe_url(src),
        options.width,
        options.height()
    )
}

/// `<iframe>` player element.
pub(crate) fn iframe_html(src: &str, options: &RenderOptions) -> String {
    format!(
        "<iframe src=\"{}\" frameborder=\"0\" allowfullscreen=\"true\" \
         width=\"{}\" height=\"{}\"></iframe>",
        safe_url(src),
        options.width,
        options.height()
    )
}
