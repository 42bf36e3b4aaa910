//! Album metadata: the storage identifier and the cover art reference.

use crate::session::BrowserPage;
use crate::{Result, RipError};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

fn css_url_regex() -> &'static Regex {
    static CSS_URL: OnceLock<Regex> = OnceLock::new();
    CSS_URL.get_or_init(|| {
        Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^"'\s)]*))\s*\)"#)
            .expect("static regex is valid")
    })
}

/// The album's identifier: the last non-empty path segment of its link.
///
/// Pure string transform; the page is never visited. A query string or
/// fragment is cut off first so it cannot leak into a directory name.
///
/// ```
/// use albumrip::album::derive_identifier;
///
/// assert_eq!(derive_identifier("https://x/y/my-album"), "my-album");
/// assert_eq!(derive_identifier("https://x/y/my-album/"), "my-album");
/// ```
pub fn derive_identifier(source_link: &str) -> String {
    let path = source_link
        .split(['?', '#'])
        .next()
        .unwrap_or(source_link);
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}

/// Pull the image URL out of a CSS `url("...")` wrapper.
///
/// Accepts either the bare `background-image` value or a whole inline style
/// declaration. The `url(` prefix, closing paren and matching quotes are
/// removed and nothing else is touched, so a quoted URL may itself contain
/// parentheses or the other quote character.
pub fn parse_cover_reference(style: &str) -> Option<String> {
    let captures = css_url_regex().captures(style)?;
    (1..=3)
        .find_map(|group| captures.get(group))
        .map(|url| url.as_str().to_string())
        .filter(|url| !url.is_empty())
}

/// Find the cover reference in page markup.
///
/// Only the first element matching `selector` is considered; the source page
/// renders the album art before any per-track artwork.
pub fn cover_reference_from_markup(html: &str, selector: &str) -> Result<String> {
    let selector = Selector::parse(selector)
        .map_err(|e| RipError::Parse(format!("Invalid cover selector '{selector}': {e}")))?;
    let document = Html::parse_document(html);

    let element = document
        .select(&selector)
        .next()
        .ok_or_else(|| RipError::Artwork("No cover art element on the page".to_string()))?;

    let style = element
        .value()
        .attr("style")
        .ok_or_else(|| RipError::Artwork("Cover art element has no inline style".to_string()))?;

    parse_cover_reference(style)
        .ok_or_else(|| RipError::Artwork(format!("No url(...) in cover style '{style}'")))
}

/// Read the cover reference from the page's current markup.
///
/// The reference is only meaningful for the navigation that rendered it, so
/// call this right after the album page loads.
pub async fn extract_cover_reference(page: &dyn BrowserPage, selector: &str) -> Result<String> {
    let html = page.content().await?;
    let cover = cover_reference_from_markup(&html, selector)?;
    log::debug!("Cover art reference: {cover}");
    Ok(cover)
}
