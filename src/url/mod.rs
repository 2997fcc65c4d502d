//! URL handling module for Article Harvest
//!
//! This module provides listing URL templates, page ranges, and resolution of
//! article hrefs against the listing page they were found on.

mod range;
mod template;

pub use range::{PageIndex, PageIndices, PageRange, RangeError};
pub use template::UrlTemplate;

use url::Url;

/// Returns true if `href` starts with a URL scheme (`https:`, `mailto:`, ...)
pub fn has_scheme(href: &str) -> bool {
    match href.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Resolves an href found on `base` into an absolute URL
///
/// Hrefs that already carry a scheme are parsed as they are; everything else
/// is joined against the listing page's own URL.
///
/// Returns None for empty hrefs and hrefs that cannot be resolved.
///
/// # Examples
///
/// ```
/// use article_harvest::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://x/p-1").unwrap();
/// assert_eq!(resolve_href("/a", &base).unwrap().as_str(), "https://x/a");
/// ```
pub fn resolve_href(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    if has_scheme(href) {
        Url::parse(href).ok()
    } else {
        base.join(href).ok()
    }
}
