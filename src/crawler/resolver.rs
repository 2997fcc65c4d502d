//! Page list resolution
//!
//! Expands a listing URL template over a page range, fetches every listing
//! page and collects the article links found on them.

use crate::crawler::{FetchError, FetchMode, PageSource};
use crate::dom::{query, Document, SelectorSpec};
use crate::url::{resolve_href, PageRange, RangeError, UrlTemplate};
use std::collections::BTreeSet;
use thiserror::Error;
use url::Url;

/// Errors that abort page list resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid page range: {0}")]
    Range(#[from] RangeError),

    #[error("listing URL '{url}' is invalid: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: ::url::ParseError,
    },

    #[error("failed to fetch listing page after {pages_fetched} page(s): {source}")]
    Fetch {
        /// Listing pages fetched before the failing one
        pages_fetched: usize,
        #[source]
        source: FetchError,
    },
}

impl ResolveError {
    /// Listing pages successfully fetched before resolution stopped
    pub fn pages_fetched(&self) -> usize {
        match self {
            Self::Fetch { pages_fetched, .. } => *pages_fetched,
            Self::Range(_) | Self::InvalidUrl { .. } => 0,
        }
    }
}

/// Article links discovered across all listing pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPages {
    /// Deduplicated absolute article URLs
    pub urls: BTreeSet<Url>,

    /// Number of listing pages fetched
    pub pages_fetched: usize,
}

/// Resolves a paginated listing into the set of article URLs it links to
///
/// # Algorithm
///
/// For each index of `range`, the index is substituted into `template`, the
/// listing page is fetched with `mode`, and every element matching `anchor`
/// that carries an `href` contributes one URL. Relative hrefs are resolved
/// against the listing page's own URL.
///
/// A fetch failure on any listing page aborts the whole resolution.
///
/// # Arguments
///
/// * `source` - Where pages are fetched from
/// * `template` - Listing URL with a `{0}` slot
/// * `mode` - Static or rendered fetch
/// * `range` - Page indexes to visit
/// * `anchor` - Selector for the article links on each listing page
/// * `show_progress` - Log every listing page at info level
pub async fn resolve_page_list<S: PageSource>(
    source: &mut S,
    template: &UrlTemplate,
    mode: FetchMode,
    range: &PageRange,
    anchor: &SelectorSpec,
    show_progress: bool,
) -> Result<ResolvedPages, ResolveError> {
    let total = range.page_count()?;
    let mut resolved = ResolvedPages::default();

    for (position, index) in range.indices()?.enumerate() {
        let raw = template.expand(&index);
        let url = Url::parse(&raw).map_err(|source| ResolveError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;

        if show_progress {
            tracing::info!("Page number {}/{}: {}", position + 1, total, url);
        } else {
            tracing::debug!("Fetching listing page {}", url);
        }

        let document = source
            .fetch(&url, mode)
            .await
            .map_err(|error| ResolveError::Fetch {
                pages_fetched: resolved.pages_fetched,
                source: error,
            })?;
        resolved.pages_fetched += 1;

        let links = extract_article_links(&document, anchor);
        tracing::debug!("Found {} article link(s) on {}", links.len(), url);
        resolved.urls.extend(links);
    }

    Ok(resolved)
}

/// Extracts the article links of one listing page, in document order
pub fn extract_article_links(document: &Document, anchor: &SelectorSpec) -> Vec<Url> {
    let html = document.parse();
    query::find_all(&html, anchor, Some("href"))
        .into_iter()
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| {
            let resolved = resolve_href(href, document.url());
            if resolved.is_none() {
                tracing::debug!("Skipping unresolvable href '{}' on {}", href, document.url());
            }
            resolved
        })
        .collect()
}
