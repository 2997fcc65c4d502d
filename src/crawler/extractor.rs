//! Article extraction
//!
//! Turns one article page into an [`ArticleRecord`]. The three outcomes are
//! kept apart by type:
//! - `Ok(Extraction::Extracted(record))`: a complete record
//! - `Ok(Extraction::Skipped(reason))`: the page was read but its title or
//!   content came out empty; no record, not a failure
//! - `Err(ExtractError)`: the page could not be fetched or a required region
//!   was missing with no fallback

use crate::config::{BannerSpec, SelectorsConfig};
use crate::crawler::{FetchError, FetchMode, PageSource};
use crate::dom::{query, Document, SelectorSpec};
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

const IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// One extracted article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub category: String,
    pub title: String,
    pub owner_source: String,
    /// Article text as single-space separated tokens
    pub content: String,
    /// Banner image URL, as written in the page
    pub banner: Option<String>,
    /// Inline images in encounter order, without duplicates and without the banner
    pub images: Vec<String>,
}

/// Caller-supplied labels attached to every record of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLabels {
    pub category: String,
    pub owner_source: String,
}

/// Why a page produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyTitle,
    EmptyContent,
}

/// Result of a successful extraction attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Extracted(ArticleRecord),
    Skipped(SkipReason),
}

/// Errors that fail a single article
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("title selector {selector} did not match and the page has no <title>")]
    MissingTitle { selector: String },

    #[error("image area {selector} not found")]
    MissingImageArea { selector: String },
}

/// Fetches `url` and extracts an article record from it
pub async fn extract_article<S: PageSource>(
    source: &mut S,
    url: &Url,
    mode: FetchMode,
    selectors: &SelectorsConfig,
    labels: &RecordLabels,
) -> Result<Extraction, ExtractError> {
    let document = source.fetch(url, mode).await?;
    extract_from_document(&document, selectors, labels)
}

/// Extracts an article record from an already fetched document
///
/// # Steps
///
/// 1. Title: stripped text fragments of the title region joined by spaces,
///    falling back to the document `<title>`; no title element at all fails.
/// 2. Content: token-joined text of the content region, falling back to the
///    document's first element.
/// 3. Banner: the configured attribute of the banner image; optional.
/// 4. Images: `.jpg`/`.jpeg`/`.png` sources inside the image area (the
///    content region when none is configured), banner removed.
///
/// Extraction is a pure function of the document, so re-running it against an
/// unchanged page yields an identical record.
pub fn extract_from_document(
    document: &Document,
    selectors: &SelectorsConfig,
    labels: &RecordLabels,
) -> Result<Extraction, ExtractError> {
    let html = document.parse();

    let title = extract_title(&html, &selectors.title)?;
    if title.is_empty() {
        return Ok(Extraction::Skipped(SkipReason::EmptyTitle));
    }

    let content_region = content_region(&html, &selectors.content_area);
    let content = query::token_text(content_region);
    if content.is_empty() {
        return Ok(Extraction::Skipped(SkipReason::EmptyContent));
    }

    let banner = extract_banner(&html, &selectors.banner);

    let image_region = match &selectors.image_area {
        Some(spec) => query::find(&html, spec).ok_or_else(|| ExtractError::MissingImageArea {
            selector: spec.to_string(),
        })?,
        None => content_region,
    };
    let images = collect_images(image_region, banner.as_deref());

    Ok(Extraction::Extracted(ArticleRecord {
        url: document.url().to_string(),
        category: labels.category.clone(),
        title,
        owner_source: labels.owner_source.clone(),
        content,
        banner,
        images,
    }))
}

/// Title text, falling back to the document `<title>`
fn extract_title(html: &Html, spec: &SelectorSpec) -> Result<String, ExtractError> {
    match query::find(html, spec) {
        Some(element) => Ok(query::stripped_strings(element).join(" ")),
        None => query::document_title(html).ok_or_else(|| ExtractError::MissingTitle {
            selector: spec.to_string(),
        }),
    }
}

/// The content region, or the document's first element when the selector misses
fn content_region<'a>(html: &'a Html, spec: &SelectorSpec) -> ElementRef<'a> {
    query::find(html, spec).unwrap_or_else(|| query::first_element(html))
}

/// Banner image URL read from the configured attribute
///
/// The banner region may be the image itself or any element containing it.
fn extract_banner(html: &Html, banner: &BannerSpec) -> Option<String> {
    let region = query::find(html, &banner.region)?;
    let image = if region.value().name().eq_ignore_ascii_case("img") {
        region
    } else {
        query::find_within(region, &SelectorSpec::tag("img"))
            .into_iter()
            .next()?
    };

    image
        .value()
        .attr(&banner.source_attribute)
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}

/// Image sources below `area` with a supported extension, banner excluded
fn collect_images(area: ElementRef<'_>, banner: Option<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    query::find_within(area, &SelectorSpec::tag("img"))
        .into_iter()
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| is_supported_image(src))
        .filter(|src| Some(*src) != banner)
        .filter(|src| seen.insert(*src))
        .map(str::to_string)
        .collect()
}

fn is_supported_image(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
