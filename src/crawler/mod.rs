//! Crawler module: page fetching, listing resolution and article extraction
//!
//! This module contains the scraping pipeline:
//! - Page fetching, static or through a browser session
//! - Listing page resolution into a deduplicated set of article URLs
//! - Per-article extraction into an [`ArticleRecord`]
//! - Batch orchestration that tolerates individual failures

mod batch;
mod extractor;
mod fetcher;
mod resolver;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchReport, BatchRunner, FailedArticle};
pub use extractor::{
    extract_article, extract_from_document, ArticleRecord, ExtractError, Extraction,
    RecordLabels, SkipReason,
};
pub use fetcher::{
    build_http_client, fetch_static, FetchError, FetchMode, Navigation, PageFetcher, PageSource,
};
pub use resolver::{extract_article_links, resolve_page_list, ResolveError, ResolvedPages};
pub use session::{BrowserSession, RenderSession};
