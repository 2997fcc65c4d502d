//! In-memory page source shared by the crawler tests

use crate::config::{BannerSpec, FetchModeConfig, JobConfig, SelectorsConfig};
use crate::crawler::{FetchError, FetchMode, PageSource};
use crate::dom::{Document, SelectorSpec};
use std::collections::HashMap;
use url::Url;

/// Serves canned pages and records every fetch
#[derive(Default)]
pub struct StaticPages {
    pub pages: HashMap<String, String>,
    pub fetched: Vec<String>,
}

impl StaticPages {
    pub fn with(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

impl PageSource for StaticPages {
    async fn fetch(&mut self, url: &Url, _mode: FetchMode) -> Result<Document, FetchError> {
        self.fetched.push(url.to_string());
        match self.pages.get(url.as_str()) {
            Some(html) => Ok(Document::new(url.clone(), html.clone())),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Listing page with one `a.read-more` anchor per href, plus a navigation link
pub fn listing(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|h| format!(r#"<a class="read-more" href="{}">more</a>"#, h))
        .collect();
    format!(
        r#"<html><body><a class="nav" href="/home">home</a>{}</body></html>"#,
        anchors
    )
}

/// Article page matching the selectors of [`job`]
pub fn article(title: &str, body: &str, images: &[&str]) -> String {
    let images: String = images
        .iter()
        .map(|src| format!(r#"<img src="{}">"#, src))
        .collect();
    format!(
        r#"<html><head><title>{title}</title></head><body>
        <h1 class="headline">{title}</h1>
        <img class="hero" src="banner.jpg">
        <div class="article-body"><p>{body}</p>{images}</div>
        </body></html>"#,
        title = title,
        body = body,
        images = images,
    )
}

/// A job over `https://x/p-{0}` for pages `start..=end`
pub fn job(start: i64, end: i64) -> JobConfig {
    JobConfig {
        name: "clinic".to_string(),
        url: "https://x/p-{0}".to_string(),
        fetch_mode: FetchModeConfig::Static,
        reuse_session: false,
        category: "healthcare".to_string(),
        owner_source: "Example Clinic".to_string(),
        start_page: start,
        end_page: end,
        step_page: 1,
        custom_pageindex_list: None,
        selectors: SelectorsConfig {
            page_list_anchor: SelectorSpec::tag("a").with_class("read-more"),
            title: SelectorSpec::tag("h1").with_class("headline"),
            content_area: SelectorSpec::tag("div").with_class("article-body"),
            banner: BannerSpec {
                region: SelectorSpec::tag("img").with_class("hero"),
                source_attribute: "src".to_string(),
            },
            image_area: None,
        },
    }
}
