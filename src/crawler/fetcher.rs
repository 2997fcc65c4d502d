//! Page fetcher implementation
//!
//! This module retrieves listing and article pages, either:
//! - statically, with a plain HTTP GET through `reqwest`
//! - rendered, through a long-lived headless browser session
//!
//! Both paths return a [`Document`] carrying the requested URL, which is the
//! base every relative href on the page is resolved against.

use crate::config::{BrowserConfig, HttpConfig};
use crate::crawler::session::{BrowserSession, RenderSession};
use crate::dom::Document;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Whether a rendered fetch loads the URL or reads what the session already shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Load the URL in the browser and wait for it to render
    Navigate,
    /// Read the session's current document without navigating (connector mode)
    ReuseCurrent,
}

/// How a page is retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain HTTP retrieval without script execution
    Static,
    /// Retrieval through the browser session
    Rendered(Navigation),
}

/// Errors that can occur while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Browser error while {context}: {message}")]
    Browser { context: String, message: String },

    #[error("Rendered fetch requested but the browser feature is not enabled")]
    RendererUnavailable,
}

/// Anything that can turn a URL into a document
///
/// The resolver and extractor only depend on this trait, so tests can serve
/// canned pages without a network.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&mut self, url: &Url, mode: FetchMode) -> Result<Document, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use article_harvest::config::HttpConfig;
/// use article_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a plain GET and returns the response body
///
/// Non-2xx responses are errors; the body of an error page is never handed to
/// the extractor.
pub async fn fetch_static(client: &Client, url: &Url) -> Result<String, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify_error(url, e))
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

/// The production page source: an HTTP client plus a lazily launched browser
///
/// The browser session is an explicit handle. [`PageFetcher::navigate`] loads
/// a page into it; a [`Navigation::ReuseCurrent`] fetch reads back whatever
/// the last navigation left there. A reuse on a session that has not loaded
/// anything yet navigates to the requested URL once.
pub struct PageFetcher<R = BrowserSession> {
    client: Client,
    user_agent: String,
    browser_config: BrowserConfig,
    session: Option<R>,
    has_page: bool,
}

impl PageFetcher<BrowserSession> {
    /// Creates a fetcher; the browser is only launched on the first rendered fetch
    pub fn new(http: &HttpConfig, browser: &BrowserConfig) -> Result<Self, FetchError> {
        Self::build(http, browser, None)
    }
}

impl<R: RenderSession> PageFetcher<R> {
    /// Creates a fetcher around an already started session
    pub fn with_session(
        http: &HttpConfig,
        browser: &BrowserConfig,
        session: R,
    ) -> Result<Self, FetchError> {
        Self::build(http, browser, Some(session))
    }

    fn build(
        http: &HttpConfig,
        browser: &BrowserConfig,
        session: Option<R>,
    ) -> Result<Self, FetchError> {
        let client = build_http_client(http).map_err(FetchError::Client)?;
        Ok(Self {
            client,
            user_agent: http.user_agent.clone(),
            browser_config: browser.clone(),
            session,
            has_page: false,
        })
    }

    /// Returns the browser session, launching it if needed
    async fn session(&mut self) -> Result<&mut R, FetchError> {
        let session = match self.session.take() {
            Some(session) => session,
            None => {
                tracing::info!("Launching browser session for rendered fetches");
                self.has_page = false;
                R::launch(&self.browser_config, &self.user_agent).await?
            }
        };
        Ok(self.session.insert(session))
    }

    /// The session handle, if one has been started
    pub fn session_mut(&mut self) -> Option<&mut R> {
        self.session.as_mut()
    }

    /// Treats the session as empty, so the next reuse navigates first
    pub fn forget_page(&mut self) {
        self.has_page = false;
    }

    /// Loads `url` in the browser session and returns the rendered document
    pub async fn navigate(&mut self, url: &Url) -> Result<Document, FetchError> {
        let source = self.session().await?.navigate(url).await?;
        self.has_page = true;
        Ok(Document::new(url.clone(), source))
    }

    /// Returns the session's current document without navigating
    ///
    /// The document keeps `url` as its base for href resolution.
    pub async fn reuse_current(&mut self, url: &Url) -> Result<Document, FetchError> {
        if !self.has_page {
            tracing::debug!("Session has no page loaded yet, navigating to {}", url);
            return self.navigate(url).await;
        }
        let source = self.session().await?.current_document().await?;
        Ok(Document::new(url.clone(), source))
    }

    /// Shuts down the browser session, if one was started
    pub async fn close(mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
        }
    }
}

impl<R: RenderSession> PageSource for PageFetcher<R> {
    async fn fetch(&mut self, url: &Url, mode: FetchMode) -> Result<Document, FetchError> {
        match mode {
            FetchMode::Static => {
                let source = fetch_static(&self.client, url).await?;
                Ok(Document::new(url.clone(), source))
            }
            FetchMode::Rendered(Navigation::Navigate) => self.navigate(url).await,
            FetchMode::Rendered(Navigation::ReuseCurrent) => self.reuse_current(url).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> PageFetcher {
        PageFetcher::new(&HttpConfig::default(), &BrowserConfig::default()).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&HttpConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_static_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/p-1", server.uri())).unwrap();
        let document = fetcher().fetch(&url, FetchMode::Static).await.unwrap();

        assert_eq!(document.url(), &url);
        assert_eq!(document.source(), "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_static_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let result = fetcher().fetch(&url, FetchMode::Static).await;

        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_static_fetch_connection_refused() {
        let url = Url::parse("http://127.0.0.1:9/unreachable").unwrap();
        let result = fetcher().fetch(&url, FetchMode::Static).await;
        assert!(result.is_err());
    }

    /// A tab that serves canned pages and remembers what it was told to load
    struct ScriptedSession {
        pages: HashMap<String, String>,
        shown: String,
        navigations: Vec<String>,
    }

    impl ScriptedSession {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
                shown: "<html></html>".to_string(),
                navigations: Vec::new(),
            }
        }
    }

    impl RenderSession for ScriptedSession {
        async fn launch(_config: &BrowserConfig, _user_agent: &str) -> Result<Self, FetchError> {
            Ok(Self::new(&[]))
        }

        async fn navigate(&mut self, url: &Url) -> Result<String, FetchError> {
            self.navigations.push(url.to_string());
            self.shown = self
                .pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| FetchError::Browser {
                    context: format!("navigating to {}", url),
                    message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
                })?;
            Ok(self.shown.clone())
        }

        async fn current_document(&mut self) -> Result<String, FetchError> {
            Ok(self.shown.clone())
        }

        async fn close(self) {}
    }

    fn scripted(pages: &[(&str, &str)]) -> PageFetcher<ScriptedSession> {
        PageFetcher::with_session(
            &HttpConfig::default(),
            &BrowserConfig::default(),
            ScriptedSession::new(pages),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_reuse_current_returns_last_navigation() {
        let mut fetcher = scripted(&[
            ("https://x/login", "<p>dashboard</p>"),
            ("https://x/p-1", "<p>first listing</p>"),
        ]);
        let listing = Url::parse("https://x/p-1").unwrap();

        fetcher
            .navigate(&Url::parse("https://x/login").unwrap())
            .await
            .unwrap();
        let document = fetcher
            .fetch(&listing, FetchMode::Rendered(Navigation::ReuseCurrent))
            .await
            .unwrap();

        assert_eq!(document.source(), "<p>dashboard</p>");
        assert_eq!(document.url(), &listing);
        assert_eq!(
            fetcher.session_mut().unwrap().navigations,
            vec!["https://x/login"]
        );
    }

    #[tokio::test]
    async fn test_reuse_on_fresh_session_navigates_once() {
        let mut fetcher = scripted(&[
            ("https://x/p-1", "<p>first listing</p>"),
            ("https://x/p-2", "<p>second listing</p>"),
        ]);
        let reuse = FetchMode::Rendered(Navigation::ReuseCurrent);

        let first = fetcher
            .fetch(&Url::parse("https://x/p-1").unwrap(), reuse)
            .await
            .unwrap();
        let second = fetcher
            .fetch(&Url::parse("https://x/p-2").unwrap(), reuse)
            .await
            .unwrap();

        assert_eq!(first.source(), "<p>first listing</p>");
        assert_eq!(second.source(), "<p>first listing</p>");
        assert_eq!(
            fetcher.session_mut().unwrap().navigations,
            vec!["https://x/p-1"]
        );
    }

    #[tokio::test]
    async fn test_navigate_replaces_current_document() {
        let mut fetcher = scripted(&[
            ("https://x/a", "<p>article a</p>"),
            ("https://x/b", "<p>article b</p>"),
        ]);
        let navigate = FetchMode::Rendered(Navigation::Navigate);

        fetcher
            .fetch(&Url::parse("https://x/a").unwrap(), navigate)
            .await
            .unwrap();
        fetcher
            .fetch(&Url::parse("https://x/b").unwrap(), navigate)
            .await
            .unwrap();
        let current = fetcher
            .reuse_current(&Url::parse("https://x/a").unwrap())
            .await
            .unwrap();

        assert_eq!(current.source(), "<p>article b</p>");
    }

    #[tokio::test]
    async fn test_forget_page_forces_navigation() {
        let mut fetcher = scripted(&[
            ("https://x/a", "<p>article a</p>"),
            ("https://x/p-1", "<p>listing</p>"),
        ]);

        fetcher
            .navigate(&Url::parse("https://x/a").unwrap())
            .await
            .unwrap();
        fetcher.forget_page();
        let reused = fetcher
            .reuse_current(&Url::parse("https://x/p-1").unwrap())
            .await
            .unwrap();

        assert_eq!(reused.source(), "<p>listing</p>");
    }

    #[tokio::test]
    async fn test_failed_navigation_leaves_no_page() {
        let mut fetcher = scripted(&[("https://x/p-1", "<p>listing</p>")]);

        let missing = fetcher
            .navigate(&Url::parse("https://x/gone").unwrap())
            .await;
        let reused = fetcher
            .reuse_current(&Url::parse("https://x/p-1").unwrap())
            .await
            .unwrap();

        assert!(matches!(missing, Err(FetchError::Browser { .. })));
        assert_eq!(reused.source(), "<p>listing</p>");
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_rendered_fetch_without_browser_feature() {
        let url = Url::parse("https://example.com/").unwrap();
        let result = fetcher()
            .fetch(&url, FetchMode::Rendered(Navigation::Navigate))
            .await;
        assert!(matches!(result, Err(FetchError::RendererUnavailable)));
    }
}
