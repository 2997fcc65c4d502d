//! Headless browser session for rendered fetches
//!
//! One session is kept per fetcher and reused across pages. Navigating it is a
//! destructive state change: the document it returns always reflects the most
//! recent navigation, so callers must not drive it from two batches at once.

use crate::config::BrowserConfig;
use crate::crawler::FetchError;
use url::Url;

#[cfg(feature = "browser")]
pub use chromium::BrowserSession;

#[cfg(not(feature = "browser"))]
pub use unavailable::BrowserSession;

/// A browser tab that a fetcher can drive
///
/// `navigate` loads a page and replaces whatever the tab showed before;
/// `current_document` reads the tab as it is, without any navigation.
#[allow(async_fn_in_trait)]
pub trait RenderSession: Sized {
    /// Starts a session with a blank tab
    async fn launch(config: &BrowserConfig, user_agent: &str) -> Result<Self, FetchError>;

    /// Loads `url`, waits for it to settle, and returns the rendered HTML
    async fn navigate(&mut self, url: &Url) -> Result<String, FetchError>;

    /// Returns the HTML of whatever the tab currently shows
    async fn current_document(&mut self) -> Result<String, FetchError>;

    /// Shuts the session down
    async fn close(self);
}

#[cfg(feature = "browser")]
mod chromium {
    use super::*;
    use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
    use chromiumoxide::Page;
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::task::JoinHandle;

    /// A running Chromium instance with a single tab
    pub struct BrowserSession {
        browser: Browser,
        page: Page,
        handler: JoinHandle<()>,
        grace: Duration,
    }

    fn browser_error(context: &str, error: impl std::fmt::Display) -> FetchError {
        FetchError::Browser {
            context: context.to_string(),
            message: error.to_string(),
        }
    }

    impl RenderSession for BrowserSession {
        async fn launch(config: &BrowserConfig, user_agent: &str) -> Result<Self, FetchError> {
            let mut builder = ChromiumConfig::builder()
                .window_size(config.window_width, config.window_height)
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .arg(format!("--user-agent={}", user_agent));
            if !config.headless {
                builder = builder.with_head();
            }
            if config.no_sandbox {
                builder = builder.no_sandbox();
            }
            let chromium = builder
                .build()
                .map_err(|e| browser_error("configuring the browser", e))?;

            let (browser, mut handler) = Browser::launch(chromium)
                .await
                .map_err(|e| browser_error("launching the browser", e))?;

            // The CDP handler must be polled for the browser to make progress
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| browser_error("opening a tab", e))?;

            Ok(Self {
                browser,
                page,
                handler,
                grace: Duration::from_millis(config.render_grace_ms),
            })
        }

        async fn navigate(&mut self, url: &Url) -> Result<String, FetchError> {
            let context = format!("navigating to {}", url);
            self.page
                .goto(url.as_str())
                .await
                .map_err(|e| browser_error(&context, e))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| browser_error(&context, e))?;

            if !self.grace.is_zero() {
                tokio::time::sleep(self.grace).await;
            }

            self.current_document().await
        }

        async fn current_document(&mut self) -> Result<String, FetchError> {
            self.page
                .content()
                .await
                .map_err(|e| browser_error("reading the current document", e))
        }

        async fn close(mut self) {
            if let Err(e) = self.browser.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
            let _ = self.browser.wait().await;
            self.handler.abort();
        }
    }
}

#[cfg(not(feature = "browser"))]
mod unavailable {
    use super::*;

    /// Placeholder used when the crate is built without the `browser` feature
    pub struct BrowserSession {
        _private: (),
    }

    impl RenderSession for BrowserSession {
        async fn launch(_config: &BrowserConfig, _user_agent: &str) -> Result<Self, FetchError> {
            Err(FetchError::RendererUnavailable)
        }

        async fn navigate(&mut self, _url: &Url) -> Result<String, FetchError> {
            Err(FetchError::RendererUnavailable)
        }

        async fn current_document(&mut self) -> Result<String, FetchError> {
            Err(FetchError::RendererUnavailable)
        }

        async fn close(self) {}
    }
}
