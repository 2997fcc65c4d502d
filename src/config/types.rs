use crate::crawler::{FetchMode, Navigation};
use crate::dom::SelectorSpec;
use crate::url::{PageIndex, PageRange};
use serde::Deserialize;

/// Main configuration structure for Article Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobConfig>,
}

impl Config {
    /// Looks up a job by name
    pub fn job(&self, name: &str) -> Option<&JobConfig> {
        self.jobs.iter().find(|job| job.name == name)
    }
}

/// HTTP client configuration for static fetches
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Headless browser configuration for rendered fetches
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(rename = "no-sandbox", default = "default_true")]
    pub no_sandbox: bool,

    #[serde(rename = "window-width", default = "default_window_width")]
    pub window_width: u32,

    #[serde(rename = "window-height", default = "default_window_height")]
    pub window_height: u32,

    /// Extra wait after navigation before the document is read (milliseconds)
    #[serde(rename = "render-grace-ms", default = "default_render_grace_ms")]
    pub render_grace_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            no_sandbox: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            render_grace_ms: default_render_grace_ms(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Collection the article records are appended to
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Path to the markdown batch report, if one should be written
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,

    /// Log every listing page and article at info level
    #[serde(rename = "show-progress", default = "default_true")]
    pub show_progress: bool,
}

/// How listing and article pages are retrieved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchModeConfig {
    #[default]
    Static,
    Rendered,
}

/// One crawl job: a paginated listing plus the selectors for its articles
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Unique job name
    pub name: String,

    /// Listing URL template with a `{0}` placeholder for the page index
    pub url: String,

    #[serde(rename = "fetch-mode", default)]
    pub fetch_mode: FetchModeConfig,

    /// Reuse the browser's current document instead of navigating (connector mode)
    #[serde(rename = "reuse-session", default)]
    pub reuse_session: bool,

    #[serde(default = "default_label")]
    pub category: String,

    #[serde(rename = "owner-source", default = "default_label")]
    pub owner_source: String,

    #[serde(rename = "start-page")]
    pub start_page: i64,

    #[serde(rename = "end-page")]
    pub end_page: i64,

    #[serde(rename = "step-page")]
    pub step_page: i64,

    /// Explicit page indexes; when non-empty they replace the numeric range
    #[serde(rename = "custom-pageindex-list", default)]
    pub custom_pageindex_list: Option<Vec<PageIndex>>,

    pub selectors: SelectorsConfig,
}

impl JobConfig {
    /// The page range this job walks; a non-empty custom list wins over the numeric range
    pub fn page_range(&self) -> PageRange {
        match &self.custom_pageindex_list {
            Some(list) if !list.is_empty() => PageRange::Explicit(list.clone()),
            _ => PageRange::Span {
                start: self.start_page,
                end: self.end_page,
                step: self.step_page,
            },
        }
    }

    /// The fetch mode for this job
    pub fn fetch_mode(&self) -> FetchMode {
        match self.fetch_mode {
            FetchModeConfig::Static => FetchMode::Static,
            FetchModeConfig::Rendered if self.reuse_session => {
                FetchMode::Rendered(Navigation::ReuseCurrent)
            }
            FetchModeConfig::Rendered => FetchMode::Rendered(Navigation::Navigate),
        }
    }
}

/// The five DOM regions a job extracts from
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorsConfig {
    /// Anchors on a listing page that point to articles
    #[serde(rename = "page-list-anchor")]
    pub page_list_anchor: SelectorSpec,

    pub title: SelectorSpec,

    #[serde(rename = "content-area")]
    pub content_area: SelectorSpec,

    pub banner: BannerSpec,

    /// Region searched for inline images; defaults to the content region
    #[serde(rename = "image-area", default)]
    pub image_area: Option<SelectorSpec>,
}

/// Banner image region plus the attribute holding the image URL
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BannerSpec {
    #[serde(flatten)]
    pub region: SelectorSpec,

    #[serde(rename = "source-attribute", default = "default_source_attribute")]
    pub source_attribute: String,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_render_grace_ms() -> u64 {
    500
}

fn default_collection() -> String {
    "articles".to_string()
}

fn default_label() -> String {
    "Not defined".to_string()
}

fn default_source_attribute() -> String {
    "src".to_string()
}
