//! Article Harvest: paginated article extraction
//!
//! This crate walks paginated listing pages, collects the article links they
//! expose, extracts a fixed record shape (title, content, banner, images) from
//! every article and appends the results to a SQLite-backed record store.
//! Individual article failures are collected instead of aborting the batch.

pub mod config;
pub mod crawler;
pub mod dom;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Article Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Page range error: {0}")]
    Range(#[from] crate::url::RangeError),

    #[error("Extraction error: {0}")]
    Extract(#[from] crawler::ExtractError),

    #[error("Sink error: {0}")]
    Sink(#[from] storage::SinkError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Unknown job: {0}")]
    UnknownJob(String),
}

/// Result type alias for Article Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, JobConfig};
pub use crawler::{ArticleRecord, BatchReport, BatchRunner, Extraction, FetchMode, PageFetcher};
pub use dom::{Document, SelectorSpec};
pub use crate::url::{PageIndex, PageRange, UrlTemplate};
