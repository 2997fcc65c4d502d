//! DOM module: fetched documents and the selector queries run against them
//!
//! A [`Document`] keeps the raw source and is parsed on demand, so no
//! `scraper::Html` ever has to live across an await point.

pub mod query;
mod selector;

pub use selector::{AttrFilter, SelectorSpec};

use scraper::Html;
use thiserror::Error;
use url::Url;

/// Errors raised by selector handling
#[derive(Debug, Clone, Error)]
pub enum DomError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// A fetched page: the URL it was requested from plus its HTML source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    url: Url,
    source: String,
}

impl Document {
    pub fn new(url: Url, source: impl Into<String>) -> Self {
        Self {
            url,
            source: source.into(),
        }
    }

    /// The URL the document was requested from; relative links resolve against it
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parses the source into a queryable tree
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.source)
    }
}
