//! Output module for batch summaries and reports
//!
//! This module handles:
//! - Batch counters and stored statistics
//! - Markdown summaries of a harvest

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{
    load_statistics, print_batch_stats, print_statistics, BatchStats, StoreStatistics,
};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
