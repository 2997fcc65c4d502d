//! Sink traits and error types
//!
//! This module defines the trait interface for record sinks and the
//! associated error types.

use crate::crawler::ArticleRecord;
use crate::output::BatchStats;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during sink operations
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to connect to record store '{address}': {source}")]
    Connect {
        address: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// A persistent, append-only home for extracted records
///
/// Writes are sequential single-record appends with no atomicity across a
/// batch; a failed append leaves earlier appends in place.
pub trait RecordSink {
    // ===== Records =====

    /// Appends one record to `collection`
    fn append_one(&mut self, collection: &str, record: &ArticleRecord) -> SinkResult<()>;

    /// Counts the records stored in `collection`
    fn count_records(&self, collection: &str) -> SinkResult<u64>;

    /// Loads every record of `collection` in insertion order
    fn load_records(&self, collection: &str) -> SinkResult<Vec<ArticleRecord>>;

    /// Lists collection names with their record counts, sorted by name
    fn list_collections(&self) -> SinkResult<Vec<(String, u64)>>;

    // ===== Run Bookkeeping =====

    /// Opens a run for `job` and returns its id
    fn begin_run(&mut self, job: &str, config_hash: &str) -> SinkResult<i64>;

    /// Records an article that failed during `run_id`
    fn record_failure(&mut self, run_id: i64, url: &str, reason: &str) -> SinkResult<()>;

    /// Closes a run with its final counters
    fn finish_run(&mut self, run_id: i64, status: RunStatus, stats: &BatchStats)
        -> SinkResult<()>;

    /// Gets a run by id
    fn get_run(&self, run_id: i64) -> SinkResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> SinkResult<Option<RunRecord>>;

    // ===== Statistics =====

    /// Counts all runs
    fn count_runs(&self) -> SinkResult<u64>;

    /// Counts all recorded failures
    fn count_failures(&self) -> SinkResult<u64>;

    /// Failed URLs of one run, in the order they were recorded
    fn failed_urls(&self, run_id: i64) -> SinkResult<Vec<String>>;
}
