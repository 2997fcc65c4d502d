//! Storage module for persisting extracted records
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Sequential record appends into named collections
//! - Run tracking with per-run failure lists

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteSink;
pub use traits::{RecordSink, SinkError, SinkResult};

use crate::crawler::{ArticleRecord, BatchReport};

/// Represents one persisted batch run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub job: String,
    pub config_hash: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub status: RunStatus,
    pub listing_pages: u64,
    pub discovered: u64,
    pub extracted: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Status of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    /// Listing resolution failed and the batch ran over no URLs
    Degraded,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Degraded => "degraded",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "degraded" => Some(Self::Degraded),
            _ => None,
        }
    }
}

/// Connects to the store at `address` and appends `records` one by one
///
/// Connecting is a precondition: when it fails nothing is inserted and the
/// error is returned as [`SinkError::Connect`].
///
/// # Returns
///
/// The number of records appended
pub fn store_records(
    address: &str,
    collection: &str,
    records: &[ArticleRecord],
) -> SinkResult<usize> {
    let mut sink = SqliteSink::connect(address)?;
    append_records(&mut sink, collection, records)
}

/// Appends `records` to `collection` in order
pub fn append_records<S: RecordSink>(
    sink: &mut S,
    collection: &str,
    records: &[ArticleRecord],
) -> SinkResult<usize> {
    for record in records {
        sink.append_one(collection, record)?;
    }
    tracing::info!("Inserted {} record(s) into '{}'", records.len(), collection);
    Ok(records.len())
}

/// Persists a finished batch: its run row, its records and its failure list
///
/// # Returns
///
/// The id of the run row
pub fn persist_report<S: RecordSink>(
    sink: &mut S,
    collection: &str,
    config_hash: &str,
    report: &BatchReport,
) -> SinkResult<i64> {
    let run_id = sink.begin_run(&report.job, config_hash)?;

    append_records(sink, collection, &report.records)?;
    for failure in &report.failures {
        sink.record_failure(run_id, &failure.url, &failure.reason)?;
    }

    let status = if report.is_degraded() {
        RunStatus::Degraded
    } else {
        RunStatus::Completed
    };
    sink.finish_run(run_id, status, &report.stats())?;

    Ok(run_id)
}
