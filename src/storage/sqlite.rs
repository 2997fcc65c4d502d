//! SQLite sink implementation
//!
//! This module provides a SQLite-based implementation of the RecordSink trait.

use crate::crawler::ArticleRecord;
use crate::output::BatchStats;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordSink, SinkError, SinkResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const RUN_COLUMNS: &str = "id, job, config_hash, started_at, finished_at, status, \
     listing_pages, discovered, extracted, skipped, failed";

/// SQLite record sink
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens (or creates) the record store at `address`
    ///
    /// # Arguments
    ///
    /// * `address` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteSink)` - Store is open and its schema is in place
    /// * `Err(SinkError::Connect)` - The store could not be opened or initialized
    pub fn connect(address: &str) -> SinkResult<Self> {
        let connect_error = |source| SinkError::Connect {
            address: address.to_string(),
            source,
        };

        let conn = Connection::open(address).map_err(connect_error)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )
        .map_err(connect_error)?;
        initialize_schema(&conn).map_err(connect_error)?;

        tracing::debug!("Connected to record store {}", address);
        Ok(Self { conn })
    }

    /// Creates an in-memory store (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str, params: impl rusqlite::Params) -> SinkResult<u64> {
        let count: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        job: row.get(1)?,
        config_hash: row.get(2)?,
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
        listing_pages: row.get::<_, i64>(6)? as u64,
        discovered: row.get::<_, i64>(7)? as u64,
        extracted: row.get::<_, i64>(8)? as u64,
        skipped: row.get::<_, i64>(9)? as u64,
        failed: row.get::<_, i64>(10)? as u64,
    })
}

impl RecordSink for SqliteSink {
    // ===== Records =====

    fn append_one(&mut self, collection: &str, record: &ArticleRecord) -> SinkResult<()> {
        let images = serde_json::to_string(&record.images)?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO articles
                (collection, url, category, title, owner_source, content, banner, images,
                 inserted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                collection,
                record.url,
                record.category,
                record.title,
                record.owner_source,
                record.content,
                record.banner,
                images,
                now
            ],
        )?;
        Ok(())
    }

    fn count_records(&self, collection: &str) -> SinkResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM articles WHERE collection = ?1",
            params![collection],
        )
    }

    fn load_records(&self, collection: &str) -> SinkResult<Vec<ArticleRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, category, title, owner_source, content, banner, images
             FROM articles WHERE collection = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![collection], |row| {
                Ok((
                    ArticleRecord {
                        url: row.get(0)?,
                        category: row.get(1)?,
                        title: row.get(2)?,
                        owner_source: row.get(3)?,
                        content: row.get(4)?,
                        banner: row.get(5)?,
                        images: Vec::new(),
                    },
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(mut record, images)| -> SinkResult<ArticleRecord> {
                record.images = serde_json::from_str(&images)?;
                Ok(record)
            })
            .collect()
    }

    fn list_collections(&self) -> SinkResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT collection, COUNT(*) FROM articles GROUP BY collection ORDER BY collection",
        )?;

        let collections = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(collections)
    }

    // ===== Run Bookkeeping =====

    fn begin_run(&mut self, job: &str, config_hash: &str) -> SinkResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (job, config_hash, started_at, status) VALUES (?1, ?2, ?3, ?4)",
            params![job, config_hash, now, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn record_failure(&mut self, run_id: i64, url: &str, reason: &str) -> SinkResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO failed_urls (run_id, url, reason, failed_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, url, reason, now],
        )?;
        Ok(())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        stats: &BatchStats,
    ) -> SinkResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, listing_pages = ?3, discovered = ?4,
             extracted = ?5, skipped = ?6, failed = ?7 WHERE id = ?8",
            params![
                status.to_db_string(),
                now,
                stats.listing_pages as i64,
                stats.discovered as i64,
                stats.extracted as i64,
                stats.skipped as i64,
                stats.failed as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(SinkError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> SinkResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(SinkError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> SinkResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    // ===== Statistics =====

    fn count_runs(&self) -> SinkResult<u64> {
        self.count("SELECT COUNT(*) FROM runs", [])
    }

    fn count_failures(&self) -> SinkResult<u64> {
        self.count("SELECT COUNT(*) FROM failed_urls", [])
    }

    fn failed_urls(&self, run_id: i64) -> SinkResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM failed_urls WHERE run_id = ?1 ORDER BY id")?;
        let urls = stmt
            .query_map(params![run_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(urls)
    }
}
