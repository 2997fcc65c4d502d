//! Batch and store statistics
//!
//! This module provides the counters of a single batch and the aggregate
//! statistics read back from the record store.

use crate::storage::{RecordSink, RunRecord, SinkResult};

/// Counters of one finished batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
    /// Job name
    pub job: String,

    /// Listing pages fetched
    pub listing_pages: usize,

    /// Distinct article URLs discovered
    pub discovered: usize,

    /// Records produced
    pub extracted: usize,

    /// Articles dropped for an empty title or content
    pub skipped: usize,

    /// Articles that failed
    pub failed: usize,

    /// Listing resolution failed
    pub degraded: bool,

    pub elapsed_secs: f64,
}

impl BatchStats {
    /// Share of discovered articles that produced a record, in percent
    pub fn success_rate(&self) -> f64 {
        if self.discovered == 0 {
            0.0
        } else {
            (self.extracted as f64 / self.discovered as f64) * 100.0
        }
    }
}

/// Aggregate statistics of a record store
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Record count per collection, sorted by name
    pub collections: Vec<(String, u64)>,

    /// Total number of batch runs
    pub total_runs: u64,

    /// Total number of failed articles across runs
    pub total_failures: u64,

    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,
}

impl StoreStatistics {
    pub fn total_records(&self) -> u64 {
        self.collections.iter().map(|(_, count)| count).sum()
    }
}

/// Loads statistics from the record store
///
/// # Arguments
///
/// * `sink` - The store to query
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(SinkError)` - Failed to query statistics
pub fn load_statistics(sink: &dyn RecordSink) -> SinkResult<StoreStatistics> {
    Ok(StoreStatistics {
        collections: sink.list_collections()?,
        total_runs: sink.count_runs()?,
        total_failures: sink.count_failures()?,
        latest_run: sink.get_latest_run()?,
    })
}

/// Prints the counters of one batch to stdout
pub fn print_batch_stats(stats: &BatchStats) {
    println!("=== Batch '{}' ===", stats.job);
    if stats.degraded {
        println!("  Listing resolution failed; no articles were attempted");
    }
    println!("  Listing pages fetched: {}", stats.listing_pages);
    println!("  Articles discovered: {}", stats.discovered);
    println!(
        "  Extracted: {} ({:.1}%)",
        stats.extracted,
        stats.success_rate()
    );
    println!("  Skipped (empty title or content): {}", stats.skipped);
    println!("  Failed: {}", stats.failed);
    println!("  Elapsed: {:.1}s", stats.elapsed_secs);
    println!();
}

/// Prints store statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Record Store Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total_records());
    println!("  Batch runs: {}", stats.total_runs);
    println!("  Failed articles: {}", stats.total_failures);
    println!();

    if !stats.collections.is_empty() {
        println!("Collections:");
        for (name, count) in &stats.collections {
            println!("  {}: {}", name, count);
        }
        println!();
    }

    if let Some(run) = &stats.latest_run {
        println!("Latest Run:");
        println!("  #{} '{}' ({})", run.id, run.job, run.status.to_db_string());
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!(
            "  {} extracted, {} skipped, {} failed of {} discovered",
            run.extracted, run.skipped, run.failed, run.discovered
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::ArticleRecord;
    use crate::storage::{RunStatus, SqliteSink};

    fn stats(discovered: usize, extracted: usize) -> BatchStats {
        BatchStats {
            job: "clinic".to_string(),
            listing_pages: 1,
            discovered,
            extracted,
            skipped: 0,
            failed: discovered - extracted,
            degraded: false,
            elapsed_secs: 0.2,
        }
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(stats(0, 0).success_rate(), 0.0);
        assert_eq!(stats(4, 3).success_rate(), 75.0);
    }

    #[test]
    fn test_load_statistics() {
        let mut sink = SqliteSink::new_in_memory().unwrap();
        let record = ArticleRecord {
            url: "https://x/a".to_string(),
            category: "c".to_string(),
            title: "t".to_string(),
            owner_source: "o".to_string(),
            content: "body".to_string(),
            banner: None,
            images: Vec::new(),
        };
        sink.append_one("articles", &record).unwrap();
        sink.append_one("news", &record).unwrap();
        let run_id = sink.begin_run("clinic", "hash").unwrap();
        sink.record_failure(run_id, "https://x/b", "HTTP 500").unwrap();
        sink.finish_run(run_id, RunStatus::Completed, &stats(2, 1))
            .unwrap();

        let loaded = load_statistics(&sink).unwrap();

        assert_eq!(loaded.total_records(), 2);
        assert_eq!(loaded.total_runs, 1);
        assert_eq!(loaded.total_failures, 1);
        assert_eq!(loaded.latest_run.unwrap().status, RunStatus::Completed);
    }
}
