//! Batch orchestration
//!
//! A batch resolves one job's listing pages and extracts every article they
//! link to. Only configuration problems abort a batch; a listing failure
//! degrades to an empty batch and an article failure is recorded and skipped.

use crate::config::{validate_job, JobConfig};
use crate::crawler::extractor::{extract_article, Extraction, RecordLabels};
use crate::crawler::resolver::{resolve_page_list, ResolveError, ResolvedPages};
use crate::crawler::{ArticleRecord, PageSource};
use crate::output::BatchStats;
use crate::url::UrlTemplate;
use crate::ConfigError;
use chrono::{DateTime, Utc};

/// An article whose extraction failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedArticle {
    pub url: String,
    pub reason: String,
}

/// Everything a finished batch produced
#[derive(Debug)]
pub struct BatchReport {
    /// Name of the job that ran
    pub job: String,

    /// Extracted records, in URL order
    pub records: Vec<ArticleRecord>,

    /// Articles that failed, in the order they were attempted
    pub failures: Vec<FailedArticle>,

    /// Articles dropped for an empty title or content
    pub skipped: usize,

    /// Listing pages fetched during resolution
    pub listing_pages: usize,

    /// Distinct article URLs discovered
    pub discovered: usize,

    /// Set when resolution failed and the batch ran over no URLs
    pub resolution_error: Option<ResolveError>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    fn new(job: &str) -> Self {
        let now = Utc::now();
        Self {
            job: job.to_string(),
            records: Vec::new(),
            failures: Vec::new(),
            skipped: 0,
            listing_pages: 0,
            discovered: 0,
            resolution_error: None,
            started_at: now,
            finished_at: now,
        }
    }

    /// URLs of the failed articles
    pub fn failed_urls(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.url.as_str()).collect()
    }

    /// True if listing resolution failed
    pub fn is_degraded(&self) -> bool {
        self.resolution_error.is_some()
    }

    /// Summary counters for this batch
    pub fn stats(&self) -> BatchStats {
        let elapsed = self.finished_at - self.started_at;
        BatchStats {
            job: self.job.clone(),
            listing_pages: self.listing_pages,
            discovered: self.discovered,
            extracted: self.records.len(),
            skipped: self.skipped,
            failed: self.failures.len(),
            degraded: self.is_degraded(),
            elapsed_secs: elapsed.num_milliseconds() as f64 / 1000.0,
        }
    }
}

/// Runs jobs against a page source, one article at a time
pub struct BatchRunner<'a, S> {
    source: &'a mut S,
    show_progress: bool,
}

impl<'a, S: PageSource> BatchRunner<'a, S> {
    pub fn new(source: &'a mut S) -> Self {
        Self {
            source,
            show_progress: true,
        }
    }

    /// Whether per-page and per-article progress is logged at info level
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Runs one job to completion
    ///
    /// # Returns
    ///
    /// * `Ok(BatchReport)` - The batch ran, possibly degraded or with failures
    /// * `Err(ConfigError)` - The job is malformed; nothing was fetched
    pub async fn run(&mut self, job: &JobConfig) -> Result<BatchReport, ConfigError> {
        validate_job(job)?;

        let mut report = BatchReport::new(&job.name);
        let template = UrlTemplate::new(&job.url);
        let mode = job.fetch_mode();
        let selectors = &job.selectors;

        tracing::info!("Starting batch '{}' over {}", job.name, template.as_str());

        let resolved = match resolve_page_list(
            &mut *self.source,
            &template,
            mode,
            &job.page_range(),
            &selectors.page_list_anchor,
            self.show_progress,
        )
        .await
        {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::error!(
                    "Failed to resolve listing pages for job '{}' from template '{}': {}. \
                     Check url, start-page, end-page, step-page, custom-pageindex-list \
                     and selectors.page-list-anchor ({})",
                    job.name,
                    template.as_str(),
                    e,
                    selectors.page_list_anchor
                );
                let partial = ResolvedPages {
                    pages_fetched: e.pages_fetched(),
                    ..ResolvedPages::default()
                };
                report.resolution_error = Some(e);
                partial
            }
        };

        report.listing_pages = resolved.pages_fetched;
        report.discovered = resolved.urls.len();
        tracing::info!(
            "Resolved {} article URL(s) from {} listing page(s)",
            report.discovered,
            report.listing_pages
        );

        let labels = RecordLabels {
            category: job.category.clone(),
            owner_source: job.owner_source.clone(),
        };

        for (position, url) in resolved.urls.iter().enumerate() {
            if self.show_progress {
                tracing::info!("Article {}/{}: {}", position + 1, report.discovered, url);
            }

            match extract_article(&mut *self.source, url, mode, selectors, &labels).await {
                Ok(Extraction::Extracted(record)) => report.records.push(record),
                Ok(Extraction::Skipped(reason)) => {
                    tracing::debug!("Skipped {}: {:?}", url, reason);
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to extract {}: {}", url, e);
                    report.failures.push(FailedArticle {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.finished_at = Utc::now();

        if !report.failures.is_empty() {
            tracing::warn!(
                "{} article(s) failed in job '{}': {}",
                report.failures.len(),
                job.name,
                report.failed_urls().join(", ")
            );
        }

        tracing::info!(
            "Batch '{}' finished: {} extracted, {} skipped, {} failed",
            job.name,
            report.records.len(),
            report.skipped,
            report.failures.len()
        );

        Ok(report)
    }
}
