//! Article Harvest main entry point
//!
//! This is the command-line interface for the Article Harvest pipeline.

use anyhow::Context;
use article_harvest::config::{load_config_with_hash, Config, JobConfig};
use article_harvest::crawler::{
    extract_article, BatchReport, BatchRunner, Extraction, PageFetcher, RecordLabels,
};
use article_harvest::output::{
    generate_markdown_summary, load_statistics, print_batch_stats, print_statistics,
};
use article_harvest::storage::{persist_report, SqliteSink};
use article_harvest::{ConfigError, ConfigResult, HarvestError};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Article Harvest: paginated article extraction
///
/// Walks the listing pages of each configured job, extracts every linked
/// article into a record (title, content, banner, images) and appends the
/// records to a SQLite record store.
#[derive(Parser, Debug)]
#[command(name = "article-harvest")]
#[command(version)]
#[command(about = "Harvests articles from paginated listings", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run only the named job
    #[arg(long, value_name = "NAME")]
    job: Option<String>,

    /// Validate config and list the listing pages each job would fetch
    #[arg(long, conflicts_with_all = ["stats", "extract"])]
    dry_run: bool,

    /// Show statistics from the record store and exit
    #[arg(long, conflicts_with_all = ["dry_run", "extract"])]
    stats: bool,

    /// Extract a single article with the selected job's selectors and print it as JSON
    #[arg(long, value_name = "URL", conflicts_with_all = ["dry_run", "stats"])]
    extract: Option<Url>,

    /// Run batches without writing to the record store
    #[arg(long)]
    no_store: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let jobs = select_jobs(&config, cli.job.as_deref())?;

    if cli.dry_run {
        handle_dry_run(&config, &jobs)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(url) = &cli.extract {
        let job = jobs.first().copied().context("no job configured")?;
        handle_extract(&config, job, url).await?;
    } else {
        handle_harvest(&config, &config_hash, &jobs, !cli.no_store).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("article_harvest=info,warn"),
            1 => EnvFilter::new("article_harvest=debug,info"),
            2 => EnvFilter::new("article_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// The named job, or every configured job
fn select_jobs<'a>(config: &'a Config, name: Option<&str>) -> ConfigResult<Vec<&'a JobConfig>> {
    match name {
        Some(name) => config
            .job(name)
            .map(|job| vec![job])
            .ok_or_else(|| ConfigError::UnknownJob(name.to_string())),
        None => Ok(config.jobs.iter().collect()),
    }
}

/// Handles the --dry-run mode: validates config and lists listing pages
fn handle_dry_run(config: &Config, jobs: &[&JobConfig]) -> article_harvest::Result<()> {
    println!("=== Article Harvest Dry Run ===\n");

    println!("Output:");
    println!("  Database: {}", config.output.database_path);
    println!("  Collection: {}", config.output.collection);
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    for job in jobs {
        let template = article_harvest::UrlTemplate::new(&job.url);
        let range = job.page_range();

        println!("\nJob '{}' ({:?} fetch):", job.name, job.fetch_mode());
        println!("  Category: {}", job.category);
        println!("  Owner source: {}", job.owner_source);
        println!("  Listing pages ({}):", range.page_count()?);
        for index in range.indices()? {
            println!("    * {}", template.expand(&index));
        }
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the record store
fn handle_stats(config: &Config) -> article_harvest::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let sink = SqliteSink::connect(&config.output.database_path)?;
    let stats = load_statistics(&sink)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --extract mode: one article, printed as JSON
async fn handle_extract(
    config: &Config,
    job: &JobConfig,
    url: &Url,
) -> article_harvest::Result<()> {
    let mut fetcher = PageFetcher::new(&config.http, &config.browser)?;
    let labels = RecordLabels {
        category: job.category.clone(),
        owner_source: job.owner_source.clone(),
    };

    let outcome =
        extract_article(&mut fetcher, url, job.fetch_mode(), &job.selectors, &labels).await;
    fetcher.close().await;

    match outcome? {
        Extraction::Extracted(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Extraction::Skipped(reason) => println!("Skipped {}: {:?}", url, reason),
    }

    Ok(())
}

/// Handles the main harvest: every selected job, then persistence and reporting
async fn handle_harvest(
    config: &Config,
    config_hash: &str,
    jobs: &[&JobConfig],
    store: bool,
) -> article_harvest::Result<()> {
    // The record store is a precondition; connect before fetching anything
    let mut sink = if store {
        match SqliteSink::connect(&config.output.database_path) {
            Ok(sink) => Some(sink),
            Err(e) => {
                tracing::error!("Record store unavailable, no records inserted: {}", e);
                return Err(e.into());
            }
        }
    } else {
        tracing::info!("Running without a record store");
        None
    };

    let mut fetcher = PageFetcher::new(&config.http, &config.browser)?;
    let mut reports: Vec<BatchReport> = Vec::with_capacity(jobs.len());

    for job in jobs {
        // A reused session starts each job from that job's own listing page
        fetcher.forget_page();

        let report = BatchRunner::new(&mut fetcher)
            .show_progress(config.output.show_progress)
            .run(job)
            .await;
        let report = match report {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Job '{}' is misconfigured: {}", job.name, e);
                fetcher.close().await;
                return Err(HarvestError::Config(e));
            }
        };

        print_batch_stats(&report.stats());

        if let Some(sink) = sink.as_mut() {
            match persist_report(sink, &config.output.collection, config_hash, &report) {
                Ok(run_id) => tracing::info!("Stored job '{}' as run {}", job.name, run_id),
                Err(e) => {
                    tracing::error!("Failed to persist job '{}': {}", job.name, e);
                    fetcher.close().await;
                    return Err(e.into());
                }
            }
        }

        reports.push(report);
    }

    fetcher.close().await;

    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(&reports, Path::new(path))?;
        println!("✓ Summary written to: {}", path);
    }

    Ok(())
}
