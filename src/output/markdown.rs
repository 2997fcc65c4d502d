//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of a harvest,
//! one section per batch, including each batch's failure list.

use crate::crawler::BatchReport;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of `reports` to `output_path`
///
/// # Arguments
///
/// * `reports` - The finished batches, in the order they ran
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(reports: &[BatchReport], output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(reports);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats finished batches as markdown
pub fn format_markdown_summary(reports: &[BatchReport]) -> String {
    let mut md = String::new();

    md.push_str("# Article Harvest Summary\n\n");

    let total_records: usize = reports.iter().map(|r| r.records.len()).sum();
    let total_failures: usize = reports.iter().map(|r| r.failures.len()).sum();
    md.push_str(&format!("- **Jobs**: {}\n", reports.len()));
    md.push_str(&format!("- **Records**: {}\n", total_records));
    md.push_str(&format!("- **Failed Articles**: {}\n\n", total_failures));

    for report in reports {
        push_report(&mut md, report);
    }

    md.push_str("---\n\n");
    md.push_str(&format!(
        "*Generated by article-harvest at {}*\n",
        chrono::Utc::now().to_rfc3339()
    ));

    md
}

fn push_report(md: &mut String, report: &BatchReport) {
    let stats = report.stats();

    md.push_str(&format!("## Job `{}`\n\n", report.job));
    md.push_str(&format!(
        "- **Started**: {}\n",
        report.started_at.to_rfc3339()
    ));
    md.push_str(&format!("- **Duration**: {:.1} seconds\n", stats.elapsed_secs));
    if let Some(error) = &report.resolution_error {
        md.push_str(&format!("- **Listing resolution failed**: {}\n", error));
    }
    md.push('\n');

    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Listing pages | {} |\n", stats.listing_pages));
    md.push_str(&format!("| Discovered | {} |\n", stats.discovered));
    md.push_str(&format!("| Extracted | {} |\n", stats.extracted));
    md.push_str(&format!("| Skipped | {} |\n", stats.skipped));
    md.push_str(&format!("| Failed | {} |\n\n", stats.failed));

    if !report.records.is_empty() {
        md.push_str("### Records\n\n");
        for record in &report.records {
            md.push_str(&format!(
                "- [{}]({}) ({} image(s))\n",
                record.title,
                record.url,
                record.images.len()
            ));
        }
        md.push('\n');
    }

    if !report.failures.is_empty() {
        md.push_str("### Failed Articles\n\n");
        md.push_str("| URL | Reason |\n");
        md.push_str("|-----|--------|\n");
        for failure in &report.failures {
            md.push_str(&format!(
                "| {} | {} |\n",
                failure.url,
                failure.reason.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }
}
