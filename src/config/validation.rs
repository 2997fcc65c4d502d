use crate::config::types::{BrowserConfig, Config, JobConfig, OutputConfig, SelectorsConfig};
use crate::dom::SelectorSpec;
use crate::url::UrlTemplate;
use crate::{ConfigError, ConfigResult};
use std::collections::HashSet;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_output_config(&config.output)?;
    validate_browser_config(&config.browser)?;

    if config.jobs.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[job]] must be configured".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for job in &config.jobs {
        validate_job(job)?;
        if !names.insert(job.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate job name '{}'",
                job.name
            )));
        }
    }

    Ok(())
}

/// Validates a single job
///
/// This runs again at the start of every batch, so a job assembled in code
/// gets the same checks as one loaded from a file.
pub fn validate_job(job: &JobConfig) -> ConfigResult<()> {
    if job.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "job name cannot be empty".to_string(),
        ));
    }

    let template = UrlTemplate::new(&job.url);
    if !template.has_placeholder() {
        return Err(ConfigError::Validation(format!(
            "job '{}': url template '{}' has no {{0}} placeholder",
            job.name, job.url
        )));
    }

    let sample = template.expand(&crate::url::PageIndex::Number(1));
    let parsed = ::url::Url::parse(&sample).map_err(|e| {
        ConfigError::InvalidUrl(format!("job '{}': '{}': {}", job.name, job.url, e))
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "job '{}': url '{}' must use http or https",
            job.name, job.url
        )));
    }

    job.page_range()
        .validate()
        .map_err(|e| ConfigError::Validation(format!("job '{}': {}", job.name, e)))?;

    validate_selectors(&job.name, &job.selectors)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.collection.trim().is_empty() {
        return Err(ConfigError::Validation(
            "collection cannot be empty".to_string(),
        ));
    }

    if matches!(&config.summary_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_browser_config(config: &BrowserConfig) -> ConfigResult<()> {
    if config.window_width == 0 || config.window_height == 0 {
        return Err(ConfigError::Validation(format!(
            "browser window must be non-empty, got {}x{}",
            config.window_width, config.window_height
        )));
    }
    Ok(())
}

fn validate_selectors(job: &str, selectors: &SelectorsConfig) -> ConfigResult<()> {
    validate_selector(job, "page-list-anchor", &selectors.page_list_anchor)?;
    validate_selector(job, "title", &selectors.title)?;
    validate_selector(job, "content-area", &selectors.content_area)?;
    validate_selector(job, "banner", &selectors.banner.region)?;
    if let Some(image_area) = &selectors.image_area {
        validate_selector(job, "image-area", image_area)?;
    }

    if selectors.banner.source_attribute.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(format!(
            "job '{}': banner source-attribute cannot be empty",
            job
        )));
    }

    Ok(())
}

/// Validates one selector pair
fn validate_selector(job: &str, field: &str, spec: &SelectorSpec) -> ConfigResult<()> {
    spec.validate()
        .map_err(|e| ConfigError::InvalidSelector(format!("job '{}': {}: {}", job, field, e)))
}
