//! Configuration module for Article Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every selector a job uses is a named field, so a missing region is reported
//! when the file is loaded rather than halfway through a batch.
//!
//! # Example
//!
//! ```no_run
//! use article_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("{} job(s) configured", config.jobs.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BannerSpec, BrowserConfig, Config, FetchModeConfig, HttpConfig, JobConfig, OutputConfig,
    SelectorsConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate_job;
