//! Link-Harvest: a two-pass link harvester
//!
//! This crate fetches a list of seed pages concurrently, extracts one kind of
//! link from each, deduplicates the results and then re-fetches every unique
//! link at a polite, rate-limited pace to extract a second set of links.

pub mod config;
pub mod crawler;
pub mod output;
pub mod tabular;

use thiserror::Error;

/// Main error type for Link-Harvest operations
///
/// Only structural failures end up here. Per-page fetch and extraction
/// failures are logged and counted inside the pipeline instead.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tabular data error: {0}")]
    Tabular(#[from] tabular::TabularError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Harvest supervisor failed: {0}")]
    Supervisor(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Link extraction errors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Document is not valid {charset} markup")]
    Encoding { charset: String },
}

/// Result type alias for Link-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{AccumulationMode, HarvestReport, PipelineOutcome, SecondPassReport};
