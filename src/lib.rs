//! Byline-Harvest: an author/article directory crawler
//!
//! This crate crawls a paginated author directory served over HTTP and collects,
//! for every author, a profile plus a bounded, date-filtered list of articles.
//! The crawl runs in sequential batches of concurrent fetches and keeps all of
//! its state in memory until the work queue drains.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod models;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Byline-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Failed to seed the crawl from {url}: {reason}")]
    Seed { url: String, reason: String },

    #[error("Unexpected page structure at {url}: {source}")]
    Extract {
        url: String,
        #[source]
        source: ExtractError,
    },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Unknown author slot {0}")]
    UnknownAuthor(usize),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration:\n  {}", .0.join("\n  "))]
    Invalid(Vec<String>),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse base URL: {0}")]
    Parse(String),

    #[error("Missing host in base URL: {0}")]
    MissingHost(String),
}

/// Page structure errors raised while extracting fields from a fetched page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("missing element '{0}'")]
    MissingElement(&'static str),

    #[error("element '{element}' has no '{attribute}' attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("unrecognized date '{0}'")]
    InvalidDate(String),
}

/// Result type alias for Byline-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlSettings};
pub use crawler::{run_crawl, Coordinator, CrawlOutcome};
pub use models::{ArticleRecord, AuthorRecord};
pub use url::resolve;
