//! Configuration module for Byline-Harvest
//!
//! Options come from an optional TOML file overlaid with command-line flags.
//! The merged [`Config`] is then validated into an immutable [`CrawlSettings`]
//! value that the crawl loop receives at start.
//!
//! # Example
//!
//! ```no_run
//! use byline_harvest::config::{load_config, validate};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! let settings = validate(&config).unwrap();
//! println!("Batch width: {}", settings.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_user_agent, Config, CrawlSettings, CrawlerConfig, SiteConfig, DEFAULT_BASE_URL,
    DEFAULT_CONCURRENCY, DEFAULT_DIRECTORY_PAGE,
};

// Re-export parser and validation functions
pub use parser::{load_config, load_settings};
pub use validation::validate;
