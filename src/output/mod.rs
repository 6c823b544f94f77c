//! Output rendering for crawl results
//!
//! Results can be rendered as pretty-printed JSON or as a human-readable
//! markdown listing, and written to a file or to stdout.

mod json;
mod markdown;

pub use json::to_json;
pub use markdown::format_markdown;

use crate::models::AuthorRecord;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Supported renderings of the crawl result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

/// Renders author records in the requested format
pub fn render(authors: &[AuthorRecord], format: OutputFormat) -> OutputResult<String> {
    match format {
        OutputFormat::Json => Ok(to_json(authors)?),
        OutputFormat::Markdown => Ok(format_markdown(authors)),
    }
}

/// Writes rendered output to `path`, or to stdout when no path is given
pub fn write_output(content: &str, path: Option<&Path>) -> OutputResult<()> {
    match path {
        Some(path) => std::fs::write(path, content)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
