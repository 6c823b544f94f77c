//! Filtering, termination and failure policies applied by the crawl loop

use chrono::NaiveDate;
use std::str::FromStr;

/// Per-author limit on collected articles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultCap {
    /// Collect every article that passes the date filter
    #[default]
    Unlimited,
    /// Stop collecting, and prune pending listing pages, once this many are kept
    AtMost(usize),
}

impl ResultCap {
    /// Returns true if an author's articles should be fetched at all
    ///
    /// A cap of zero keeps the author record but never fetches its listing.
    pub fn allows_articles(&self) -> bool {
        !matches!(self, Self::AtMost(0))
    }

    /// Returns true once `count` articles fill the cap
    pub fn is_reached(&self, count: usize) -> bool {
        match self {
            Self::Unlimited => false,
            Self::AtMost(limit) => count >= *limit,
        }
    }
}

/// Inclusive date range an article must fall within to be kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    /// Returns true if `date` is on or after `start` and on or before `end`
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// What happens to a task whose fetch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    /// Drop the task silently
    #[default]
    Drop,
    /// Re-issue the request immediately up to `attempts` more times, then drop it
    Retry { attempts: u32 },
}

impl FetchFailurePolicy {
    /// Number of extra attempts made after a failed fetch
    pub fn retries(&self) -> u32 {
        match self {
            Self::Drop => 0,
            Self::Retry { attempts } => *attempts,
        }
    }
}

/// What happens when a fetched page does not match the expected layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPagePolicy {
    /// Stop the crawl with an error
    #[default]
    Abort,
    /// Log the page and drop the task
    Skip,
}

impl FromStr for MalformedPagePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!("must be 'abort' or 'skip', got '{}'", other)),
        }
    }
}
