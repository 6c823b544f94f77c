use crate::crawler::{DateWindow, FetchFailurePolicy, MalformedPagePolicy, ResultCap};
use crate::url::resolve;
use crate::UrlResult;
use serde::Deserialize;
use std::time::Duration;

/// Archive crawled when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "http://archive-grbj-2.s3-website-us-west-1.amazonaws.com/";

/// Directory page, relative to the base URL
pub const DEFAULT_DIRECTORY_PAGE: &str = "authors.html";

/// Batch width used when none is configured
pub const DEFAULT_CONCURRENCY: usize = 2;

/// Raw configuration as read from a TOML file and command-line flags
///
/// Every field is optional and unchecked; [`validate`](super::validate) turns
/// a `Config` into [`CrawlSettings`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

/// Where the directory lives and how to identify ourselves
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the archive
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Directory page listing all authors, relative to the base URL
    #[serde(rename = "directory-page")]
    pub directory_page: Option<String>,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

/// Crawl behavior options
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlerConfig {
    /// Number of pages fetched concurrently per batch
    pub concurrency: Option<i64>,

    /// Maximum number of articles collected per author
    #[serde(rename = "max-results-per-author")]
    pub max_results_per_author: Option<i64>,

    /// Earliest article date to keep (YYYY-MM-DD, inclusive)
    #[serde(rename = "start-date")]
    pub start_date: Option<String>,

    /// Latest article date to keep (YYYY-MM-DD, inclusive)
    #[serde(rename = "end-date")]
    pub end_date: Option<String>,

    /// Delay before each batch and per-request timeout (seconds)
    pub wait: Option<i64>,

    /// Immediate retries for a failed fetch before it is dropped
    #[serde(rename = "fetch-retries")]
    pub fetch_retries: Option<i64>,

    /// What to do with a page that does not match the expected layout
    #[serde(rename = "on-malformed-page")]
    pub on_malformed_page: Option<String>,
}

impl Config {
    /// Overlays every option set in `overrides` on top of this configuration
    pub fn apply_overrides(&mut self, overrides: Config) {
        let Config { site, crawler } = overrides;

        overlay(&mut self.site.base_url, site.base_url);
        overlay(&mut self.site.directory_page, site.directory_page);
        overlay(&mut self.site.user_agent, site.user_agent);

        overlay(&mut self.crawler.concurrency, crawler.concurrency);
        overlay(
            &mut self.crawler.max_results_per_author,
            crawler.max_results_per_author,
        );
        overlay(&mut self.crawler.start_date, crawler.start_date);
        overlay(&mut self.crawler.end_date, crawler.end_date);
        overlay(&mut self.crawler.wait, crawler.wait);
        overlay(&mut self.crawler.fetch_retries, crawler.fetch_retries);
        overlay(&mut self.crawler.on_malformed_page, crawler.on_malformed_page);
    }
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Validated, immutable settings for one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    pub base_url: String,
    pub directory_page: String,
    pub user_agent: String,
    /// Batch width, at least 1
    pub concurrency: usize,
    pub cap: ResultCap,
    pub date_window: DateWindow,
    /// Seconds to wait before each batch; also the per-request timeout when non-zero
    pub wait: u64,
    pub fetch_policy: FetchFailurePolicy,
    pub malformed_page_policy: MalformedPagePolicy,
}

impl CrawlSettings {
    /// Absolute URL of the directory page that seeds the crawl
    pub fn directory_url(&self) -> UrlResult<String> {
        resolve(&self.directory_page, &self.base_url)
    }

    /// Pause taken before each batch is issued
    pub fn batch_delay(&self) -> Option<Duration> {
        (self.wait > 0).then(|| Duration::from_secs(self.wait))
    }

    /// Timeout applied to each fetch; `None` keeps the client default
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.batch_delay()
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            directory_page: DEFAULT_DIRECTORY_PAGE.to_string(),
            user_agent: default_user_agent(),
            concurrency: DEFAULT_CONCURRENCY,
            cap: ResultCap::Unlimited,
            date_window: DateWindow::default(),
            wait: 0,
            fetch_policy: FetchFailurePolicy::default(),
            malformed_page_policy: MalformedPagePolicy::default(),
        }
    }
}

/// User agent used when none is configured
pub fn default_user_agent() -> String {
    format!("byline-harvest/{}", env!("CARGO_PKG_VERSION"))
}
