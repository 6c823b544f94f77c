use crate::config::types::{
    default_user_agent, Config, CrawlSettings, CrawlerConfig, SiteConfig, DEFAULT_BASE_URL,
    DEFAULT_CONCURRENCY, DEFAULT_DIRECTORY_PAGE,
};
use crate::crawler::{DateWindow, FetchFailurePolicy, MalformedPagePolicy, ResultCap};
use crate::ConfigError;
use chrono::NaiveDate;
use url::Url;

/// Format accepted for start and end dates
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validates the entire configuration and produces crawl settings
///
/// Every option is checked; all problems are reported together, one message
/// per offending option.
pub fn validate(config: &Config) -> Result<CrawlSettings, ConfigError> {
    let mut problems = Vec::new();

    let site = validate_site_config(&config.site, &mut problems);
    let crawler = validate_crawler_config(&config.crawler, &mut problems);

    match (site, crawler) {
        (Some((base_url, directory_page, user_agent)), Some(settings)) if problems.is_empty() => {
            Ok(CrawlSettings {
                base_url,
                directory_page,
                user_agent,
                ..settings
            })
        }
        _ => Err(ConfigError::Invalid(problems)),
    }
}

/// Validates site configuration
fn validate_site_config(
    config: &SiteConfig,
    problems: &mut Vec<String>,
) -> Option<(String, String, String)> {
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let base_ok = match Url::parse(&base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => true,
        Ok(url) => {
            problems.push(format!(
                "base-url must use http or https, got '{}'",
                url.scheme()
            ));
            false
        }
        Err(e) => {
            problems.push(format!("base-url is not a valid URL ('{}'): {}", base_url, e));
            false
        }
    };

    let directory_page = config
        .directory_page
        .clone()
        .unwrap_or_else(|| DEFAULT_DIRECTORY_PAGE.to_string());

    let user_agent = config.user_agent.clone().unwrap_or_else(default_user_agent);
    let agent_ok = !user_agent.trim().is_empty();
    if !agent_ok {
        problems.push("user-agent cannot be empty".to_string());
    }

    (base_ok && agent_ok).then_some((base_url, directory_page, user_agent))
}

/// Validates crawler configuration
fn validate_crawler_config(
    config: &CrawlerConfig,
    problems: &mut Vec<String>,
) -> Option<CrawlSettings> {
    let before = problems.len();

    let concurrency = match config.concurrency {
        None => DEFAULT_CONCURRENCY,
        Some(value) if value >= 1 => value as usize,
        Some(value) => {
            problems.push(format!(
                "concurrency should be an integer >= 1, got {}",
                value
            ));
            DEFAULT_CONCURRENCY
        }
    };

    let cap = match config.max_results_per_author {
        None => ResultCap::Unlimited,
        Some(value) if value >= 0 => ResultCap::AtMost(value as usize),
        Some(value) => {
            problems.push(format!(
                "max-results-per-author should be an integer >= 0, got {}",
                value
            ));
            ResultCap::Unlimited
        }
    };

    let start = parse_date_option("start-date", config.start_date.as_deref(), problems);
    let end = parse_date_option("end-date", config.end_date.as_deref(), problems);

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            problems.push(format!(
                "start-date ({}) must not be after end-date ({})",
                start, end
            ));
        }
    }

    let wait = non_negative("wait", config.wait, problems);
    let retries = non_negative("fetch-retries", config.fetch_retries, problems);

    let fetch_policy = match retries {
        0 => FetchFailurePolicy::Drop,
        attempts => FetchFailurePolicy::Retry {
            attempts: u32::try_from(attempts).unwrap_or(u32::MAX),
        },
    };

    let malformed_page_policy = match config.on_malformed_page.as_deref() {
        None => MalformedPagePolicy::default(),
        Some(value) => value.parse().unwrap_or_else(|e: String| {
            problems.push(format!("on-malformed-page {}", e));
            MalformedPagePolicy::default()
        }),
    };

    (problems.len() == before).then(|| CrawlSettings {
        concurrency,
        cap,
        date_window: DateWindow { start, end },
        wait,
        fetch_policy,
        malformed_page_policy,
        ..CrawlSettings::default()
    })
}

/// Parses an optional YYYY-MM-DD option
fn parse_date_option(
    name: &str,
    value: Option<&str>,
    problems: &mut Vec<String>,
) -> Option<NaiveDate> {
    let value = value?;
    match NaiveDate::parse_from_str(value.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            problems.push(format!(
                "{} format should be YYYY-MM-DD, got '{}'",
                name, value
            ));
            None
        }
    }
}

/// Checks an optional integer option that must not be negative
fn non_negative(name: &str, value: Option<i64>, problems: &mut Vec<String>) -> u64 {
    match value {
        None => 0,
        Some(value) if value >= 0 => value as u64,
        Some(value) => {
            problems.push(format!("{} should be an integer >= 0, got {}", name, value));
            0
        }
    }
}
