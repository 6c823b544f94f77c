//! Byline-Harvest main entry point
//!
//! This is the command-line interface for the author directory crawler.

use anyhow::Context;
use byline_harvest::config::{load_config, validate, Config, CrawlSettings};
use byline_harvest::crawler::{DateWindow, FetchFailurePolicy, ResultCap};
use byline_harvest::output::{render, write_output, OutputFormat};
use byline_harvest::run_crawl;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Concurrency used by the command line when nothing else sets it
const CLI_DEFAULT_CONCURRENCY: i64 = 5;

/// Per-author article cap used by the command line unless `--unlimited` is given
const CLI_DEFAULT_MAX_RESULTS: i64 = 5;

/// Byline-Harvest: an author directory crawler
///
/// Byline-Harvest walks the author directory of a news archive, visits every
/// author page and collects each author's articles from their paginated
/// listing, honoring a per-author cap and an optional date window.
#[derive(Parser, Debug)]
#[command(name = "byline-harvest")]
#[command(version)]
#[command(about = "An author directory crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Root URL of the archive
    #[arg(long)]
    base_url: Option<String>,

    /// Number of pages fetched concurrently per batch [default: 5]
    #[arg(short = 'c', long, allow_negative_numbers = true)]
    concurrency: Option<i64>,

    /// Maximum articles collected per author [default: 5]
    #[arg(short = 'n', long, allow_negative_numbers = true, conflicts_with = "unlimited")]
    max_results_per_author: Option<i64>,

    /// Collect every article of every author
    #[arg(long)]
    unlimited: bool,

    /// Earliest article date to keep (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<String>,

    /// Latest article date to keep (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,

    /// Seconds to wait before each batch; also the per-request timeout
    #[arg(long, allow_negative_numbers = true)]
    wait: Option<i64>,

    /// Immediate retries for a failed fetch before the page is dropped
    #[arg(long, allow_negative_numbers = true)]
    fetch_retries: Option<i64>,

    /// What to do with a page of unexpected structure (abort or skip)
    #[arg(long, value_name = "POLICY")]
    on_malformed_page: Option<String>,

    /// Output format (json or markdown)
    #[arg(short, long, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show the effective settings without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Options given on the command line, as a configuration overlay
    fn overrides(&self) -> Config {
        let mut config = Config::default();
        config.site.base_url = self.base_url.clone();
        config.crawler.concurrency = self.concurrency;
        config.crawler.max_results_per_author = self.max_results_per_author;
        config.crawler.start_date = self.start_date.clone();
        config.crawler.end_date = self.end_date.clone();
        config.crawler.wait = self.wait;
        config.crawler.fetch_retries = self.fetch_retries;
        config.crawler.on_malformed_page = self.on_malformed_page.clone();
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let settings = resolve_settings(&cli)?;

    if cli.dry_run {
        handle_dry_run(&settings);
        return Ok(());
    }

    handle_crawl(settings, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("byline_harvest=info,warn"),
            1 => EnvFilter::new("byline_harvest=debug,info"),
            2 => EnvFilter::new("byline_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only the rendered result
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers the config file, the command line and the CLI defaults, then validates
fn resolve_settings(cli: &Cli) -> anyhow::Result<CrawlSettings> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    config.apply_overrides(cli.overrides());

    if config.crawler.concurrency.is_none() {
        config.crawler.concurrency = Some(CLI_DEFAULT_CONCURRENCY);
    }
    if cli.unlimited {
        config.crawler.max_results_per_author = None;
    } else if config.crawler.max_results_per_author.is_none() {
        config.crawler.max_results_per_author = Some(CLI_DEFAULT_MAX_RESULTS);
    }

    let settings = validate(&config)?;
    tracing::debug!("Effective settings: {:?}", settings);
    Ok(settings)
}

/// Handles the --dry-run mode: shows the settings a crawl would use
fn handle_dry_run(settings: &CrawlSettings) {
    println!("=== Byline-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", settings.base_url);
    match settings.directory_url() {
        Ok(url) => println!("  Directory: {}", url),
        Err(e) => println!("  Directory: <unresolvable: {}>", e),
    }
    println!("  User agent: {}", settings.user_agent);

    println!("\nCrawler:");
    println!("  Concurrency: {}", settings.concurrency);
    match settings.cap {
        ResultCap::Unlimited => println!("  Max results per author: unlimited"),
        ResultCap::AtMost(limit) => println!("  Max results per author: {}", limit),
    }
    println!("  Date window: {}", describe_window(&settings.date_window));
    println!("  Wait: {}s", settings.wait);
    match settings.fetch_policy {
        FetchFailurePolicy::Drop => println!("  Failed fetches: dropped"),
        FetchFailurePolicy::Retry { attempts } => {
            println!("  Failed fetches: retried {} time(s), then dropped", attempts)
        }
    }
    println!("  Malformed pages: {:?}", settings.malformed_page_policy);

    println!("\n✓ Configuration is valid");
}

fn describe_window(window: &DateWindow) -> String {
    match (window.start, window.end) {
        (None, None) => "any date".to_string(),
        (Some(start), None) => format!("from {}", start),
        (None, Some(end)) => format!("until {}", end),
        (Some(start), Some(end)) => format!("{} to {}", start, end),
    }
}

/// Handles the main crawl operation
async fn handle_crawl(settings: CrawlSettings, cli: &Cli) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl of {} (concurrency {})",
        settings.base_url,
        settings.concurrency
    );

    let outcome = match run_crawl(settings).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let stats = &outcome.stats;
    tracing::info!(
        "Crawl completed: {} authors, {} pages fetched in {} batches, {} failed fetches",
        outcome.authors.len(),
        stats.pages_fetched,
        stats.batches,
        stats.fetch_failures
    );

    let rendered = render(&outcome.authors, cli.format).context("Failed to render results")?;
    write_output(&rendered, cli.output.as_deref()).context("Failed to write results")?;

    if let Some(path) = &cli.output {
        tracing::info!("Results written to: {}", path.display());
    }

    Ok(())
}
