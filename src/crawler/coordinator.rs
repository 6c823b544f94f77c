//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop, which:
//! - Seeds the frontier with author pages from the directory page
//! - Drains the frontier in batches of at most `concurrency` tasks
//! - Fetches each batch concurrently, then handles the responses in drain order
//! - Records authors and articles, and enqueues newly discovered listing pages
//! - Prunes pending listing pages of authors whose cap is reached
//!
//! Shared state (frontier, result store) is only touched between fetch phases,
//! by the loop itself, so no locking is involved.

use crate::config::CrawlSettings;
use crate::crawler::fetcher::{FetchResult, Fetcher, HttpFetcher};
use crate::crawler::frontier::{Frontier, Task, TaskKind};
use crate::crawler::policy::MalformedPagePolicy;
use crate::crawler::store::{AuthorId, ResultStore};
use crate::extract::{parse_article_date, HtmlExtractor, PageExtractor};
use crate::models::{ArticleRecord, AuthorRecord};
use crate::url::{numbered_page_url, resolve};
use crate::{ExtractError, HarvestError, Result};
use std::collections::HashSet;

/// Counters collected over one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Batches issued, not counting the directory fetch
    pub batches: usize,
    /// Pages fetched successfully
    pub pages_fetched: usize,
    /// Tasks dropped because their fetch failed
    pub fetch_failures: usize,
    /// Extra requests issued by the retry policy
    pub fetch_retries: usize,
    /// Listing pages removed from the frontier after a cap was reached
    pub tasks_pruned: usize,
    /// Articles left out by the date window
    pub records_filtered: usize,
    /// Pages dropped because of unexpected structure
    pub pages_skipped: usize,
}

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Author records in the order their pages were processed
    pub authors: Vec<AuthorRecord>,
    pub stats: CrawlStats,
}

/// Main crawler coordinator structure
pub struct Coordinator<F, E> {
    settings: CrawlSettings,
    fetcher: F,
    extractor: E,
    frontier: Frontier,
    store: ResultStore,
    /// Authors whose listing already announced its remaining pages
    paginated: HashSet<AuthorId>,
    stats: CrawlStats,
}

impl<F: Fetcher, E: PageExtractor> Coordinator<F, E> {
    /// Creates a coordinator with an empty frontier and result store
    ///
    /// # Arguments
    ///
    /// * `settings` - Validated crawl settings
    /// * `fetcher` - Fetches page bodies
    /// * `extractor` - Turns page bodies into typed data
    pub fn new(settings: CrawlSettings, fetcher: F, extractor: E) -> Self {
        Self {
            settings,
            fetcher,
            extractor,
            frontier: Frontier::new(),
            store: ResultStore::new(),
            paginated: HashSet::new(),
            stats: CrawlStats::default(),
        }
    }

    /// Appends a task to the frontier
    pub fn enqueue(&mut self, task: Task) {
        self.frontier.enqueue(task);
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Seeds the frontier from the directory page, then runs until it empties
    pub async fn crawl(mut self) -> Result<CrawlOutcome> {
        self.seed().await?;
        self.run().await
    }

    /// Fetches the directory page and enqueues one task per author link
    ///
    /// Featured authors come first, followed by the alphabetical listing.
    /// Failing to fetch the directory is fatal.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of author pages enqueued
    /// * `Err(HarvestError)` - The directory could not be fetched or read
    pub async fn seed(&mut self) -> Result<usize> {
        let directory_url = self.settings.directory_url()?;
        tracing::info!("Seeding frontier from {}", directory_url);

        let result = self
            .fetch_batch(std::slice::from_ref(&directory_url))
            .await
            .pop();

        let body = match result {
            Some(FetchResult::Success { body, .. }) => body,
            Some(failure) => {
                return Err(HarvestError::Seed {
                    url: directory_url,
                    reason: failure.failure_reason().unwrap_or_default(),
                })
            }
            None => {
                return Err(HarvestError::Seed {
                    url: directory_url,
                    reason: "no response".to_string(),
                })
            }
        };

        let links = self
            .extractor
            .extract_directory(&body)
            .map_err(|source| extract_error(&directory_url, source))?;

        for link in &links {
            let url = resolve(link, &directory_url)?;
            self.frontier.enqueue(Task::author_page(url));
        }

        tracing::info!("Enqueued {} author pages", links.len());
        Ok(links.len())
    }

    /// Runs the main crawl loop until the frontier is empty
    pub async fn run(mut self) -> Result<CrawlOutcome> {
        let start_time = std::time::Instant::now();

        while !self.frontier.is_empty() {
            self.run_batch().await?;

            if self.stats.batches % 10 == 0 {
                tracing::info!(
                    "Progress: {} batches, {} pages fetched, {} authors, {} in frontier",
                    self.stats.batches,
                    self.stats.pages_fetched,
                    self.store.len(),
                    self.frontier.len()
                );
            }
        }

        tracing::info!(
            "Crawl completed: {} authors from {} pages in {:?} ({} fetch failures, {} pruned)",
            self.store.len(),
            self.stats.pages_fetched,
            start_time.elapsed(),
            self.stats.fetch_failures,
            self.stats.tasks_pruned
        );

        Ok(CrawlOutcome {
            authors: self.store.into_records(),
            stats: self.stats,
        })
    }

    /// Drains, fetches and handles one batch
    ///
    /// Batch membership is fixed before any fetch starts; tasks discovered
    /// while handling the batch wait for the next one. Responses are handled
    /// in drain order, whatever order the fetches completed in.
    pub async fn run_batch(&mut self) -> Result<()> {
        let batch = self.frontier.dequeue_up_to(self.settings.concurrency);
        if batch.is_empty() {
            return Ok(());
        }

        self.stats.batches += 1;
        tracing::debug!(
            "Batch {}: {} tasks, {} left in frontier",
            self.stats.batches,
            batch.len(),
            self.frontier.len()
        );

        if let Some(delay) = self.settings.batch_delay() {
            tokio::time::sleep(delay).await;
        }

        let urls: Vec<String> = batch.iter().map(|task| task.url.clone()).collect();
        let results = self.fetch_batch(&urls).await;

        for (task, result) in batch.iter().zip(results) {
            match result {
                FetchResult::Success { body, .. } => {
                    self.stats.pages_fetched += 1;
                    self.process_page(task, &body)?;
                }
                failure => {
                    self.stats.fetch_failures += 1;
                    tracing::warn!(
                        "Dropping {}: {}",
                        task.url,
                        failure.failure_reason().unwrap_or_default()
                    );
                }
            }
        }

        Ok(())
    }

    /// Fetches `urls` concurrently, re-issuing failed requests per the retry policy
    async fn fetch_batch(&mut self, urls: &[String]) -> Vec<FetchResult> {
        let timeout = self.settings.fetch_timeout();
        let mut results = self.fetcher.fetch_all(urls, timeout).await;

        for attempt in 1..=self.settings.fetch_policy.retries() {
            let failed: Vec<usize> = results
                .iter()
                .enumerate()
                .filter(|(_, result)| !result.is_success())
                .map(|(idx, _)| idx)
                .collect();

            if failed.is_empty() {
                break;
            }

            let retry_urls: Vec<String> = failed.iter().map(|&idx| urls[idx].clone()).collect();
            tracing::debug!("Retry {}: re-fetching {} URLs", attempt, retry_urls.len());
            self.stats.fetch_retries += retry_urls.len();

            let retried = self.fetcher.fetch_all(&retry_urls, timeout).await;
            for (idx, result) in failed.into_iter().zip(retried) {
                results[idx] = result;
            }
        }

        results
    }

    /// Routes a fetched page to its handler and applies the malformed-page policy
    fn process_page(&mut self, task: &Task, body: &str) -> Result<()> {
        tracing::debug!("Processing {:?} {}", task.kind, task.url);

        let outcome = match task.kind {
            TaskKind::AuthorPage => self.handle_author_page(&task.url, body),
            TaskKind::ArticlesPage { author_id } => {
                self.handle_articles_page(&task.url, body, author_id)
            }
        };

        match outcome {
            Err(HarvestError::Extract { url, source })
                if self.settings.malformed_page_policy == MalformedPagePolicy::Skip =>
            {
                tracing::warn!("Skipping {}: unexpected page structure: {}", url, source);
                self.stats.pages_skipped += 1;
                Ok(())
            }
            other => other,
        }
    }

    /// Records an author and enqueues the first page of their articles listing
    fn handle_author_page(&mut self, url: &str, body: &str) -> Result<()> {
        let page = self
            .extractor
            .extract_author_page(body)
            .map_err(|source| extract_error(url, source))?;

        let articles_url = resolve(&page.articles_link, url)?;
        let author_id = self.store.push_author(AuthorRecord::new(
            page.name,
            page.bio,
            page.twitter_handle,
        ));

        tracing::debug!("Recorded author #{} from {}", author_id, url);

        if self.settings.cap.allows_articles() {
            self.frontier
                .enqueue(Task::articles_page(articles_url, author_id));
        }

        Ok(())
    }

    /// Collects articles from one listing page
    ///
    /// Entries outside the date window are skipped without ending the scan.
    /// When the cap fills, the author's pending listing pages are pruned and
    /// the rest of the page is ignored. Otherwise, a first page enqueues the
    /// remaining pages of the listing.
    fn handle_articles_page(&mut self, url: &str, body: &str, author_id: AuthorId) -> Result<()> {
        let cap = self.settings.cap;

        if cap.is_reached(self.store.article_count(author_id)?) {
            tracing::debug!("Author #{} is already full, ignoring {}", author_id, url);
            return Ok(());
        }

        let page = self
            .extractor
            .extract_articles_page(body)
            .map_err(|source| extract_error(url, source))?;

        for entry in page.entries {
            let date =
                parse_article_date(&entry.date_text).map_err(|source| extract_error(url, source))?;

            if !self.settings.date_window.contains(date) {
                tracing::trace!("Filtered '{}' dated {}", entry.title, date);
                self.stats.records_filtered += 1;
                continue;
            }

            let article = ArticleRecord {
                title: entry.title,
                url: resolve(&entry.link, url)?,
                date,
            };
            let count = self.store.push_article(author_id, article)?;

            if cap.is_reached(count) {
                let pruned = self
                    .frontier
                    .remove_where(|task| task.is_articles_page_of(author_id));
                self.stats.tasks_pruned += pruned;
                tracing::debug!(
                    "Author #{} reached {} articles, pruned {} pending pages",
                    author_id,
                    count,
                    pruned
                );
                return Ok(());
            }
        }

        if let Some(pagination) = page.pagination {
            if pagination.is_first_page() && self.paginated.insert(author_id) {
                for page_number in 2..=pagination.last_page {
                    let page_url = numbered_page_url(url, page_number)?;
                    self.frontier
                        .enqueue(Task::articles_page(page_url, author_id));
                }
                tracing::debug!(
                    "Author #{} listing has {} pages",
                    author_id,
                    pagination.last_page
                );
            }
        }

        Ok(())
    }
}

fn extract_error(url: &str, source: ExtractError) -> HarvestError {
    HarvestError::Extract {
        url: url.to_string(),
        source,
    }
}

/// Runs a complete crawl over HTTP
///
/// This function:
/// 1. Builds the HTTP client
/// 2. Fetches the directory page and seeds the frontier
/// 3. Runs batches until the frontier is empty
/// 4. Returns the collected author records
///
/// # Example
///
/// ```no_run
/// use byline_harvest::config::{validate, Config};
/// use byline_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = validate(&Config::default())?;
/// let outcome = run_crawl(settings).await?;
/// println!("{} authors", outcome.authors.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(settings: CrawlSettings) -> Result<CrawlOutcome> {
    let fetcher = HttpFetcher::new(&settings.user_agent)?;
    Coordinator::new(settings, fetcher, HtmlExtractor::new())
        .crawl()
        .await
}
