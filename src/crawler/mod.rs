//! Crawler module for the batch fetch-and-dispatch engine
//!
//! This module contains the core crawling logic, including:
//! - The frontier of pending fetch tasks
//! - The in-memory result store
//! - Date filtering, per-author caps and failure policies
//! - HTTP fetching
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod policy;
mod store;

pub use coordinator::{run_crawl, Coordinator, CrawlOutcome, CrawlStats};
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher, HttpFetcher};
pub use frontier::{Frontier, Task, TaskKind};
pub use policy::{DateWindow, FetchFailurePolicy, MalformedPagePolicy, ResultCap};
pub use store::{AuthorId, ResultStore};
