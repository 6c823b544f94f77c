//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small author directory and run
//! the full crawl cycle end-to-end over HTTP.

use byline_harvest::config::{load_settings, CrawlSettings};
use byline_harvest::crawler::{DateWindow, ResultCap};
use byline_harvest::{run_crawl, HarvestError};
use chrono::NaiveDate;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates test settings pointing at the mock server
fn create_test_settings(server: &MockServer, concurrency: usize, cap: ResultCap) -> CrawlSettings {
    CrawlSettings {
        base_url: format!("{}/", server.uri()),
        concurrency,
        cap,
        ..CrawlSettings::default()
    }
}

/// Mounts an HTML page at `page_path`, optionally asserting how often it is fetched
async fn mount_page(server: &MockServer, page_path: &str, body: String, expected: Option<u64>) {
    let mock = Mock::given(method("GET")).and(path(page_path)).respond_with(
        ResponseTemplate::new(200)
            .set_body_string(body)
            .insert_header("content-type", "text/html"),
    );

    match expected {
        Some(times) => mock.expect(times).mount(server).await,
        None => mock.mount(server).await,
    }
}

fn directory_html(featured: &[&str], listed: &[&str]) -> String {
    let featured: String = featured
        .iter()
        .map(|href| {
            format!(
                r#"<div class="record"><div class="author-info">
                    <h1 class="headline"><a href="{}">Featured</a></h1>
                </div></div>"#,
                href
            )
        })
        .collect();
    let listed: String = listed
        .iter()
        .map(|href| format!(r#"<a href="{}">Author</a>"#, href))
        .collect();

    format!(
        r#"<html><body>
        <div class="featured"><div class="records">{}</div></div>
        <div class="authors"><div class="records author-letter">{}</div></div>
        </body></html>"#,
        featured, listed
    )
}

fn author_html(name: &str, twitter: Option<&str>) -> String {
    let twitter = twitter
        .map(|handle| format!(r#"<a href="https://twitter.com/{}">@{}</a>"#, handle, handle))
        .unwrap_or_default();

    format!(
        r#"<html><body>
        <div class="author-info">
            <h1 class="headline"><a href="index.html">{}</a></h1>
            <div class="abstract">Writes about {}. {}</div>
            <div class="link articles"><a href="articles.html">All articles</a></div>
        </div>
        </body></html>"#,
        name, name, twitter
    )
}

/// Listing page with `(title, href, date)` records and an optional pagination block
fn articles_html(records: &[(&str, &str, &str)], current: u32, last: u32) -> String {
    let records: String = records
        .iter()
        .map(|(title, href, date)| {
            format!(
                r#"<div class="record clearfix">
                    <h2 class="headline"><a href="{}">{}</a></h2>
                    <div class="date">{}</div>
                </div>"#,
                href, title, date
            )
        })
        .collect();

    let pagination = if last > 1 {
        let links: String = (1..=last)
            .filter(|page| *page != current)
            .map(|page| format!(r#"<a href="articles-page={}.html">{}</a>"#, page, page))
            .collect();
        format!(
            r##"<div class="pagination"><em>{}</em>{}<a href="#">Next</a></div>"##,
            current, links
        )
    } else {
        String::new()
    };

    format!(
        r#"<html><body><div class="records">{}</div>{}</body></html>"#,
        records, pagination
    )
}

#[tokio::test]
async fn test_full_crawl_collects_authors_and_paginated_articles() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/authors.html",
        directory_html(&["author/ann/index.html"], &["author/bob/index.html", "author/cat/index.html"]),
        Some(1),
    )
    .await;

    mount_page(&server, "/author/ann/index.html", author_html("Ann", Some("ann")), None).await;
    mount_page(&server, "/author/bob/index.html", author_html("Bob", None), None).await;

    // Cat's page is down; the author is dropped without failing the crawl
    Mock::given(method("GET"))
        .and(path("/author/cat/index.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    mount_page(
        &server,
        "/author/ann/articles.html",
        articles_html(
            &[
                ("Plant opens", "/news/plant.html", "March 9, 2017"),
                ("Port expands", "../../news/port.html", "2017-02-01"),
            ],
            1,
            2,
        ),
        Some(1),
    )
    .await;

    mount_page(
        &server,
        "/author/ann/articles-page=2.html",
        articles_html(&[("Mill closes", "/news/mill.html", "Jan 5, 2016")], 2, 2),
        Some(1),
    )
    .await;

    mount_page(
        &server,
        "/author/bob/articles.html",
        articles_html(&[("Budget passes", "/news/budget.html", "06/30/2015")], 1, 1),
        Some(1),
    )
    .await;

    let settings = create_test_settings(&server, 2, ResultCap::Unlimited);
    let outcome = run_crawl(settings).await.expect("Crawl failed");

    assert_eq!(outcome.authors.len(), 2, "Cat should have been dropped");

    let ann = &outcome.authors[0];
    assert_eq!(ann.name, "Ann");
    assert_eq!(
        ann.twitter_handle.as_deref(),
        Some("https://twitter.com/ann")
    );
    let titles: Vec<&str> = ann.articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Plant opens", "Port expands", "Mill closes"]);
    assert_eq!(ann.articles[0].url, format!("{}/news/plant.html", base_url));
    assert_eq!(ann.articles[1].url, format!("{}/news/port.html", base_url));
    assert_eq!(
        ann.articles[2].date,
        NaiveDate::from_ymd_opt(2016, 1, 5).unwrap()
    );

    let bob = &outcome.authors[1];
    assert_eq!(bob.name, "Bob");
    assert_eq!(bob.twitter_handle, None);
    assert_eq!(bob.articles.len(), 1);

    assert_eq!(outcome.stats.fetch_failures, 1);
}

#[tokio::test]
async fn test_cap_reached_on_first_page_skips_pagination() {
    let server = MockServer::start().await;

    mount_page(&server, "/authors.html", directory_html(&[], &["author/ann/index.html"]), None).await;
    mount_page(&server, "/author/ann/index.html", author_html("Ann", None), None).await;
    mount_page(
        &server,
        "/author/ann/articles.html",
        articles_html(
            &[
                ("First", "/news/1.html", "2017-03-03"),
                ("Second", "/news/2.html", "2017-03-02"),
                ("Third", "/news/3.html", "2017-03-01"),
            ],
            1,
            3,
        ),
        Some(1),
    )
    .await;

    // The cap fills before pagination is read, so later pages are never requested
    mount_page(
        &server,
        "/author/ann/articles-page=2.html",
        articles_html(&[], 2, 3),
        Some(0),
    )
    .await;
    mount_page(
        &server,
        "/author/ann/articles-page=3.html",
        articles_html(&[], 3, 3),
        Some(0),
    )
    .await;

    let settings = create_test_settings(&server, 2, ResultCap::AtMost(2));
    let outcome = run_crawl(settings).await.expect("Crawl failed");

    let titles: Vec<&str> = outcome.authors[0]
        .articles
        .iter()
        .map(|a| a.title.as_str())
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[tokio::test]
async fn test_cap_prunes_pending_listing_pages() {
    let server = MockServer::start().await;

    mount_page(&server, "/authors.html", directory_html(&[], &["author/ann/index.html"]), None).await;
    mount_page(&server, "/author/ann/index.html", author_html("Ann", None), None).await;
    mount_page(
        &server,
        "/author/ann/articles.html",
        articles_html(
            &[
                ("One", "/news/1.html", "2017-03-05"),
                ("Two", "/news/2.html", "2017-03-04"),
            ],
            1,
            3,
        ),
        Some(1),
    )
    .await;
    mount_page(
        &server,
        "/author/ann/articles-page=2.html",
        articles_html(
            &[
                ("Three", "/news/3.html", "2017-03-03"),
                ("Four", "/news/4.html", "2017-03-02"),
            ],
            2,
            3,
        ),
        Some(1),
    )
    .await;

    // Page 3 is queued behind page 2 and removed once the cap fills
    mount_page(
        &server,
        "/author/ann/articles-page=3.html",
        articles_html(&[("Five", "/news/5.html", "2017-03-01")], 3, 3),
        Some(0),
    )
    .await;

    let settings = create_test_settings(&server, 1, ResultCap::AtMost(3));
    let outcome = run_crawl(settings).await.expect("Crawl failed");

    let titles: Vec<&str> = outcome.authors[0]
        .articles
        .iter()
        .map(|a| a.title.as_str())
        .collect();
    assert_eq!(titles, vec!["One", "Two", "Three"]);
    assert_eq!(outcome.stats.tasks_pruned, 1);
}

#[tokio::test]
async fn test_date_window_filters_articles() {
    let server = MockServer::start().await;

    mount_page(&server, "/authors.html", directory_html(&[], &["author/ann/index.html"]), None).await;
    mount_page(&server, "/author/ann/index.html", author_html("Ann", None), None).await;
    mount_page(
        &server,
        "/author/ann/articles.html",
        articles_html(
            &[
                ("Too new", "/news/1.html", "2019-01-01"),
                ("Kept", "/news/2.html", "2017-06-15"),
                ("Edge", "/news/3.html", "2017-01-01"),
                ("Too old", "/news/4.html", "2012-12-31"),
            ],
            1,
            1,
        ),
        Some(1),
    )
    .await;

    let mut settings = create_test_settings(&server, 2, ResultCap::Unlimited);
    settings.date_window = DateWindow {
        start: NaiveDate::from_ymd_opt(2017, 1, 1),
        end: NaiveDate::from_ymd_opt(2018, 1, 1),
    };

    let outcome = run_crawl(settings).await.expect("Crawl failed");

    let titles: Vec<&str> = outcome.authors[0]
        .articles
        .iter()
        .map(|a| a.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Kept", "Edge"]);
    assert_eq!(outcome.stats.records_filtered, 2);
}

#[tokio::test]
async fn test_zero_cap_records_authors_without_listings() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/authors.html",
        directory_html(&[], &["author/ann/index.html", "author/bob/index.html"]),
        None,
    )
    .await;
    mount_page(&server, "/author/ann/index.html", author_html("Ann", None), Some(1)).await;
    mount_page(&server, "/author/bob/index.html", author_html("Bob", None), Some(1)).await;
    mount_page(
        &server,
        "/author/ann/articles.html",
        articles_html(&[], 1, 1),
        Some(0),
    )
    .await;
    mount_page(
        &server,
        "/author/bob/articles.html",
        articles_html(&[], 1, 1),
        Some(0),
    )
    .await;

    let settings = create_test_settings(&server, 5, ResultCap::AtMost(0));
    let outcome = run_crawl(settings).await.expect("Crawl failed");

    assert_eq!(outcome.authors.len(), 2);
    assert!(outcome.authors.iter().all(|a| a.articles.is_empty()));
    assert_eq!(outcome.stats.batches, 1);
}

#[tokio::test]
async fn test_unreachable_directory_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/authors.html"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let settings = create_test_settings(&server, 2, ResultCap::Unlimited);
    let result = run_crawl(settings).await;

    assert!(matches!(result, Err(HarvestError::Seed { .. })));
}

#[tokio::test]
async fn test_crawl_with_settings_from_config_file() {
    let server = MockServer::start().await;

    mount_page(&server, "/people.html", directory_html(&["a/index.html"], &[]), Some(1)).await;
    mount_page(&server, "/a/index.html", author_html("Ann", None), Some(1)).await;
    mount_page(
        &server,
        "/a/articles.html",
        articles_html(
            &[
                ("Kept", "/news/1.html", "2017-06-15"),
                ("Over cap", "/news/2.html", "2017-06-14"),
            ],
            1,
            1,
        ),
        Some(1),
    )
    .await;

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[site]
base-url = "{}/"
directory-page = "people.html"
user-agent = "HarvestTest/1.0"

[crawler]
concurrency = 3
max-results-per-author = 1
"#,
        server.uri()
    )
    .unwrap();

    let settings = load_settings(file.path()).expect("Failed to load settings");
    assert_eq!(settings.concurrency, 3);
    assert_eq!(settings.user_agent, "HarvestTest/1.0");

    let outcome = run_crawl(settings).await.expect("Crawl failed");

    assert_eq!(outcome.authors.len(), 1);
    assert_eq!(outcome.authors[0].articles.len(), 1);
    assert_eq!(outcome.authors[0].articles[0].title, "Kept");
}
