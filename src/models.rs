//! Records collected by a crawl.

use chrono::NaiveDate;
use serde::Serialize;

/// One author profile together with the articles collected for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRecord {
    pub name: String,
    pub bio: String,
    /// Link to the author's Twitter profile, when the bio carries one
    pub twitter_handle: Option<String>,
    /// Articles in the order they were encountered across listing pages
    pub articles: Vec<ArticleRecord>,
}

impl AuthorRecord {
    /// Creates an author record with no articles yet
    pub fn new(name: String, bio: String, twitter_handle: Option<String>) -> Self {
        Self {
            name,
            bio,
            twitter_handle,
            articles: Vec::new(),
        }
    }
}

/// A single article listed on an author's articles page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    pub title: String,
    /// Absolute URL of the article
    pub url: String,
    pub date: NaiveDate,
}
