//! Page extraction for directory, author and articles pages
//!
//! The crawl loop never looks at HTML directly. It hands a fetched body to a
//! [`PageExtractor`] together with the kind of page it expects, and gets typed
//! data back:
//! - the directory page yields author page links
//! - an author page yields the profile and the link to the articles listing
//! - an articles page yields article entries and, optionally, pagination info
//!
//! A page that lacks a required element produces an [`ExtractError`].

mod date;
mod html;

pub use date::parse_article_date;
pub use html::HtmlExtractor;

use crate::ExtractError;

/// Fields extracted from an author page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorPage {
    pub name: String,
    pub bio: String,
    pub twitter_handle: Option<String>,
    /// Link to the first page of the author's articles, as written in the page
    pub articles_link: String,
}

/// One article entry as listed on an articles page, before any filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleEntry {
    pub title: String,
    /// Link to the article, as written in the page
    pub link: String,
    pub date_text: String,
}

/// Pagination control of an articles listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number the listing reports for itself
    pub current_page: u32,
    /// Highest page number linked from the control
    pub last_page: u32,
}

impl Pagination {
    /// Returns true if this is the listing's first page, the only page that
    /// announces the remaining ones
    pub fn is_first_page(&self) -> bool {
        self.current_page == 1
    }
}

/// Fields extracted from an articles page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticlesPage {
    /// Entries in page order
    pub entries: Vec<ArticleEntry>,
    pub pagination: Option<Pagination>,
}

/// Capability of turning fetched page bodies into typed data
pub trait PageExtractor {
    /// Extracts author page links from the directory page, in page order
    fn extract_directory(&self, body: &str) -> Result<Vec<String>, ExtractError>;

    /// Extracts the author profile and articles link from an author page
    fn extract_author_page(&self, body: &str) -> Result<AuthorPage, ExtractError>;

    /// Extracts article entries and pagination from an articles page
    fn extract_articles_page(&self, body: &str) -> Result<ArticlesPage, ExtractError>;
}
