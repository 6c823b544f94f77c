//! HTML extractor for the archive's directory, author and articles pages
//!
//! Extraction rules, by page kind:
//!
//! **Directory page:** featured authors first, then the alphabetical listing.
//!
//! **Author page:** everything lives under `div.author-info`:
//! - name: `h1.headline a` (required)
//! - bio: `div.abstract` (required)
//! - Twitter: a `twitter.com` link inside the bio (optional)
//! - articles listing: `div.link.articles a[href]` (required)
//!
//! **Articles page:** each `div.record.clearfix` under `div.records` carries a
//! `div.date` and an `h2.headline a`. The pagination control is `div.pagination`:
//! its `em` holds the current page and its second-to-last link the last page.

use super::{ArticleEntry, ArticlesPage, AuthorPage, PageExtractor, Pagination};
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};

const FEATURED_AUTHOR_LINKS: &str =
    "div.featured > div.records > div.record div.author-info > h1.headline > a[href]";
const LETTER_AUTHOR_LINKS: &str = "div.authors > div.records.author-letter a[href]";
const AUTHOR_INFO: &str = "div.author-info";
const AUTHOR_NAME: &str = "h1.headline a";
const AUTHOR_BIO: &str = "div.abstract";
const AUTHOR_TWITTER: &str = "div.abstract > a[href*='://twitter.com/']";
const AUTHOR_ARTICLES_LINK: &str = "div.link.articles a";
const ARTICLE_RECORD: &str = "div.records div.record.clearfix";
const ARTICLE_DATE: &str = "div.date";
const ARTICLE_TITLE: &str = "h2.headline a";
const PAGINATION_CURRENT: &str = "div.pagination > em";
const PAGINATION_LINKS: &str = "div.pagination > a";

/// [`PageExtractor`] backed by CSS selectors over the parsed document
pub struct HtmlExtractor {
    featured_author_links: Selector,
    letter_author_links: Selector,
    author_info: Selector,
    author_name: Selector,
    author_bio: Selector,
    author_twitter: Selector,
    author_articles_link: Selector,
    article_record: Selector,
    article_date: Selector,
    article_title: Selector,
    pagination_current: Selector,
    pagination_links: Selector,
}

impl HtmlExtractor {
    pub fn new() -> Self {
        Self {
            featured_author_links: selector(FEATURED_AUTHOR_LINKS),
            letter_author_links: selector(LETTER_AUTHOR_LINKS),
            author_info: selector(AUTHOR_INFO),
            author_name: selector(AUTHOR_NAME),
            author_bio: selector(AUTHOR_BIO),
            author_twitter: selector(AUTHOR_TWITTER),
            author_articles_link: selector(AUTHOR_ARTICLES_LINK),
            article_record: selector(ARTICLE_RECORD),
            article_date: selector(ARTICLE_DATE),
            article_title: selector(ARTICLE_TITLE),
            pagination_current: selector(PAGINATION_CURRENT),
            pagination_links: selector(PAGINATION_LINKS),
        }
    }

    /// Reads the pagination control, if the page has a complete one
    fn extract_pagination(&self, document: &Html) -> Option<Pagination> {
        let current_page = document
            .select(&self.pagination_current)
            .next()
            .and_then(|em| text_of(em).parse::<u32>().ok())?;

        // The last link is "next"; the one before it names the last page
        let links: Vec<ElementRef> = document.select(&self.pagination_links).collect();
        let last_page = links
            .len()
            .checked_sub(2)
            .and_then(|idx| text_of(links[idx]).parse::<u32>().ok())?;

        Some(Pagination {
            current_page,
            last_page,
        })
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageExtractor for HtmlExtractor {
    fn extract_directory(&self, body: &str) -> Result<Vec<String>, ExtractError> {
        let document = Html::parse_document(body);

        let links = document
            .select(&self.featured_author_links)
            .chain(document.select(&self.letter_author_links))
            .filter_map(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string())
            .collect();

        Ok(links)
    }

    fn extract_author_page(&self, body: &str) -> Result<AuthorPage, ExtractError> {
        let document = Html::parse_document(body);

        let info = document
            .select(&self.author_info)
            .next()
            .ok_or(ExtractError::MissingElement(AUTHOR_INFO))?;

        let name = info
            .select(&self.author_name)
            .next()
            .map(text_of)
            .ok_or(ExtractError::MissingElement(AUTHOR_NAME))?;

        let bio = info
            .select(&self.author_bio)
            .next()
            .map(text_of)
            .ok_or(ExtractError::MissingElement(AUTHOR_BIO))?;

        // Any abstract on the page may carry the link, not only the one in the info block
        let twitter_handle = document
            .select(&self.author_twitter)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);

        let articles_link = info
            .select(&self.author_articles_link)
            .next()
            .ok_or(ExtractError::MissingElement(AUTHOR_ARTICLES_LINK))?
            .value()
            .attr("href")
            .ok_or(ExtractError::MissingAttribute {
                element: AUTHOR_ARTICLES_LINK,
                attribute: "href",
            })?
            .trim()
            .to_string();

        Ok(AuthorPage {
            name,
            bio,
            twitter_handle,
            articles_link,
        })
    }

    fn extract_articles_page(&self, body: &str) -> Result<ArticlesPage, ExtractError> {
        let document = Html::parse_document(body);
        let mut entries = Vec::new();

        for record in document.select(&self.article_record) {
            let date_text = record
                .select(&self.article_date)
                .next()
                .map(text_of)
                .ok_or(ExtractError::MissingElement(ARTICLE_DATE))?;

            let title_link = record
                .select(&self.article_title)
                .next()
                .ok_or(ExtractError::MissingElement(ARTICLE_TITLE))?;

            let link = title_link
                .value()
                .attr("href")
                .ok_or(ExtractError::MissingAttribute {
                    element: ARTICLE_TITLE,
                    attribute: "href",
                })?
                .trim()
                .to_string();

            entries.push(ArticleEntry {
                title: text_of(title_link),
                link,
                date_text,
            });
        }

        Ok(ArticlesPage {
            entries,
            pagination: self.extract_pagination(&document),
        })
    }
}

/// Parses one of the selector constants above
fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {:?}: {:?}", css, e))
}

/// Concatenated, trimmed text content of an element
fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
