//! In-memory result store
//!
//! Author records are appended in the order their pages are processed. The
//! position of a record is its [`AuthorId`]; listing-page tasks carry that id
//! so later batches can append articles to the right author.

use crate::models::{ArticleRecord, AuthorRecord};
use crate::{HarvestError, Result};

/// Position of an author record in the store
pub type AuthorId = usize;

#[derive(Debug, Default)]
pub struct ResultStore {
    authors: Vec<AuthorRecord>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an author record and returns its id
    pub fn push_author(&mut self, author: AuthorRecord) -> AuthorId {
        self.authors.push(author);
        self.authors.len() - 1
    }

    pub fn author(&self, id: AuthorId) -> Option<&AuthorRecord> {
        self.authors.get(id)
    }

    /// Number of articles collected so far for `id`
    pub fn article_count(&self, id: AuthorId) -> Result<usize> {
        self.author(id)
            .map(|author| author.articles.len())
            .ok_or(HarvestError::UnknownAuthor(id))
    }

    /// Appends an article to author `id` and returns the new article count
    pub fn push_article(&mut self, id: AuthorId, article: ArticleRecord) -> Result<usize> {
        let author = self
            .authors
            .get_mut(id)
            .ok_or(HarvestError::UnknownAuthor(id))?;
        author.articles.push(article);
        Ok(author.articles.len())
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// Consumes the store, yielding records in creation order
    pub fn into_records(self) -> Vec<AuthorRecord> {
        self.authors
    }
}
