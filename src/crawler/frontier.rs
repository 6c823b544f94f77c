//! Frontier: the ordered queue of pending fetch tasks
//!
//! Tasks are served first-in first-out. The only exception is pruning: once an
//! author's cap is reached, every pending listing page of that author is
//! removed wherever it sits in the queue. No URL is ever deduplicated.

use crate::crawler::store::AuthorId;
use std::collections::VecDeque;

/// Kind of page a task fetches, with the routing data its handler needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// An author profile page
    AuthorPage,
    /// One page of an author's articles listing
    ArticlesPage { author_id: AuthorId },
}

/// One unit of frontier work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// The URL to fetch
    pub url: String,

    /// What the page is and where its results go
    pub kind: TaskKind,
}

impl Task {
    /// Creates a task for an author profile page
    pub fn author_page(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: TaskKind::AuthorPage,
        }
    }

    /// Creates a task for one page of an author's articles listing
    pub fn articles_page(url: impl Into<String>, author_id: AuthorId) -> Self {
        Self {
            url: url.into(),
            kind: TaskKind::ArticlesPage { author_id },
        }
    }

    /// Returns true if this is a listing page belonging to `author_id`
    pub fn is_articles_page_of(&self, author_id: AuthorId) -> bool {
        matches!(self.kind, TaskKind::ArticlesPage { author_id: id } if id == author_id)
    }
}

/// FIFO work queue with predicate-based removal
#[derive(Debug, Default)]
pub struct Frontier {
    tasks: VecDeque<Task>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task to the tail
    pub fn enqueue(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    /// Removes and returns up to `n` tasks from the head, in queue order
    pub fn dequeue_up_to(&mut self, n: usize) -> Vec<Task> {
        let count = n.min(self.tasks.len());
        self.tasks.drain(..count).collect()
    }

    /// Removes every task matching `predicate`, wherever it is queued
    ///
    /// Remaining tasks keep their relative order. Returns the number removed.
    pub fn remove_where<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&Task) -> bool,
    {
        let before = self.tasks.len();
        self.tasks.retain(|task| !predicate(task));
        before - self.tasks.len()
    }

    /// Returns the number of pending tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterates over pending tasks in queue order
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }
}

impl Extend<Task> for Frontier {
    fn extend<I: IntoIterator<Item = Task>>(&mut self, iter: I) {
        self.tasks.extend(iter);
    }
}
