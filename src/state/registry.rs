//! Crawl-wide bookkeeping of visited pages and failed downloads

use std::collections::HashSet;

/// Pages already handed to the engine, whatever their outcome
///
/// The set only grows. A URL is recorded before any fetch is attempted,
/// which is what cuts cycles in the link graph.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_visited(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn mark_visited(&mut self, url: &str) {
        self.urls.insert(url.to_string());
    }

    /// Marks `url` visited and returns true if it had not been visited before
    pub fn check_and_mark(&mut self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// URLs whose download failed, in the order they first failed
#[derive(Debug, Default)]
pub struct FailureSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl FailureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failed URL; recording the same URL again has no effect
    pub fn record_failure(&mut self, url: &str) {
        if self.seen.insert(url.to_string()) {
            self.ordered.push(url.to_string());
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.ordered.is_empty()
    }

    /// All failed URLs in insertion order
    pub fn failures(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
