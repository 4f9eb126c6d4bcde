//! Navigation tracking for depth-first traversal
//!
//! The tracker records which page is current and the chain of pages the
//! crawl descended through to reach it, so that finishing a page returns
//! the crawl to its parent.

/// Current page plus the history of pages above it
#[derive(Debug, Default)]
pub struct NavigationTracker {
    current: Option<String>,
    history: Vec<String>,
}

impl NavigationTracker {
    /// Creates an idle tracker with no current page
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `url` the current page, pushing the previous one onto the history
    pub fn enter(&mut self, url: &str) {
        if let Some(previous) = self.current.take() {
            self.history.push(previous);
        }
        self.current = Some(url.to_string());

        tracing::info!("Navigated to: {}", url);
    }

    /// Returns to the previous page, or to no page at all if the history is empty
    pub fn leave(&mut self) {
        if let Some(current) = &self.current {
            tracing::info!("Leaving: {}", current);
        }

        self.current = self.history.pop();
    }

    /// The page currently being processed
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Number of pages below the current one
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// True when no page is current and the history is empty
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.history.is_empty()
    }
}
