//! URL handling module for Site-Mirror
//!
//! This module provides reference resolution against the current page,
//! site-root derivation, and the mapping from resource URLs to their
//! mirrored location on disk.

mod local_path;
mod resolve;

// Re-export main functions
pub use local_path::local_path;
pub use resolve::{is_absolute_reference, is_on_site, resolve, site_root, without_fragment};

/// Page being processed and the site it belongs to
///
/// A new context is created for every page the crawl descends into; the
/// `base_url` is shared by all of them and never changes during a crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlContext {
    /// Scheme and host of the site root, e.g. `http://books.toscrape.com`
    pub base_url: String,

    /// Absolute URL of the page currently being processed
    pub current_url: String,
}

impl CrawlContext {
    /// Creates a context for the given page on the given site
    pub fn new(base_url: impl Into<String>, current_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            current_url: current_url.into(),
        }
    }

    /// Creates the root context for a crawl starting at `seed_url`
    pub fn for_seed(seed_url: &str) -> crate::UrlResult<Self> {
        Ok(Self::new(site_root(seed_url)?, seed_url))
    }

    /// Resolves a reference found on the current page
    pub fn resolve(&self, reference: &str) -> crate::UrlResult<String> {
        resolve(&self.base_url, &self.current_url, reference)
    }

    /// Creates a context for a linked page on the same site
    pub fn descend(&self, url: impl Into<String>) -> Self {
        Self::new(self.base_url.clone(), url)
    }
}
