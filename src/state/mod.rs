//! State module for tracking crawl progress
//!
//! This module provides the mutable state a crawl carries from page to page.
//!
//! # Components
//!
//! - `PageState`: Lifecycle of a single page within its crawl frame
//! - `NavigationTracker`: Current page and the backtracking history
//! - `VisitedSet` / `FailureSet`: Crawl-wide dedup and failure bookkeeping

mod navigation;
mod page_state;
mod registry;

// Re-export main types
pub use navigation::NavigationTracker;
pub use page_state::PageState;
pub use registry::{FailureSet, VisitedSet};
