//! Output module for the mirror root and end-of-run reports
//!
//! This module handles:
//! - Recreating the output root before a crawl
//! - Writing the failed-downloads report
//! - Recording and printing crawl statistics

mod layout;
mod report;
pub mod stats;

pub use layout::prepare_output_root;
pub use report::write_failure_report;
pub use stats::{print_statistics, CrawlStatistics};
