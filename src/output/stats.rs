//! Run statistics gathered by the crawl engine
//!
//! This module provides the counters a crawl accumulates and a formatted
//! summary printer for the end of a run.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Pages handed to the engine for the first time
    pub pages_visited: u64,

    /// Pages whose bytes were written to the output root
    pub pages_saved: u64,

    /// Visits skipped because the page had been seen before
    pub duplicate_visits: u64,

    /// Pages that fetched but did not yield a usable document
    pub empty_pages: u64,

    /// Scripts, stylesheets and images downloaded this run
    pub assets_saved: u64,

    /// Assets skipped because their file already existed
    pub assets_already_present: u64,

    /// Scripts referenced by absolute URL and never fetched
    pub scripts_skipped: u64,

    /// Anchors pointing outside the site
    pub offsite_anchors_skipped: u64,

    /// Distinct URLs that could not be fetched or written
    pub failures: u64,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Every resource written this run, pages and assets together
    pub fn files_written(&self) -> u64 {
        self.pages_saved + self.assets_saved
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Pages:");
    println!("  Visited: {}", stats.pages_visited);
    println!("  Saved: {}", stats.pages_saved);
    println!("  Duplicate visits skipped: {}", stats.duplicate_visits);
    println!("  Empty pages: {}", stats.empty_pages);
    println!();

    println!("Assets:");
    println!("  Downloaded: {}", stats.assets_saved);
    println!("  Already on disk: {}", stats.assets_already_present);
    println!("  Off-server scripts skipped: {}", stats.scripts_skipped);
    println!();

    if stats.offsite_anchors_skipped > 0 {
        println!("Off-site links skipped: {}", stats.offsite_anchors_skipped);
        println!();
    }

    let attempted = stats.files_written() + stats.failures;
    let success_rate = if attempted > 0 {
        (stats.files_written() as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} written, {} failed) in {:.2?}",
        success_rate,
        stats.files_written(),
        stats.failures,
        stats.elapsed
    );
}
