//! Crawler module for site mirroring
//!
//! This module contains the core crawling logic, including:
//! - HTTP transport with cooperative cancellation
//! - Resource fetching and on-disk placement
//! - HTML parsing and reference extraction
//! - The depth-first crawl engine

mod engine;
mod extractor;
mod fetcher;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{CrawlEngine, CrawlReport, VisitOutcome};
pub use extractor::{AnchorScope, ExtractedPage, ExtractedReference, PageExtractor, RegionRule};
pub use fetcher::{FetchError, ResourceFetcher, SaveOutcome};
pub use transport::{build_http_client, HttpTransport, Transport, TransportError};

use crate::config::Config;
use crate::output::{prepare_output_root, write_failure_report};
use crate::MirrorError;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Recreate the output root
/// 2. Build the HTTP transport
/// 3. Mirror the site from the configured start URL
/// 4. Write the failure report, unless the run was cancelled
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `cancel` - Fires to stop the crawl; the run then returns normally
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished or was cancelled
/// * `Err(MirrorError)` - Setup failed and nothing was crawled
pub async fn run_crawl(
    config: &Config,
    cancel: CancellationToken,
) -> Result<CrawlReport, MirrorError> {
    let root = Path::new(&config.output.root_dir);
    prepare_output_root(root).await?;

    let transport = HttpTransport::from_config(&config.user_agent, &config.crawler)?;
    let scope = AnchorScope::from_config(&config.scope)?;

    let mut engine = CrawlEngine::new(transport, root, scope, cancel);
    let mut report = engine.run(&config.crawler.start_url).await?;

    if !report.cancelled {
        report.failure_report =
            write_failure_report(root, &config.output.failure_report, &report.failures).await?;
    }

    Ok(report)
}
