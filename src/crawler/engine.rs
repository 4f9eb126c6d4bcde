//! Crawl engine - depth-first mirroring of a single site
//!
//! The engine owns all mutable crawl state for one run and drives each page
//! through its lifecycle:
//! - Deduplicating visits before anything is fetched
//! - Fetching page bytes and extracting references
//! - Persisting the page and its scripts, stylesheets and images
//! - Recursing into anchors, one whole sub-tree at a time
//! - Returning navigation to the parent page on every exit path

use crate::crawler::extractor::{AnchorScope, ExtractedReference, PageExtractor};
use crate::crawler::fetcher::{FetchError, ResourceFetcher, SaveOutcome};
use crate::crawler::transport::Transport;
use crate::output::CrawlStatistics;
use crate::state::{FailureSet, NavigationTracker, PageState, VisitedSet};
use crate::url::{is_absolute_reference, is_on_site, without_fragment, CrawlContext};
use crate::MirrorError;
use futures::future::{BoxFuture, FutureExt};
use std::path::PathBuf;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// How a single page visit ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// The page had been visited before; nothing was done
    Duplicate,

    /// The page could not be fetched and was recorded as a failure
    FetchFailed,

    /// The page fetched but held no usable document
    Empty,

    /// The page, its assets and its sub-tree were processed
    Mirrored,
}

/// Summary of a finished (or cancelled) crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub seed_url: String,
    pub statistics: CrawlStatistics,

    /// Failed URLs in the order they were first recorded
    pub failures: Vec<String>,

    /// True if the run stopped because cancellation fired
    pub cancelled: bool,

    /// Where the failure report was written, if one was
    pub failure_report: Option<PathBuf>,
}

/// Lifecycle of the page one `visit` frame is working on
struct PageFrame {
    url: String,
    state: PageState,
}

impl PageFrame {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            state: PageState::Pending,
        }
    }

    fn advance(&mut self, next: PageState) -> Result<(), MirrorError> {
        if !self.state.can_transition_to(next) {
            return Err(MirrorError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!("{}: {} -> {}", self.url, self.state, next);
        self.state = next;
        Ok(())
    }
}

/// Main crawl engine structure
pub struct CrawlEngine<T> {
    fetcher: ResourceFetcher<T>,
    extractor: PageExtractor,
    navigation: NavigationTracker,
    visited: VisitedSet,
    failures: FailureSet,
    stats: CrawlStatistics,
    cancel: CancellationToken,
}

impl<T: Transport> CrawlEngine<T> {
    /// Creates a new engine
    ///
    /// # Arguments
    ///
    /// * `transport` - Where resource bytes come from
    /// * `root` - The output root artifacts are written under
    /// * `scope` - Which anchors on a page are followed
    /// * `cancel` - Fires to stop the crawl at the next fetch
    pub fn new(
        transport: T,
        root: impl Into<PathBuf>,
        scope: AnchorScope,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher: ResourceFetcher::new(transport, root, cancel.clone()),
            extractor: PageExtractor::new(scope),
            navigation: NavigationTracker::new(),
            visited: VisitedSet::new(),
            failures: FailureSet::new(),
            stats: CrawlStatistics::default(),
            cancel,
        }
    }

    pub fn navigation(&self) -> &NavigationTracker {
        &self.navigation
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Mirrors the site reachable from `seed_url`
    ///
    /// The site root is derived from the seed, and only pages under it are
    /// followed. Cancellation ends the run early but is not an error: the
    /// returned report has `cancelled` set.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl finished or was cancelled
    /// * `Err(MirrorError)` - The seed is not a valid site URL
    pub async fn run(&mut self, seed_url: &str) -> Result<CrawlReport, MirrorError> {
        let start_time = Instant::now();

        let seed = url::Url::parse(seed_url.trim())
            .map_err(|e| crate::UrlError::Parse(format!("{}: {}", seed_url, e)))?
            .to_string();
        let context = CrawlContext::for_seed(&seed)?;

        tracing::info!("Starting crawl of {} at {}", context.base_url, seed);

        let cancelled = match self.visit(context).await {
            Ok(_) => false,
            Err(e) if e.is_cancelled() => {
                tracing::info!("The crawl was cancelled.");
                true
            }
            Err(e) => return Err(e),
        };

        self.stats.failures = self.failure_count() as u64;
        self.stats.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl finished: {} pages visited, {} assets saved, {} failures in {:?}",
            self.stats.pages_visited,
            self.stats.assets_saved,
            self.stats.failures,
            self.stats.elapsed
        );

        Ok(CrawlReport {
            seed_url: seed,
            statistics: self.stats.clone(),
            failures: self.failures.failures().to_vec(),
            cancelled,
            failure_report: None,
        })
    }

    /// Visits one page and, depth-first, everything it links to
    ///
    /// Only cancellation (or a broken page lifecycle) is returned as an
    /// error; fetch and write failures are recorded and the crawl goes on.
    pub fn visit(&mut self, context: CrawlContext) -> BoxFuture<'_, Result<VisitOutcome, MirrorError>> {
        async move {
            self.check_cancelled()?;

            let mut frame = PageFrame::new(&context.current_url);

            if !self.visited.check_and_mark(&context.current_url) {
                frame.advance(PageState::Duplicate)?;
                self.stats.duplicate_visits += 1;
                tracing::debug!("Already visited: {}", context.current_url);
                return Ok(VisitOutcome::Duplicate);
            }
            self.stats.pages_visited += 1;

            self.navigation.enter(&context.current_url);
            let outcome = self.process_page(&mut frame, &context).await;
            self.navigation.leave();

            let outcome = outcome?;
            frame.advance(PageState::Backtracked)?;
            Ok(outcome)
        }
        .boxed()
    }

    async fn process_page(
        &mut self,
        frame: &mut PageFrame,
        context: &CrawlContext,
    ) -> Result<VisitOutcome, MirrorError> {
        let url = context.current_url.as_str();

        frame.advance(PageState::Fetching)?;
        let bytes = match self.fetcher.fetch_bytes(url).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_cancelled() => return Err(MirrorError::Cancelled),
            Err(e) => {
                frame.advance(PageState::FetchFailed)?;
                self.record_failure(&e);
                return Ok(VisitOutcome::FetchFailed);
            }
        };

        let page = match self.extractor.extract(&bytes, url) {
            Some(page) => page,
            None => {
                frame.advance(PageState::ParseFailed)?;
                self.stats.empty_pages += 1;
                tracing::info!("No content at {}, going back", url);
                return Ok(VisitOutcome::Empty);
            }
        };

        frame.advance(PageState::Extracting)?;
        match self.fetcher.save(url, &bytes).await {
            Ok(path) => {
                self.stats.pages_saved += 1;
                tracing::info!("Saved: {}", path.display());
            }
            Err(e) => self.record_failure(&e),
        }

        for reference in page.assets() {
            self.mirror_asset(context, reference).await?;
        }

        frame.advance(PageState::Recursing)?;
        for anchor in &page.anchors {
            self.check_cancelled()?;

            let target = match context.resolve(anchor) {
                Ok(target) => without_fragment(&target).to_string(),
                Err(e) => {
                    tracing::warn!("Skipping unresolvable link {} on {}: {}", anchor, url, e);
                    continue;
                }
            };

            if !is_on_site(&context.base_url, &target) {
                self.stats.offsite_anchors_skipped += 1;
                tracing::debug!("Skipping off-site link: {}", target);
                continue;
            }

            self.visit(context.descend(target)).await?;
        }

        Ok(VisitOutcome::Mirrored)
    }

    /// Downloads one script, stylesheet or image unless it is already on disk
    async fn mirror_asset(
        &mut self,
        context: &CrawlContext,
        reference: ExtractedReference,
    ) -> Result<(), MirrorError> {
        if let ExtractedReference::Script(raw) = &reference {
            if is_absolute_reference(raw) {
                self.stats.scripts_skipped += 1;
                tracing::info!("Skipping off-server script: {}", raw);
                return Ok(());
            }
        }

        let target = match context.resolve(reference.raw()) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(
                    "Skipping unresolvable {} {} on {}: {}",
                    reference.kind(),
                    reference.raw(),
                    context.current_url,
                    e
                );
                return Ok(());
            }
        };

        match self.fetcher.fetch_and_save(&target).await {
            Ok(SaveOutcome::Saved { path, bytes }) => {
                self.stats.assets_saved += 1;
                tracing::debug!("Wrote {} bytes to {}", bytes, path.display());
            }
            Ok(SaveOutcome::AlreadyPresent { .. }) => {
                self.stats.assets_already_present += 1;
            }
            Err(e) if e.is_cancelled() => return Err(MirrorError::Cancelled),
            Err(e) => self.record_failure(&e),
        }

        Ok(())
    }

    fn record_failure(&mut self, error: &FetchError) {
        tracing::warn!("{}", error);
        self.failures.record_failure(error.url());
        self.stats.failures = self.failure_count() as u64;
    }

    fn check_cancelled(&self) -> Result<(), MirrorError> {
        if self.cancel.is_cancelled() {
            return Err(MirrorError::Cancelled);
        }
        Ok(())
    }
}
