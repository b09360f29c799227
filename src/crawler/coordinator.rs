//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Managing the LIFO frontier and the seen set
//! - Keeping every request inside the seed's authority
//! - Coordinating fetching, extraction, annotation and persistence
//! - Expanding the frontier from HTML pages
//! - Honoring the page budget and the shutdown flag

use crate::annotate::Annotator;
use crate::config::Config;
use crate::content::{classify_and_extract, decode_html, ContentKind, Extraction};
use crate::crawler::fetcher::{FetchedPage, Fetcher, HttpFetcher};
use crate::crawler::parser::extract_links;
use crate::output::{CrawlStatistics, PageWriter};
use crate::state::{CrawlSession, PageOutcome};
use crate::url::is_same_authority;
use crate::{PageError, ScribeError};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Iterations between progress log lines
const PROGRESS_INTERVAL: u64 = 10;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Box<dyn Fetcher>,
    annotator: Box<dyn Annotator>,
    writer: PageWriter,
    session: CrawlSession,
    stats: CrawlStatistics,
    shutdown: Option<Arc<AtomicBool>>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// The session is seeded with `config.start_url` and the domain output
    /// directory `<output_directory>/<authority>` is created.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Performs the GET requests
    /// * `annotator` - Annotates extracted text
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ScribeError)` - Bad seed URL or the output directory could not be created
    pub fn new(
        config: Config,
        fetcher: Box<dyn Fetcher>,
        annotator: Box<dyn Annotator>,
    ) -> Result<Self, ScribeError> {
        let session = CrawlSession::new(&config.start_url, config.max_pages)?;

        let writer = PageWriter::create(
            Path::new(&config.output_directory),
            session.local_domain(),
            config.disambiguate_filenames,
        )?;

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            annotator,
            writer,
            session,
            stats: CrawlStatistics::new(),
            shutdown: None,
        })
    }

    /// Installs a flag that stops the crawl at the next iteration boundary
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// Pushes an extra URL onto the frontier
    pub fn enqueue(&mut self, url: impl Into<String>) {
        self.session.push(url);
    }

    /// The crawl session state
    pub fn session(&self) -> &CrawlSession {
        &self.session
    }

    /// The directory pages are written to
    pub fn output_dir(&self) -> &Path {
        self.writer.dir()
    }

    /// Runs the main crawl loop
    ///
    /// The loop ends when the frontier is empty, the page budget is reached
    /// or shutdown is requested. Only persistence failures end it early with
    /// an error; every other per-page failure is logged and skipped.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStatistics)` - Counters for the finished run
    /// * `Err(ScribeError::Persistence)` - A page file could not be written
    pub async fn run(&mut self) -> Result<CrawlStatistics, ScribeError> {
        tracing::info!(
            "Starting crawl of {} (budget: {} pages)",
            self.session.local_domain(),
            self.session.page_budget()
        );

        let start_time = Instant::now();
        let mut next_progress = PROGRESS_INTERVAL;

        while !self.session.budget_reached() {
            if self.shutdown_requested() {
                tracing::info!("Shutdown requested, stopping crawl");
                break;
            }

            let stats = &mut self.stats;
            let claimed = self.session.claim_next(|skipped| {
                tracing::debug!("Already seen, skipping {}", skipped);
                stats.record(PageOutcome::AlreadySeen);
            });

            let url = match claimed {
                Some(url) => url,
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
            };

            let outcome = self.process_url(&url).await?;
            self.stats.record(outcome);

            if self.stats.iterations >= next_progress {
                next_progress = self.stats.iterations + PROGRESS_INTERVAL;
                let elapsed = start_time.elapsed().as_secs_f64();
                let rate = if elapsed > 0.0 {
                    self.stats.iterations as f64 / elapsed
                } else {
                    0.0
                };
                tracing::info!(
                    "Progress: {} URLs visited, {} pages saved, {} in frontier, {:.2} URLs/sec",
                    self.stats.iterations,
                    self.session.processed_count(),
                    self.session.frontier_size(),
                    rate
                );
            }

            if outcome.is_success() && !self.session.is_finished() {
                self.pause().await;
            }
        }

        self.stats.finish();
        tracing::info!(
            "Crawl completed: {} pages saved, {} URLs visited in {:?}",
            self.session.processed_count(),
            self.stats.iterations,
            start_time.elapsed()
        );

        Ok(self.stats.clone())
    }

    /// Processes a single claimed URL
    ///
    /// The URL's normalized key is already in the seen set. Page-level
    /// failures become an outcome; only a failed write is returned as an error.
    async fn process_url(&mut self, url: &str) -> Result<PageOutcome, ScribeError> {
        if !is_same_authority(url, self.session.local_domain()) {
            tracing::debug!("Out of domain, skipping {}", url);
            return Ok(PageOutcome::OutOfDomain);
        }

        tracing::info!("Fetching {}", url);
        let page = match self.fetch_page(url).await {
            Ok(page) => page,
            Err(e) => return Ok(log_page_error(&e)),
        };

        let (kind, text) = match classify_and_extract(&page.content_type, &page.final_url, &page.body) {
            Extraction::Text { kind, text } => (kind, text),
            Extraction::Empty { .. } => {
                let e = PageError::EmptyContent {
                    url: page.final_url.clone(),
                };
                return Ok(log_page_error(&e));
            }
            Extraction::Unsupported => {
                let e = PageError::UnsupportedContentType {
                    url: page.final_url.clone(),
                    content_type: page.content_type.clone(),
                };
                return Ok(log_page_error(&e));
            }
        };

        let annotation = self.annotator.annotate(&text).await;

        let path = self.writer.write_page(&page.final_url, &annotation, &text)?;
        self.session.record_processed();
        tracing::info!(
            "Saved {} to {} ({}/{})",
            page.final_url,
            path.display(),
            self.session.processed_count(),
            self.session.page_budget()
        );

        if kind == ContentKind::Html {
            self.expand_frontier(&page);
        }

        Ok(PageOutcome::Processed)
    }

    /// Fetches a URL and sorts the response into a page or a page error
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, PageError> {
        let page = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| PageError::Fetch {
                url: url.to_string(),
                source,
            })?;

        match page.status {
            200..=299 => Ok(page),
            404 => Err(PageError::NotFound {
                url: url.to_string(),
            }),
            status => Err(PageError::HttpStatus {
                url: url.to_string(),
                status,
            }),
        }
    }

    /// Pushes the unseen in-domain links of an HTML page onto the frontier
    fn expand_frontier(&mut self, page: &FetchedPage) {
        let html = decode_html(&page.body, &page.content_type);
        let links = extract_links(
            self.session.local_domain(),
            &html,
            &page.final_url,
            &self.config.excluded_link_patterns,
        );

        let mut queued = 0;
        for link in links {
            if self.session.is_seen(&link) {
                continue;
            }
            tracing::info!("Queued {}", link);
            self.session.push(link);
            queued += 1;
        }

        self.stats.record_queued(queued);
        tracing::debug!("{} links queued from {}", queued, page.final_url);
    }

    /// Waits the configured delay, returning early on shutdown
    async fn pause(&self) {
        let delay = self.config.delay();
        if delay.is_zero() {
            return;
        }

        match &self.shutdown {
            Some(flag) => {
                let step = Duration::from_millis(100);
                let mut remaining = delay;
                while !remaining.is_zero() && !flag.load(Ordering::SeqCst) {
                    let chunk = remaining.min(step);
                    tokio::time::sleep(chunk).await;
                    remaining -= chunk;
                }
            }
            None => tokio::time::sleep(delay).await,
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}

/// Logs a page-level failure and maps it to its outcome
fn log_page_error(error: &PageError) -> PageOutcome {
    match error {
        PageError::NotFound { .. } => {
            tracing::warn!("{}", error);
            PageOutcome::DeadLink
        }
        PageError::Fetch { .. } | PageError::HttpStatus { .. } => {
            tracing::error!("{}", error);
            PageOutcome::FetchFailed
        }
        PageError::UnsupportedContentType { .. } => {
            tracing::info!("{}", error);
            PageOutcome::Unsupported
        }
        PageError::EmptyContent { .. } => {
            tracing::warn!("{}", error);
            PageOutcome::EmptyContent
        }
    }
}

/// Runs the main crawl operation
///
/// Builds an [`HttpFetcher`] from the configuration and drives a
/// [`Coordinator`] to completion.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `annotator` - Annotates extracted text
/// * `shutdown` - Optional flag checked at each iteration boundary
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl completed
/// * `Err(ScribeError)` - Setup failed or a page could not be written
///
/// # Example
///
/// ```no_run
/// use site_scribe::annotate::NullAnnotator;
/// use site_scribe::config::load_config;
/// use site_scribe::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let stats = run_crawl(config, Box::new(NullAnnotator), None).await?;
/// println!("{} pages saved", stats.pages_processed);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    annotator: Box<dyn Annotator>,
    shutdown: Option<Arc<AtomicBool>>,
) -> Result<CrawlStatistics, ScribeError> {
    let fetcher = HttpFetcher::new(
        &config.user_agent,
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let mut coordinator = Coordinator::new(config, Box::new(fetcher), annotator)?;
    if let Some(flag) = shutdown {
        coordinator = coordinator.with_shutdown(flag);
    }
    coordinator.run().await
}
