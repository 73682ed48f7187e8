// src/crawl/queue.rs
// =============================================================================
// This module drives the crawl: a breadth-first walk over the site that
// checks every image it meets along the way.
//
// How it works:
// 1. Seed the frontier with the base URL and the well-known entry points
// 2. Take the next page (FIFO) and mark it visited
// 3. Fetch it; skip it if it failed, is not a 200, or is not HTML
// 4. Extract images and links
// 5. Check every image nobody has checked yet (marked before the check runs)
// 6. Queue every link that is neither visited nor already queued
// 7. Repeat until the frontier is empty (or Ctrl+C was pressed)
//
// There is no depth or page limit: the site has finitely many pages and each
// one is fetched at most once, so the loop always ends.
//
// Page fetches run one at a time. The images found on one page are checked
// concurrently, up to `concurrency` at once.
// =============================================================================

use super::state::CrawlState;
use crate::checker::{check_image, extract, resolve, BodyMode, Fetcher, ImageCheckResult};
use crate::error::CrawlError;
use crate::report::CrawlReport;
use futures::future;
use futures::stream::{self, StreamExt};
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

// Sections of the site that the home page may not link to
pub const DEFAULT_ENTRY_POINTS: [&str; 5] = [
    "/blog",
    "/docs/architecture",
    "/docs/guide",
    "/docs/community",
    "/videos",
];

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
pub const DEFAULT_CONCURRENCY: usize = 8;

// Everything the crawler needs to know before it starts
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Where the crawl starts; also defines which host counts as "the site"
    pub base_url: Url,
    /// Extra paths to seed, resolved against base_url
    pub entry_points: Vec<String>,
    /// Per-request timeout (applies to every redirect hop)
    pub timeout: Duration,
    /// How many redirects a single fetch may follow
    pub max_redirects: usize,
    /// Maximum image checks in flight at once
    pub concurrency: usize,
    /// Print per-page progress lines to stdout
    pub show_progress: bool,
}

impl CrawlConfig {
    // Validates the base URL and fills in the defaults
    pub fn new(base_url: &str) -> Result<Self, CrawlError> {
        let parsed = Url::parse(base_url).map_err(|source| CrawlError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        if parsed.host_str().is_none() {
            return Err(CrawlError::BaseUrlWithoutHost(base_url.to_string()));
        }

        Ok(Self {
            base_url: parsed,
            entry_points: DEFAULT_ENTRY_POINTS.iter().map(|p| p.to_string()).collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            concurrency: DEFAULT_CONCURRENCY,
            show_progress: true,
        })
    }

    // The base URL followed by each entry point, duplicates removed
    //
    // Entry points that do not resolve are dropped without complaint.
    pub fn seeds(&self) -> Vec<Url> {
        let mut base = self.base_url.clone();
        base.set_fragment(None);

        let mut seeds = vec![base];
        for entry_point in &self.entry_points {
            if let Some(url) = resolve(entry_point, &self.base_url) {
                if !seeds.contains(&url) {
                    seeds.push(url);
                }
            }
        }
        seeds
    }
}

pub struct Crawler {
    config: CrawlConfig,
    fetcher: Fetcher,
    state: CrawlState,
    results: Vec<ImageCheckResult>,
    stop: Option<Arc<AtomicBool>>,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        let fetcher = Fetcher::new(config.timeout)?;

        Ok(Self {
            config,
            fetcher,
            state: CrawlState::new(),
            results: Vec::new(),
            stop: None,
        })
    }

    // Lets another task (the Ctrl+C handler) ask the crawl to stop
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    // Crawls until the frontier is empty
    //
    // Returns true if the crawl was interrupted before it finished.
    pub async fn run(&mut self, seeds: Vec<Url>) -> bool {
        for seed in seeds {
            self.state.enqueue(seed);
        }

        loop {
            if self.stop_requested() {
                warn!(
                    pending = self.state.pending_count(),
                    "crawl interrupted, reporting partial results"
                );
                return true;
            }

            let Some(page) = self.state.next_page() else {
                info!(
                    pages = self.state.visited_count(),
                    images = self.state.checked_count(),
                    "crawl finished"
                );
                return false;
            };

            self.crawl_page(page).await;
        }
    }

    // Fetches one page, checks its new images and queues its new links
    async fn crawl_page(&mut self, page: Url) {
        let max_redirects = self.config.max_redirects;

        let response = match self.fetcher.fetch(&page, BodyMode::Html, max_redirects).await {
            Ok(response) => response,
            Err(e) => {
                warn!(page = %page, error = %e, "failed to fetch page");
                self.progress(format!("  ❌ Error crawling {}: {}", page, e));
                return;
            }
        };

        if !response.is_ok() {
            warn!(page = %page, status = response.status.as_u16(), "skipping page");
            self.progress(format!(
                "  ⚠️  Skipping {} (status {})",
                page,
                response.status.as_u16()
            ));
            return;
        }

        let body = match response.body.as_deref() {
            Some(body) if response.is_html() => body,
            _ => {
                debug!(page = %page, content_type = ?response.content_type, "not an HTML page");
                return;
            }
        };

        self.progress(format!("  📄 Crawling: {}", page));

        // Resolve against where the page actually lives after redirects
        let extracted = extract(body, &response.url, &self.config.base_url);
        debug!(
            page = %page,
            images = extracted.images.len(),
            links = extracted.links.len(),
            "extracted page"
        );

        // Mark before checking, so the same image is never dispatched twice
        let new_images: Vec<Url> = extracted
            .images
            .into_iter()
            .filter(|image| self.state.mark_checked(image))
            .collect();

        // buffered() keeps results in discovery order; take_while() is asked
        // before each dispatch, so Ctrl+C stops new checks mid-page
        let fetcher = &self.fetcher;
        let stop = self.stop.clone();
        let results: Vec<ImageCheckResult> = stream::iter(new_images)
            .take_while(move |_| {
                future::ready(!stop.as_ref().is_some_and(|stop| stop.load(Ordering::SeqCst)))
            })
            .map(|image| check_image(fetcher, image, page.clone(), max_redirects))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        for result in &results {
            if !result.is_ok() {
                warn!(image = %result.url, found_on = %result.found_on, "broken image");
            }
        }
        self.results.extend(results);

        for link in extracted.links {
            self.state.enqueue(link);
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|stop| stop.load(Ordering::SeqCst))
    }

    fn progress(&self, line: impl Display) {
        if self.config.show_progress {
            println!("{}", line);
        }
    }

    // Consumes the crawler and summarizes what it found
    //
    // Images count as checked only once their check ran: after Ctrl+C some
    // images are marked but were never dispatched.
    pub fn into_report(self, interrupted: bool) -> CrawlReport {
        CrawlReport::new(
            self.state.visited_count(),
            self.results.len(),
            self.results,
            interrupted,
        )
    }
}

// Crawls a whole site and returns the report
//
// Parameters:
//   config: where to start and how to fetch
//   stop: optional flag that stops the crawl early (partial report)
pub async fn crawl_site(
    config: CrawlConfig,
    stop: Option<Arc<AtomicBool>>,
) -> Result<CrawlReport, CrawlError> {
    let seeds = config.seeds();
    info!(base = %config.base_url, seeds = seeds.len(), "starting crawl");

    let mut crawler = Crawler::new(config)?;
    if let Some(stop) = stop {
        crawler = crawler.with_stop_flag(stop);
    }

    let interrupted = crawler.run(seeds).await;
    Ok(crawler.into_report(interrupted))
}
