// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from the base URL and entry points
// - Same-host restriction (pages elsewhere are never crawled)
// - Every page fetched once, every image checked once
// - Stops cleanly on Ctrl+C and still reports what it found
//
// Submodules:
// - state: frontier + visited/checked sets with check-and-mark operations
// - queue: the crawl loop itself
// =============================================================================

mod queue;
mod state;

pub use queue::{
    crawl_site, CrawlConfig, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_ENTRY_POINTS,
    DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS,
};
