// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is a single command: crawl a site and check its images.
//
//   image-guardian                                  # http://localhost:3000
//   image-guardian --url https://docs.example.com --json
//   image-guardian --entry-point /blog --entry-point /docs/guide
//
// The defaults live next to the crawler (crawl::DEFAULT_*), so the CLI and
// CrawlConfig::new can never disagree.
// =============================================================================

use crate::crawl::{
    CrawlConfig, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_ENTRY_POINTS,
    DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS,
};
use crate::error::CrawlError;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "image-guardian",
    version,
    about = "Crawls a website and verifies that every image it references loads",
    long_about = "image-guardian starts at a base URL, follows every same-host link, and checks \
                  every <img>, srcset candidate and CSS background image it finds. \
                  It exits with code 1 if any image is broken, so it can gate a CI build."
)]
pub struct Cli {
    /// Base URL of the site to crawl
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub url: String,

    /// Extra path to start crawling from (repeatable)
    ///
    /// Sections with no inbound link from the home page are still reached.
    #[arg(long = "entry-point", value_name = "PATH", default_values_t = DEFAULT_ENTRY_POINTS.map(String::from))]
    pub entry_points: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Maximum redirects followed for a single page or image
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// Maximum image checks in flight at once (1 = fully sequential)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Output the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Log filter used when RUST_LOG is not set (e.g. "info", "image_guardian=debug")
    #[arg(long, value_name = "FILTER", default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    // Turns the parsed arguments into a validated crawl configuration
    pub fn to_config(&self) -> Result<CrawlConfig, CrawlError> {
        let mut config = CrawlConfig::new(&self.url)?;
        config.entry_points = self.entry_points.clone();
        config.timeout = Duration::from_secs(self.timeout);
        config.max_redirects = self.max_redirects;
        config.concurrency = self.concurrency.max(1);
        // Progress lines would corrupt the JSON on stdout
        config.show_progress = !self.json;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["image-guardian"]);
        assert_eq!(cli.url, "http://localhost:3000");
        assert_eq!(cli.entry_points.len(), DEFAULT_ENTRY_POINTS.len());
        assert_eq!(cli.timeout, 10);
        assert_eq!(cli.max_redirects, 5);
        assert!(!cli.json);

        let config = cli.to_config().unwrap();
        assert!(config.show_progress);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_custom_entry_points_replace_defaults() {
        let cli = Cli::parse_from([
            "image-guardian",
            "--url",
            "https://docs.example.com",
            "--entry-point",
            "/guide",
            "--entry-point",
            "/api",
            "--json",
        ]);
        assert_eq!(cli.entry_points, vec!["/guide", "/api"]);

        let config = cli.to_config().unwrap();
        assert!(!config.show_progress);
        assert_eq!(config.seeds().len(), 3);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let cli = Cli::parse_from(["image-guardian", "--concurrency", "0"]);
        assert_eq!(cli.to_config().unwrap().concurrency, 1);
    }

    #[test]
    fn test_bad_url_is_an_error() {
        let cli = Cli::parse_from(["image-guardian", "--url", "localhost"]);
        assert!(cli.to_config().is_err());
    }
}
