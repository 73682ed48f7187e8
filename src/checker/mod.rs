// src/checker/mod.rs
// =============================================================================
// This module contains everything needed to look at one URL.
//
// Submodules:
// - resolve: Turns references into absolute, comparable URLs
// - http: Fetches pages and checks images (redirects, timeouts)
// - html: Extracts images and links from HTML pages
//
// The crawl module decides WHICH URLs to look at; this module only knows HOW.
// =============================================================================

mod html;
mod http;
mod resolve;

pub use html::extract;
pub use http::{check_image, BodyMode, Fetcher, ImageCheckResult, ImageStatus};
pub use resolve::resolve;
