// src/checker/http.rs
// =============================================================================
// This module talks HTTP: it fetches pages and checks images.
//
// Key functionality:
// - Fetcher: one GET per hop, redirects followed by hand up to a budget
// - Pages keep their body (we need the HTML); images drop it chunk by chunk
// - check_image: turns a fetch outcome into a working/broken verdict
//
// Why follow redirects by hand?
// - reqwest can follow them for us, but then a redirect loop comes back as an
//   opaque error and we lose the last 3xx status code
// - A plain loop with a hop counter keeps the status and never recurses
//
// Rust concepts:
// - async/await: For network I/O
// - Result<T, E>: For error handling
// - Enums: To represent request modes and image states
// =============================================================================

use crate::error::{CrawlError, FetchError};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

// What to do with the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Buffer the body as text if the response is HTML, drain it otherwise
    /// (pages: a same-host link to a big download is never held in memory)
    Html,
    /// Read and throw away the body without buffering it (images)
    Discard,
}

// Uniform result of a fetch, whatever happened along the redirect chain
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL that produced this response (after redirects)
    pub url: Url,
    /// Status of the last response we saw
    pub status: StatusCode,
    /// Content-Type header of the last response, if any
    pub content_type: Option<String>,
    /// Body text, only for BodyMode::Html on an HTML response
    pub body: Option<String>,
    /// True when we stopped because the redirect budget ran out
    pub redirects_exhausted: bool,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn is_html(&self) -> bool {
        is_html_content_type(self.content_type.as_deref())
    }
}

fn is_html_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|content_type| {
        let content_type = content_type.to_ascii_lowercase();
        content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
    })
}

// Thin wrapper around a reqwest client configured for crawling
//
// The client is reused for every request (connection pooling), and cloning
// it is cheap, so the Fetcher is Clone too.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    // Builds a fetcher whose every request (every redirect hop) is bounded
    // by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .user_agent(concat!("image-guardian/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }

    // Fetches a URL, following at most `max_redirects` redirects
    //
    // Returns:
    //   Ok(response) for any final status (the caller decides pass/fail),
    //                including a 3xx when the budget ran out
    //   Err(e)       when no response could be obtained at all
    pub async fn fetch(
        &self,
        url: &Url,
        mode: BodyMode,
        max_redirects: usize,
    ) -> Result<FetchResponse, FetchError> {
        let mut current = url.clone();
        let mut remaining = max_redirects;

        loop {
            let response = self.client.get(current.clone()).send().await?;
            let status = response.status();

            if status.is_redirection() {
                if let Some(location) = header_string(&response, LOCATION) {
                    if remaining == 0 {
                        debug!(url = %current, status = status.as_u16(), "redirect budget exhausted");
                        let content_type = header_string(&response, CONTENT_TYPE);
                        drain(response).await;
                        return Ok(FetchResponse {
                            url: current,
                            status,
                            content_type,
                            body: None,
                            redirects_exhausted: true,
                        });
                    }

                    let next = current
                        .join(&location)
                        .map_err(|_| FetchError::InvalidRedirect { location })?;
                    debug!(from = %current, to = %next, status = status.as_u16(), "following redirect");

                    // Consume the body so the connection goes back to the pool
                    drain(response).await;
                    remaining -= 1;
                    current = next;
                    continue;
                }
            }

            let content_type = header_string(&response, CONTENT_TYPE);
            // Look at the content type before reading anything
            let body = match mode {
                BodyMode::Html if is_html_content_type(content_type.as_deref()) => {
                    Some(response.text().await?)
                }
                BodyMode::Html | BodyMode::Discard => {
                    drain(response).await;
                    None
                }
            };

            return Ok(FetchResponse {
                url: current,
                status,
                content_type,
                body,
                redirects_exhausted: false,
            });
        }
    }
}

// Reads a header as an owned string (None if missing or not valid text)
fn header_string(response: &Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

// Reads the body chunk by chunk and throws every chunk away
//
// Only one chunk is held in memory at a time. If the body breaks off
// half-way we still know the status code, which is all an image check needs.
async fn drain(mut response: Response) {
    loop {
        match response.chunk().await {
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => {
                debug!(url = %response.url(), error = %e, "stopped draining body");
                break;
            }
        }
    }
}

// Whether an image loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    /// Returned HTTP 200
    Working,
    /// Any other status, or no response at all
    Broken,
}

// One line of the final report: one unique image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCheckResult {
    /// The image URL that was checked
    pub url: String,
    /// The first page (in crawl order) that referenced this image
    pub found_on: String,
    pub status: ImageStatus,
    /// Final HTTP status, when the server answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Why the image is broken (error text or "Too many redirects")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ImageCheckResult {
    pub fn is_ok(&self) -> bool {
        self.status == ImageStatus::Working
    }
}

// Checks one image
//
// A single attempt is final: no retries. Flaky servers are handled by
// running the whole verification again.
pub async fn check_image(
    fetcher: &Fetcher,
    image: Url,
    found_on: Url,
    max_redirects: usize,
) -> ImageCheckResult {
    let outcome = fetcher.fetch(&image, BodyMode::Discard, max_redirects).await;

    let (status, http_status, message) = match outcome {
        Ok(response) if response.is_ok() => {
            (ImageStatus::Working, Some(response.status.as_u16()), None)
        }
        Ok(response) => {
            let message = if response.redirects_exhausted {
                "Too many redirects".to_string()
            } else {
                format!("HTTP {}", response.status.as_u16())
            };
            (ImageStatus::Broken, Some(response.status.as_u16()), Some(message))
        }
        Err(e) => (ImageStatus::Broken, None, Some(e.to_string())),
    };

    debug!(image = %image, ?status, "checked image");

    ImageCheckResult {
        url: image.to_string(),
        found_on: found_on.to_string(),
        status,
        http_status,
        message,
    }
}
