// src/error.rs
// =============================================================================
// Error types for the fetcher and the crawler.
//
// Two families:
// - FetchError: one HTTP request (or redirect chain) could not produce a
//   response. Its message becomes the "detail" of a broken image.
// - CrawlError: the crawl cannot start at all (bad base URL, no HTTP client).
//
// Rust concepts:
// - thiserror: derives Display and Error for our enums
// - #[from]: lets the ? operator convert one error type into another
// =============================================================================

use thiserror::Error;

// Why a single request failed
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server did not answer within the per-request timeout
    #[error("Request timeout")]
    Timeout,

    /// Could not connect (DNS failure, connection refused, TLS handshake, ...)
    #[error("Connection failed: {0}")]
    Connect(String),

    /// A 3xx response carried a Location header we could not resolve
    #[error("Invalid redirect location '{location}'")]
    InvalidRedirect { location: String },

    /// Anything else reqwest reported
    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for FetchError {
    // Sorts reqwest errors into our categories
    //
    // Timeouts get their own variant so the report can tell
    // "server is slow" apart from "server is gone".
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_connect() {
            FetchError::Connect(error.to_string())
        } else {
            FetchError::Request(error.to_string())
        }
    }
}

// Why the crawl could not run
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Base URL has no host: {0}")]
    BaseUrlWithoutHost(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_is_distinct() {
        assert_eq!(FetchError::Timeout.to_string(), "Request timeout");
    }

    #[test]
    fn test_invalid_redirect_message_names_location() {
        let error = FetchError::InvalidRedirect {
            location: "http://[broken".to_string(),
        };
        assert!(error.to_string().contains("http://[broken"));
    }

    #[test]
    fn test_invalid_base_url_keeps_source() {
        let source = url::Url::parse("not a url").unwrap_err();
        let error = CrawlError::InvalidBaseUrl {
            url: "not a url".to_string(),
            source,
        };
        assert!(error.to_string().starts_with("Invalid base URL 'not a url'"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
