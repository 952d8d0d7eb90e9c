// src/error.rs
// =============================================================================
// Error types shared by the crawler modules.
//
// Two families:
// - CrawlError: stops a whole seed (or the whole request) from being crawled
// - FetchError: one page failed; the crawl records it and keeps going
//
// The binary layer (main.rs) wraps everything in anyhow::Result, the same
// way it always has. The library-style modules below it use these typed
// errors so callers can match on what went wrong.
// =============================================================================

use thiserror::Error;

/// Errors that abort a seed or a whole crawl request
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed URL could not be turned into an absolute http(s) URL
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request itself is unusable (no seeds, zero budget, ...)
    #[error("invalid crawl request: {0}")]
    InvalidRequest(String),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl CrawlError {
    pub(crate) fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        CrawlError::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Classified failure of a single page fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request hit the per-request timeout
    #[error("request timed out")]
    Timeout,

    /// Connection refused, reset, DNS failure, redirect loop, ...
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("HTTP {0}")]
    HttpStatus(u16),

    /// The body is bigger than the configured limit
    #[error("response too large: {0} bytes")]
    TooLarge(u64),

    /// The server sent something that is not a web page (PDF, image, ...)
    #[error("unsupported content type: {0}")]
    ContentType(String),
}

impl FetchError {
    /// Short, stable name of the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout | FetchError::Network(_) => "network",
            FetchError::HttpStatus(_) => "http-status",
            FetchError::TooLarge(_) => "too-large",
            FetchError::ContentType(_) => "content-type",
        }
    }
}
