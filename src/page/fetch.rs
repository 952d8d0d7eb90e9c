// src/page/fetch.rs
// =============================================================================
// This module downloads one page.
//
// Key functionality:
// - One GET per page, no retries
// - Browser-like User-Agent and Accept headers (some sites reject bare clients)
// - Classifies failures: timeout / network, non-2xx status, oversized body,
//   non-page content (PDFs, images, archives, ...)
//
// The body is read chunk by chunk so an oversized page is rejected as soon
// as it crosses the limit, without buffering the rest of it.
//
// Rust concepts:
// - async/await: The fetch waits on the network without blocking a thread
// - Result<T, E>: Every failure becomes a FetchError the caller can match on
// - map_err: Converts reqwest's error type into ours at the ? operator
// =============================================================================

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::Client;

use crate::config::CrawlRequest;
use crate::error::{CrawlError, FetchError};

use super::url::CanonicalUrl;

/// User-Agent sent unless the request overrides it
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

const MAX_REDIRECTS: usize = 10;

/// Fetches pages for one crawl
///
/// Cloning the inner reqwest Client is cheap, so one fetcher is shared by
/// every worker of a crawl behind an Arc.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    max_body_bytes: u64,
}

impl PageFetcher {
    pub fn new(
        timeout: Duration,
        user_agent: &str,
        max_body_bytes: u64,
    ) -> Result<Self, CrawlError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }

    /// Builds a fetcher from the crawl settings
    pub fn from_request(request: &CrawlRequest) -> Result<Self, CrawlError> {
        let user_agent = request.user_agent.as_deref().unwrap_or(BROWSER_USER_AGENT);
        Self::new(request.timeout, user_agent, request.max_body_bytes)
    }

    /// Downloads the page body
    ///
    /// Returns the raw bytes on a 2xx HTML (or plain text) answer, a
    /// FetchError otherwise.
    pub async fn fetch(&self, url: &CanonicalUrl) -> Result<Vec<u8>, FetchError> {
        // Send the GET; connection problems and timeouts surface here
        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(categorize_error)?;

        // Anything outside 200-299 is a failure for this page
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        // Only web pages are worth extracting text from
        // A missing Content-Type header is treated as HTML
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("text/html")
            .to_string();
        if !is_page_content_type(&content_type) {
            return Err(FetchError::ContentType(content_type));
        }

        // Reject early when the server announces a size over the limit
        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes {
                return Err(FetchError::TooLarge(length));
            }
        }

        // Read the body piece by piece, stopping as soon as it gets too big
        // (servers may omit Content-Length or lie about it)
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(categorize_error)? {
            body.extend_from_slice(&chunk);
            if body.len() as u64 > self.max_body_bytes {
                return Err(FetchError::TooLarge(body.len() as u64));
            }
        }

        Ok(body)
    }
}

// Checks a Content-Type header value against the types we extract text from
//
// Examples:
//   "text/html; charset=utf-8" -> true
//   "application/xhtml+xml"    -> true
//   "text/plain"               -> true
//   "application/pdf"          -> false
fn is_page_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.contains("text/html")
        || lower.contains("application/xhtml")
        || lower.contains("text/plain")
}

// Maps a reqwest error onto our failure classes
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::Network("too many redirects".to_string())
    } else if error.is_connect() {
        FetchError::Network(format!("connection failed: {}", error))
    } else {
        FetchError::Network(error.to_string())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is response.chunk()?
//    - It returns the next piece of the body as it arrives
//    - Ok(Some(bytes)) = more data, Ok(None) = body finished
//    - while let keeps looping as long as we get Some(...)
//
// 2. Why `as u64`?
//    - Vec::len() returns usize, our limit is a u64
//    - Rust never converts between integer types silently
//
// 3. What does Client::builder() give us?
//    - A ClientBuilder where every setting is one method call
//    - build() checks the settings and returns Result<Client, reqwest::Error>
//    - The ? operator turns that error into CrawlError::Client via #[from]
// -----------------------------------------------------------------------------
