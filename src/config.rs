// src/config.rs
// =============================================================================
// Crawl configuration.
//
// A CrawlRequest is built once (usually from the command line, see cli.rs)
// and then only read. Every crawl call takes it by reference.
// =============================================================================

use std::time::Duration;

use crate::error::CrawlError;

/// Default size of the final corpus, in characters
pub const DEFAULT_MAX_CORPUS_CHARS: usize = 50_000;

/// Default number of page fetches in flight per seed
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Default cap on pages fetched per seed
pub const DEFAULT_MAX_PAGES: usize = 500;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Bodies above this many bytes are rejected as too large
pub const DEFAULT_MAX_BODY_BYTES: u64 = 5 * 1024 * 1024;

/// Everything a crawl needs to know
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Seed URLs, in the order the caller gave them
    pub seeds: Vec<String>,
    /// Upper bound on the length (in characters) of every corpus produced
    pub max_corpus_chars: usize,
    /// Maximum page fetches in flight for one seed
    pub max_concurrency: usize,
    /// Timeout for a single GET
    pub timeout: Duration,
    /// Maximum pages claimed per seed
    pub max_pages: usize,
    /// Maximum link hops from the seed (seed = depth 0), None = unlimited
    pub max_depth: Option<usize>,
    /// Cancel the whole crawl after this long, keeping what was collected
    pub deadline: Option<Duration>,
    /// Treat `page#a` and `page#b` as the same page
    pub strip_fragments: bool,
    /// Largest accepted response body
    pub max_body_bytes: u64,
    /// Produce one corpus across all seeds instead of one per seed
    pub merged: bool,
    /// Override for the browser-like User-Agent header
    pub user_agent: Option<String>,
}

impl Default for CrawlRequest {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            max_corpus_chars: DEFAULT_MAX_CORPUS_CHARS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_pages: DEFAULT_MAX_PAGES,
            max_depth: None,
            deadline: None,
            strip_fragments: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            merged: false,
            user_agent: None,
        }
    }
}

impl CrawlRequest {
    /// A request with default limits for the given seeds and budget
    pub fn new(seeds: Vec<String>, max_corpus_chars: usize) -> Self {
        Self {
            seeds,
            max_corpus_chars,
            ..Self::default()
        }
    }

    /// Checks the request-level invariants.
    ///
    /// Individual seeds are not parsed here: a bad seed only fails that
    /// seed, not the whole request.
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.seeds.is_empty() {
            return Err(CrawlError::InvalidRequest(
                "at least one seed URL is required".to_string(),
            ));
        }
        if self.max_corpus_chars == 0 {
            return Err(CrawlError::InvalidRequest(
                "max corpus characters must be greater than zero".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(CrawlError::InvalidRequest(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_pages == 0 {
            return Err(CrawlError::InvalidRequest(
                "max pages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let request = CrawlRequest::new(vec!["example.com".to_string()], 100);
        assert!(request.validate().is_ok());
        assert_eq!(request.max_pages, DEFAULT_MAX_PAGES);
        assert_eq!(request.max_depth, None);
    }

    #[test]
    fn test_rejects_empty_seeds() {
        let request = CrawlRequest::new(Vec::new(), 100);
        assert!(matches!(
            request.validate(),
            Err(CrawlError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_rejects_zero_budget() {
        let request = CrawlRequest::new(vec!["example.com".to_string()], 0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let request = CrawlRequest {
            max_concurrency: 0,
            ..CrawlRequest::new(vec!["example.com".to_string()], 10)
        };
        assert!(request.validate().is_err());
    }
}
