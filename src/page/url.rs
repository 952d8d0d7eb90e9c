// src/page/url.rs
// =============================================================================
// This module turns raw strings into canonical, absolute URLs.
//
// Two entry points:
// - CanonicalUrl::parse_seed: a URL typed by a user ("example.com" works)
// - CanonicalUrl::resolve: an href found on a page, relative to that page
//
// Same-origin means "same host". Scheme and port are ignored, so
// http://example.com and https://example.com:8443 are the same origin.
//
// Query strings and fragments are kept as-is unless the crawl asks for
// fragments to be stripped, so /page#a and /page#b are different URLs.
// =============================================================================

use std::fmt;

use url::Url;

use crate::error::CrawlError;

/// An absolute http(s) URL that has been normalized by the url crate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalUrl {
    url: Url,
}

impl CanonicalUrl {
    /// Parses a seed URL, adding `https://` when no scheme was given
    ///
    /// Example:
    ///   "example.com"       -> "https://example.com/"
    ///   "http://a.com/docs" -> "http://a.com/docs"
    pub fn parse_seed(raw: &str) -> Result<Self, CrawlError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CrawlError::invalid_url(raw, "empty URL"));
        }

        let with_scheme = if has_scheme(trimmed) {
            trimmed.to_string()
        } else if let Some(rest) = trimmed.strip_prefix("//") {
            format!("https://{}", rest)
        } else {
            format!("https://{}", trimmed)
        };

        let url = Url::parse(&with_scheme)
            .map_err(|e| CrawlError::invalid_url(raw, e.to_string()))?;

        Self::from_url(url).ok_or_else(|| CrawlError::invalid_url(raw, "not an http(s) URL with a host"))
    }

    /// Resolves an href found on this page into an absolute URL
    ///
    /// Returns None for links that can never be fetched: empty hrefs,
    /// mailto:, tel:, javascript:, data: and anything unparseable.
    pub fn resolve(&self, href: &str) -> Option<CanonicalUrl> {
        let href = href.trim();
        if href.is_empty() || is_special_scheme(href) {
            return None;
        }

        let joined = self.url.join(href).ok()?;
        Self::from_url(joined)
    }

    /// Whether both URLs share a host
    pub fn is_same_origin(&self, other: &CanonicalUrl) -> bool {
        self.host() == other.host()
    }

    /// Drops a `#fragment` suffix, if any
    pub fn without_fragment(mut self) -> Self {
        self.url.set_fragment(None);
        self
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    fn from_url(url: Url) -> Option<Self> {
        let web_scheme = url.scheme() == "http" || url.scheme() == "https";
        let has_host = url.host_str().map_or(false, |host| !host.is_empty());
        if web_scheme && has_host {
            Some(Self { url })
        } else {
            None
        }
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Whether the string starts with `scheme://`
//
// Only the start counts: "example.com/?next=https://x" has no scheme, and
// "example.com:8080" is a host and port, not a scheme.
fn has_scheme(raw: &str) -> bool {
    let Some((scheme, _)) = raw.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.'),
        _ => false,
    }
}

// Schemes we never follow
fn is_special_scheme(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    ["mailto:", "tel:", "javascript:", "data:"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}
