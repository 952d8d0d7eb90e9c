// src/page/mod.rs
// =============================================================================
// Everything that happens to a single page.
//
// Submodules:
// - url: Canonical URLs, seed parsing, link resolution, same-origin checks
// - fetch: Downloads a page with browser-like headers
// - text: Extracts visible text fragments and anchor hrefs from HTML
//
// The crawl module strings these together; `site-corpus page <URL>` uses
// them directly for a one-page dump.
// =============================================================================

mod fetch;
mod text;
mod url;

pub use self::fetch::{PageFetcher, BROWSER_USER_AGENT};
pub use self::text::{extract_page, normalize_whitespace};
pub use self::url::CanonicalUrl;
