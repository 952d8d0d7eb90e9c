// src/crawl/queue.rs
// =============================================================================
// This module crawls one seed: a work queue drained by a bounded pool of
// fetch tasks.
//
// How it works:
// 1. Canonicalize the seed and claim it
// 2. Keep up to `max_concurrency` fetch tasks running, fed from a queue
// 3. Each task fetches its page, appends the page text to the seed's
//    accumulator, and claims the same-origin links it found
// 4. Links whose claim succeeded come back to the loop and join the queue
// 5. Stop when the queue is empty and no task is running
//
// Cancellation:
// - The loop watches a CancellationToken
// - Once it fires, nothing new is started and running tasks are aborted
// - Whatever text was collected so far is still returned
//
// Rust concepts:
// - Arc<T>: Shares the fetcher and the seed state between spawned tasks
// - JoinSet: A group of spawned tasks we can await one by one
// - tokio::select!: Waits on several futures, runs the branch that finishes first
// - let-else: Pulls a value out of an Option or leaves the loop
// =============================================================================

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::CrawlRequest;
use crate::error::{CrawlError, FetchError};
use crate::page::{extract_page, CanonicalUrl, PageFetcher};

use super::visited::VisitedSet;

// A page waiting to be fetched
#[derive(Debug, Clone)]
struct CrawlItem {
    url: CanonicalUrl,
    depth: usize, // Link hops from the seed
}

/// A page that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub url: String,
    /// "network", "http-status", "too-large" or "content-type"
    pub kind: &'static str,
    pub message: String,
}

impl PageFailure {
    fn new(url: &CanonicalUrl, error: &FetchError) -> Self {
        Self {
            url: url.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Everything collected for one seed
#[derive(Debug, Clone, Default)]
pub struct SeedCrawl {
    /// Pages that were fetched successfully
    pub pages_fetched: usize,
    /// Text fragments of all pages, in completion order
    pub fragments: Vec<String>,
    pub failures: Vec<PageFailure>,
    /// True when the crawl was stopped before the queue drained
    pub cancelled: bool,
}

// State shared by the loop and every task of one seed
struct SeedState {
    origin: CanonicalUrl,
    visited: VisitedSet,
    accumulator: Mutex<Vec<String>>,
    max_depth: Option<usize>,
    strip_fragments: bool,
}

impl SeedState {
    fn canonical(&self, url: CanonicalUrl) -> CanonicalUrl {
        if self.strip_fragments {
            url.without_fragment()
        } else {
            url
        }
    }

    fn append(&self, fragments: Vec<String>) {
        self.accumulator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(fragments);
    }

    fn take_fragments(&self) -> Vec<String> {
        std::mem::take(&mut *self.accumulator.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

// What a finished task hands back to the loop
struct PageOutcome {
    failure: Option<PageFailure>,
    discovered: Vec<CrawlItem>,
}

/// Crawls every same-origin page reachable from `seed`
///
/// Only an unusable seed URL is an error. Page failures are recorded in the
/// returned SeedCrawl and the crawl carries on.
pub async fn crawl_seed(
    fetcher: Arc<PageFetcher>,
    seed: &str,
    request: &CrawlRequest,
    cancel: CancellationToken,
) -> Result<SeedCrawl, CrawlError> {
    let root = CanonicalUrl::parse_seed(seed)?;

    let state = Arc::new(SeedState {
        origin: root.clone(),
        visited: VisitedSet::with_limit(request.max_pages),
        accumulator: Mutex::new(Vec::new()),
        max_depth: request.max_depth,
        strip_fragments: request.strip_fragments,
    });

    // The seed counts as visited before anything else can claim it
    let root = state.canonical(root);
    state.visited.claim(&root);
    info!(seed = %root, "starting crawl");

    let mut queue = VecDeque::new();
    queue.push_back(CrawlItem {
        url: root.clone(),
        depth: 0,
    });

    let mut workers: JoinSet<PageOutcome> = JoinSet::new();
    let mut crawl = SeedCrawl::default();

    loop {
        // Checked first so a token cancelled up front starts no task at all
        if cancel.is_cancelled() {
            crawl.cancelled = true;
            break;
        }

        // Top up the pool from the queue
        while workers.len() < request.max_concurrency {
            let Some(item) = queue.pop_front() else {
                break;
            };
            workers.spawn(visit(Arc::clone(&state), Arc::clone(&fetcher), item));
        }

        // Empty queue and idle pool: the seed is done
        if workers.is_empty() {
            break;
        }

        // Wait for whichever comes first: a task finishing or cancellation
        tokio::select! {
            _ = cancel.cancelled() => {
                crawl.cancelled = true;
                break;
            }
            joined = workers.join_next() => match joined {
                Some(Ok(outcome)) => {
                    match outcome.failure {
                        Some(failure) => crawl.failures.push(failure),
                        None => crawl.pages_fetched += 1,
                    }
                    queue.extend(outcome.discovered);
                }
                Some(Err(e)) => warn!(seed = %root, "crawl task ended abnormally: {}", e),
                None => {}
            },
        }
    }

    if crawl.cancelled {
        // Aborting drops the in-flight requests along with their connections
        workers.shutdown().await;
        info!(seed = %root, pending = queue.len(), "crawl cancelled");
    }

    crawl.fragments = state.take_fragments();

    info!(
        seed = %root,
        pages = crawl.pages_fetched,
        claimed = state.visited.len(),
        failures = crawl.failures.len(),
        fragments = crawl.fragments.len(),
        "crawl finished"
    );

    Ok(crawl)
}

// Fetches one page, records its text and claims its links
async fn visit(state: Arc<SeedState>, fetcher: Arc<PageFetcher>, item: CrawlItem) -> PageOutcome {
    debug!(url = %item.url, depth = item.depth, "fetching page");

    let body = match fetcher.fetch(&item.url).await {
        Ok(body) => body,
        Err(e) => {
            warn!(url = %item.url, kind = e.kind(), "failed to fetch page: {}", e);
            return PageOutcome {
                failure: Some(PageFailure::new(&item.url, &e)),
                discovered: Vec::new(),
            };
        }
    };

    let page = extract_page(&body);
    state.append(page.fragments);

    // Pages at the depth limit still count, their links are just not followed
    let expand = state.max_depth.map_or(true, |max| item.depth < max);
    if !expand {
        return PageOutcome {
            failure: None,
            discovered: Vec::new(),
        };
    }

    // Resolve -> canonicalize -> keep same host -> claim
    // claim() returns true for exactly one caller, so no page is queued twice
    let discovered: Vec<CrawlItem> = page
        .links
        .iter()
        .filter_map(|href| item.url.resolve(href))
        .map(|url| state.canonical(url))
        .filter(|url| url.is_same_origin(&state.origin))
        .filter(|url| state.visited.claim(url))
        .map(|url| CrawlItem {
            url,
            depth: item.depth + 1,
        })
        .collect();

    debug!(url = %item.url, new_links = discovered.len(), "page done");

    PageOutcome {
        failure: None,
        discovered,
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does Arc::clone(&state) do?
//    - It makes a new pointer to the same SeedState, not a copy of it
//    - Each spawned task needs its own pointer because tasks must own their data
//    - The state is freed when the last pointer goes away
//
// 2. What does workers.join_next() return?
//    - Some(Ok(outcome)) = a task finished normally
//    - Some(Err(e)) = a task panicked or was aborted
//    - None = the set is empty
//
// 3. Why Mutex around the accumulator?
//    - Several tasks append text at the same time
//    - lock() lets only one of them touch the Vec at once
//    - unwrap_or_else(PoisonError::into_inner) keeps going even if a task
//      panicked while holding the lock
//
// 4. What is map_or(true, ...)?
//    - On an Option: None gives the default (true), Some(x) runs the closure
//    - Here None means "no depth limit", so every page is expanded
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request() -> CrawlRequest {
        CrawlRequest {
            timeout: Duration::from_secs(5),
            max_concurrency: 4,
            ..CrawlRequest::new(vec!["unused".to_string()], 10_000)
        }
    }

    fn fetcher(request: &CrawlRequest) -> Arc<PageFetcher> {
        Arc::new(PageFetcher::from_request(request).unwrap())
    }

    async fn html_page(
        server: &mut mockito::ServerGuard,
        path: &str,
        body: &str,
    ) -> mockito::Mock {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_failed_sibling_does_not_stop_crawl() {
        let mut server = mockito::Server::new_async().await;
        let root = html_page(
            &mut server,
            "/",
            r#"<a href="/missing">Missing</a><a href="/hello">Hi</a>"#,
        )
        .await;
        let missing = server
            .mock("GET", "/missing")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let hello = html_page(&mut server, "/hello", "<p>Hello</p>").await;

        let request = request();
        let crawl = crawl_seed(fetcher(&request), &server.url(), &request, CancellationToken::new())
            .await
            .unwrap();

        assert!(crawl.fragments.contains(&"Hello".to_string()));
        assert_eq!(crawl.pages_fetched, 2);
        assert_eq!(crawl.failures.len(), 1);
        assert_eq!(crawl.failures[0].kind, "http-status");
        assert!(crawl.failures[0].url.ends_with("/missing"));
        assert!(!crawl.cancelled);
        // Failures never leak into the text
        assert!(crawl.fragments.iter().all(|f| !f.contains("404")));

        root.assert_async().await;
        missing.assert_async().await;
        hello.assert_async().await;
    }

    #[tokio::test]
    async fn test_each_page_fetched_once_in_cycles() {
        let mut server = mockito::Server::new_async().await;
        let root = html_page(
            &mut server,
            "/",
            r#"<p>Root</p><a href="/a">A</a><a href="/b">B</a><a href="/">Home</a>"#,
        )
        .await;
        let a = html_page(
            &mut server,
            "/a",
            r#"<p>Page A</p><a href="/b">B</a><a href="/">Home</a>"#,
        )
        .await;
        let b = html_page(
            &mut server,
            "/b",
            r#"<p>Page B</p><a href="/a">A</a><a href="/">Home</a>"#,
        )
        .await;

        let request = request();
        let crawl = crawl_seed(fetcher(&request), &server.url(), &request, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(crawl.pages_fetched, 3);
        assert!(crawl.fragments.contains(&"Page A".to_string()));
        assert!(crawl.fragments.contains(&"Page B".to_string()));

        root.assert_async().await;
        a.assert_async().await;
        b.assert_async().await;
    }

    #[tokio::test]
    async fn test_cross_origin_links_not_followed() {
        let mut server = mockito::Server::new_async().await;
        // server.url() uses 127.0.0.1, so "localhost" is another host that
        // still routes to this server
        let foreign = server.url().replace("127.0.0.1", "localhost");
        let root = html_page(
            &mut server,
            "/",
            &format!(r#"<p>Home</p><a href="{}/y">Elsewhere</a>"#, foreign),
        )
        .await;
        let other = server
            .mock("GET", "/y")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let request = request();
        let crawl = crawl_seed(fetcher(&request), &server.url(), &request, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(crawl.pages_fetched, 1);
        root.assert_async().await;
        other.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_html_link_recorded_as_failure() {
        let mut server = mockito::Server::new_async().await;
        let root = html_page(
            &mut server,
            "/",
            r#"<p>Docs</p><a href="/manual.pdf">Manual</a>"#,
        )
        .await;
        let pdf = server
            .mock("GET", "/manual.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.4 binary stream")
            .expect(1)
            .create_async()
            .await;

        let request = request();
        let crawl = crawl_seed(fetcher(&request), &server.url(), &request, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(crawl.pages_fetched, 1);
        assert_eq!(crawl.failures.len(), 1);
        assert_eq!(crawl.failures[0].kind, "content-type");
        assert!(crawl.failures[0].url.ends_with("/manual.pdf"));
        assert!(crawl.fragments.iter().all(|f| !f.contains("%PDF")));

        root.assert_async().await;
        pdf.assert_async().await;
    }

    #[tokio::test]
    async fn test_max_pages_bounds_fetches() {
        let mut server = mockito::Server::new_async().await;
        let links: String = (1..=5)
            .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
            .collect();
        html_page(&mut server, "/", &links).await;
        server
            .mock("GET", mockito::Matcher::Regex(r"^/p\d$".to_string()))
            .with_status(200)
            .with_body("<p>Child</p>")
            .create_async()
            .await;

        let request = CrawlRequest {
            max_pages: 3,
            ..request()
        };
        let crawl = crawl_seed(fetcher(&request), &server.url(), &request, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(crawl.pages_fetched, 3);
    }

    #[tokio::test]
    async fn test_max_depth_zero_fetches_only_seed() {
        let mut server = mockito::Server::new_async().await;
        let root = html_page(&mut server, "/", r#"<p>Seed</p><a href="/child">C</a>"#).await;
        let child = server
            .mock("GET", "/child")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let request = CrawlRequest {
            max_depth: Some(0),
            ..request()
        };
        let crawl = crawl_seed(fetcher(&request), &server.url(), &request, CancellationToken::new())
            .await
            .unwrap();

        // The anchor text is part of the seed page; nothing else is fetched
        assert_eq!(crawl.fragments, vec!["Seed", "C"]);
        assert_eq!(crawl.pages_fetched, 1);
        root.assert_async().await;
        child.assert_async().await;
    }

    #[tokio::test]
    async fn test_strip_fragments_collapses_anchor_links() {
        let mut server = mockito::Server::new_async().await;
        // No content-type header: served pages are still read as HTML
        let root = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r##"<p>Top</p><a href="#one">1</a><a href="#two">2</a>"##)
            .expect(1)
            .create_async()
            .await;

        let request = CrawlRequest {
            strip_fragments: true,
            ..request()
        };
        let crawl = crawl_seed(fetcher(&request), &server.url(), &request, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(crawl.pages_fetched, 1);
        root.assert_async().await;
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let mut server = mockito::Server::new_async().await;
        let root = server
            .mock("GET", "/")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let request = request();
        let crawl = crawl_seed(fetcher(&request), &server.url(), &request, cancel)
            .await
            .unwrap();

        assert!(crawl.cancelled);
        assert_eq!(crawl.pages_fetched, 0);
        assert!(crawl.fragments.is_empty());
        root.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_seed_is_an_error() {
        let request = request();
        let result = crawl_seed(fetcher(&request), "ftp://example.com", &request, CancellationToken::new()).await;
        assert!(matches!(result, Err(CrawlError::InvalidUrl { .. })));
    }
}
