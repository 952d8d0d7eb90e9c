// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling and corpus assembly.
//
// Features:
// - Every seed is crawled concurrently, each with its own visited set
// - Only same-host links are followed
// - A bounded number of fetches in flight per seed
// - Optional overall deadline, plus external cancellation (Ctrl-C)
// - Per-seed or merged corpus, deduplicated and cut to a character budget
//
// Submodules:
// - visited: the claim-once URL registry
// - queue: the per-seed crawl loop
// - corpus: deduplication, joining and truncation
// =============================================================================

mod corpus;
mod queue;
mod visited;

use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::CrawlRequest;
use crate::error::CrawlError;
use crate::page::PageFetcher;

pub use corpus::{CorpusReport, SeedCorpus};

use queue::crawl_seed;

/// Entry point for crawls
///
/// A Crawler holds no per-crawl state, so one value can serve many
/// concurrent crawl() calls. Cancelling its token stops all of them.
#[derive(Debug, Clone, Default)]
pub struct Crawler {
    cancel: CancellationToken,
}

impl Crawler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that stops every crawl started from this Crawler
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls all seeds of the request and assembles their corpora
    ///
    /// Fails only when the request itself is invalid or the HTTP client
    /// cannot be built. A bad seed is reported inside the CorpusReport.
    pub async fn crawl(&self, request: &CrawlRequest) -> Result<CorpusReport, CrawlError> {
        request.validate()?;

        let fetcher = Arc::new(PageFetcher::from_request(request)?);
        let cancel = self.cancel.child_token();

        let deadline = request.deadline.map(|limit| {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                info!(?limit, "crawl deadline reached");
                cancel.cancel();
            })
        });

        let crawls = request.seeds.iter().map(|seed| {
            let fetcher = Arc::clone(&fetcher);
            let cancel = cancel.clone();
            async move {
                let result = crawl_seed(fetcher, seed, request, cancel).await;
                (seed.clone(), result)
            }
        });
        let results = join_all(crawls).await;

        if let Some(timer) = deadline {
            timer.abort();
        }

        Ok(CorpusReport::build(
            results,
            request.max_corpus_chars,
            request.merged,
        ))
    }
}
