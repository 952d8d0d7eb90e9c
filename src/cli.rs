// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - crawl: crawl one or more sites and print their text corpus
// - page: fetch a single page and print what the extractor sees
//
// Crawl flags map one-to-one onto CrawlRequest (see config.rs).
// =============================================================================

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{
    CrawlRequest, DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_CORPUS_CHARS,
    DEFAULT_MAX_PAGES, DEFAULT_TIMEOUT_SECS,
};

#[derive(Parser, Debug)]
#[command(
    name = "site-corpus",
    version = "0.1.0",
    about = "Crawl websites into a deduplicated, size-bounded text corpus",
    long_about = "site-corpus follows same-host links from each seed URL, extracts the visible \
                  text of every page, drops repeated paragraphs and cuts the result to a \
                  character budget. Useful for feeding a site's docs to another tool."
)]
pub struct Cli {
    /// Log every page fetch (same as RUST_LOG=site_corpus=debug)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl websites and print their text corpus
    ///
    /// Example: site-corpus crawl example.com docs.example.org --max-chars 20000
    Crawl(CrawlArgs),

    /// Fetch one page and print its text fragments and same-host links
    ///
    /// Example: site-corpus page https://example.com/docs
    Page {
        /// Page URL (https:// is added when no scheme is given)
        url: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,

        /// Output JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Seed URLs to crawl (https:// is added when no scheme is given)
    #[arg(required = true)]
    pub seeds: Vec<String>,

    /// Maximum characters per corpus
    #[arg(long, env = "SITE_CORPUS_MAX_CHARS", default_value_t = DEFAULT_MAX_CORPUS_CHARS)]
    pub max_chars: usize,

    /// Page fetches in flight per seed
    #[arg(long, env = "SITE_CORPUS_CONCURRENCY", default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Maximum pages fetched per seed
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Maximum link hops from the seed (0 = seed page only)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Stop the whole crawl after this many seconds and print what was found
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Treat links that differ only by #fragment as the same page
    #[arg(long)]
    pub strip_fragments: bool,

    /// Largest accepted page body, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: u64,

    /// Print one corpus for all seeds instead of one per seed
    #[arg(long)]
    pub merged: bool,

    /// Custom User-Agent header
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Output a JSON report instead of plain text
    #[arg(long)]
    pub json: bool,
}

impl CrawlArgs {
    pub fn to_request(&self) -> CrawlRequest {
        CrawlRequest {
            seeds: self.seeds.clone(),
            max_corpus_chars: self.max_chars,
            max_concurrency: self.concurrency,
            timeout: Duration::from_secs(self.timeout_secs),
            max_pages: self.max_pages,
            max_depth: self.max_depth,
            deadline: self.deadline_secs.map(Duration::from_secs),
            strip_fragments: self.strip_fragments,
            max_body_bytes: self.max_body_bytes,
            merged: self.merged,
            user_agent: self.user_agent.clone(),
        }
    }
}
