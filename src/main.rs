// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the corpus (stdout) and exit with the right code
//    (0 = all seeds crawled, 1 = a seed failed, 2 = error)
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod logging;
mod page;

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use cli::{Cli, Commands, CrawlArgs};
use crawl::{CorpusReport, Crawler, SeedCorpus};
use page::{extract_page, CanonicalUrl, PageFetcher, BROWSER_USER_AGENT};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Crawl(args) => handle_crawl(&args).await,
        Commands::Page {
            url,
            timeout_secs,
            json,
        } => handle_page(&url, timeout_secs, json).await,
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(args: &CrawlArgs) -> Result<i32> {
    let request = args.to_request();
    let crawler = Crawler::new();

    // Ctrl-C stops the crawl; whatever was collected is still printed
    let cancel = crawler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing with partial results");
            cancel.cancel();
        }
    });

    let report = crawler
        .crawl(&request)
        .await
        .context("crawl could not start")?;

    for seed in &report.seeds {
        log_seed_summary(seed);
    }

    print_report(&report, args.json)?;

    if report.all_seeds_ok() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn log_seed_summary(seed: &SeedCorpus) {
    match &seed.error {
        Some(error) => warn!(seed = %seed.seed, "seed failed: {}", error),
        None => info!(
            seed = %seed.seed,
            pages = seed.pages_fetched,
            failed_pages = seed.failures.len(),
            cancelled = seed.cancelled,
            "seed done"
        ),
    }
}

// Prints the corpus as plain text or the whole report as JSON
fn print_report(report: &CorpusReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if let Some(merged) = &report.merged {
        println!("{}", merged);
        return Ok(());
    }

    let with_headers = report.seeds.len() > 1;
    for seed in &report.seeds {
        let Some(corpus) = &seed.corpus else {
            continue;
        };
        if with_headers {
            println!("==> {} <==", seed.seed);
        }
        println!("{}", corpus);
    }
    Ok(())
}

// What `page --json` prints
#[derive(Debug, Serialize)]
struct PageDump {
    url: String,
    fragments: Vec<String>,
    links: Vec<String>,
}

// Handles the 'page' subcommand
async fn handle_page(raw_url: &str, timeout_secs: u64, json: bool) -> Result<i32> {
    let url = CanonicalUrl::parse_seed(raw_url)?;
    let fetcher = PageFetcher::new(
        Duration::from_secs(timeout_secs),
        BROWSER_USER_AGENT,
        config::DEFAULT_MAX_BODY_BYTES,
    )?;

    let body = fetcher
        .fetch(&url)
        .await
        .with_context(|| format!("failed to fetch {}", url))?;
    let content = extract_page(&body);

    let mut links: Vec<String> = content
        .links
        .iter()
        .filter_map(|href| url.resolve(href))
        .filter(|link| link.is_same_origin(&url))
        .map(|link| link.to_string())
        .collect();
    let mut seen = HashSet::new();
    links.retain(|link| seen.insert(link.clone()));

    let dump = PageDump {
        url: url.to_string(),
        fragments: content.fragments,
        links,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&dump)?);
    } else {
        for fragment in &dump.fragments {
            println!("{}", fragment);
        }
        println!();
        println!("Same-host links ({}):", dump.links.len());
        for link in &dump.links {
            println!("   {}", link);
        }
    }

    Ok(0)
}
