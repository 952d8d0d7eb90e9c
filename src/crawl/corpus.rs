// src/crawl/corpus.rs
// =============================================================================
// Turns crawled fragments into the final corpus.
//
// Steps:
// 1. Walk fragments in the order they were collected
// 2. Keep the first occurrence of each exact fragment, drop repeats
// 3. Join the survivors with single spaces
// 4. Cut the result at the character budget
//
// The cut is a plain character cut; it may end mid-fragment.
// =============================================================================

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CrawlError;
use crate::page::normalize_whitespace;

use super::queue::{PageFailure, SeedCrawl};

/// Deduplicates, joins and truncates fragments
///
/// Example:
///   fragments = ["A", "B", "A", "C"], max_chars = 100
///   result    = "A B C"
pub fn assemble<I, S>(fragments: I, max_chars: usize) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut kept = Vec::new();

    for fragment in fragments {
        let fragment = normalize_whitespace(fragment.as_ref());
        if fragment.is_empty() {
            continue;
        }
        if seen.insert(fragment.clone()) {
            kept.push(fragment);
        }
    }

    let mut corpus = kept.join(" ");
    truncate_chars(&mut corpus, max_chars);
    corpus
}

/// Shortens a string to at most `max_chars` characters, in place
pub fn truncate_chars(text: &mut String, max_chars: usize) {
    if let Some((byte_index, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_index);
    }
}

/// Outcome of one seed, ready to print or serialize
#[derive(Debug, Clone, Serialize)]
pub struct SeedCorpus {
    pub seed: String,
    /// None when the seed failed outright or the report is merged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus: Option<String>,
    pub pages_fetched: usize,
    pub failures: Vec<PageFailure>,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SeedCorpus {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything a crawl produced
#[derive(Debug, Clone, Serialize)]
pub struct CorpusReport {
    pub seeds: Vec<SeedCorpus>,
    /// Single corpus across all seeds, in merged mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged: Option<String>,
}

impl CorpusReport {
    /// Builds the report from per-seed crawl results
    ///
    /// In merged mode the fragments of all seeds are deduplicated together,
    /// in seed order, and only `merged` carries text.
    pub fn build(
        results: Vec<(String, Result<SeedCrawl, CrawlError>)>,
        max_chars: usize,
        merged: bool,
    ) -> Self {
        let mut seeds = Vec::with_capacity(results.len());
        let mut all_fragments = Vec::new();

        for (seed, result) in results {
            match result {
                Ok(crawl) => {
                    let corpus = if merged {
                        all_fragments.extend(crawl.fragments);
                        None
                    } else {
                        Some(assemble(&crawl.fragments, max_chars))
                    };
                    seeds.push(SeedCorpus {
                        seed,
                        corpus,
                        pages_fetched: crawl.pages_fetched,
                        failures: crawl.failures,
                        cancelled: crawl.cancelled,
                        error: None,
                    });
                }
                Err(e) => seeds.push(SeedCorpus {
                    seed,
                    corpus: None,
                    pages_fetched: 0,
                    failures: Vec::new(),
                    cancelled: false,
                    error: Some(e.to_string()),
                }),
            }
        }

        let merged = merged.then(|| assemble(&all_fragments, max_chars));

        Self { seeds, merged }
    }

    /// Whether every seed could at least be started
    pub fn all_seeds_ok(&self) -> bool {
        self.seeds.iter().all(SeedCorpus::is_ok)
    }
}
