// src/crawl/visited.rs
// =============================================================================
// The set of URLs already claimed by one seed's crawl.
//
// claim() is the only way a URL gets fetched: a worker that discovers a
// link calls claim(), and only the caller that gets `true` back schedules
// the fetch. Every other caller drops the link.
//
// Each seed gets its own VisitedSet. Two seeds may both fetch the same page.
// =============================================================================

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::page::CanonicalUrl;

/// Claim registry for one seed's crawl, optionally capped at a page count
#[derive(Debug, Default)]
pub struct VisitedSet {
    claimed: Mutex<HashSet<String>>,
    limit: Option<usize>,
}

impl VisitedSet {
    /// A set that grants at most `limit` claims
    pub fn with_limit(limit: usize) -> Self {
        Self {
            claimed: Mutex::new(HashSet::new()),
            limit: Some(limit),
        }
    }

    /// Inserts the URL if it is new and the limit allows it
    ///
    /// Returns true only for the first caller to claim this URL.
    pub fn claim(&self, url: &CanonicalUrl) -> bool {
        // The guarded section never panics, so a poisoned lock still holds a
        // consistent set.
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);

        if claimed.contains(url.as_str()) {
            return false;
        }
        if let Some(limit) = self.limit {
            if claimed.len() >= limit {
                return false;
            }
        }
        claimed.insert(url.as_str().to_string())
    }

    /// Number of claims granted so far
    pub fn len(&self) -> usize {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does claim() take &self and not &mut self?
//    - Many tasks hold the same VisitedSet through an Arc
//    - An Arc only hands out shared references
//    - The Mutex gives us mutation through a shared reference
//
// 2. What is PoisonError::into_inner?
//    - If a thread panics while holding a std Mutex, the lock is "poisoned"
//    - lock() then returns Err, but the data is still inside
//    - into_inner() takes the guard out of the error so we can keep going
// -----------------------------------------------------------------------------
