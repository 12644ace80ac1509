use crate::state::VisitedSet;
use std::collections::BTreeSet;

/// Progress of a crawl as persisted between runs
///
/// `pending` holds claimed URLs whose link expansion has not finished yet.
/// A crawl interrupted mid-way leaves them here so the next run can expand
/// them instead of treating them as done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlState {
    pub visited: VisitedSet,
    pub pending: BTreeSet<String>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state with every URL already expanded
    pub fn from_visited(visited: VisitedSet) -> Self {
        Self {
            visited,
            pending: BTreeSet::new(),
        }
    }

    /// Claims `url` for fetching
    ///
    /// Returns false, and changes nothing, when the URL was already claimed.
    /// Check and insert happen in one call so no other claim can interleave.
    pub fn claim(&mut self, url: &str) -> bool {
        if !self.visited.insert(url) {
            return false;
        }
        self.pending.insert(url.to_string());
        true
    }

    /// Marks the link expansion of `url` as finished
    pub fn complete(&mut self, url: &str) {
        self.pending.remove(url);
    }

    /// Pending URLs accepted by `keep`, in sorted order
    pub fn pending_matching(&self, keep: impl Fn(&str) -> bool) -> Vec<String> {
        self.pending
            .iter()
            .filter(|url| keep(url.as_str()))
            .cloned()
            .collect()
    }
}
