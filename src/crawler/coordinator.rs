//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop. It coordinates:
//! - Loading persisted progress and resuming interrupted expansions
//! - Claiming URLs before they are fetched
//! - Running a bounded number of page fetches concurrently
//! - Persisting progress after every expanded page
//!
//! The coordinator task is the only owner of the crawl state. Fetch tasks
//! return their links to it instead of touching the visited set, so claiming
//! a URL is a single synchronous check-and-insert.

use crate::crawler::fetcher::{FetchOutcome, LinkFetcher};
use crate::state::{CrawlState, VisitedSet};
use crate::storage::Storage;
use crate::url::{is_valid, normalize, parse_http_url};
use std::collections::VecDeque;
use std::time::Instant;
use tokio::task::JoinSet;

/// Counters reported at the end of a crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlProgress {
    /// Pages fetched successfully
    pub fetched: usize,
    /// Pages skipped because robots.txt disallows them
    pub blocked: usize,
    /// Pages whose fetch failed
    pub failed: usize,
    /// Fetch tasks that panicked
    pub aborted: usize,
    /// URLs claimed during this crawl, seed included
    pub discovered: usize,
}

impl CrawlProgress {
    fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Links(_) => self.fetched += 1,
            FetchOutcome::Blocked => self.blocked += 1,
            FetchOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.fetched + self.blocked + self.failed + self.aborted
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<S: Storage> {
    fetcher: LinkFetcher,
    storage: S,
    max_concurrent: usize,
    fresh: bool,
    last_progress: CrawlProgress,
}

impl<S: Storage> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetcher used for every page
    /// * `storage` - Backend the crawl state is loaded from and saved to
    /// * `max_concurrent` - Maximum number of page fetches in flight (at least one)
    pub fn new(fetcher: LinkFetcher, storage: S, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            storage,
            max_concurrent: max_concurrent.max(1),
            fresh: false,
            last_progress: CrawlProgress::default(),
        }
    }

    /// Ignore persisted state and start from an empty visited set
    pub fn fresh(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Counters from the most recent crawl
    pub fn last_progress(&self) -> CrawlProgress {
        self.last_progress
    }

    /// Crawls every page reachable from `seed` within `base_domain`
    ///
    /// # Crawl Flow
    ///
    /// 1. Reject a seed that is not an absolute http/https URL (empty result,
    ///    no network access)
    /// 2. Load persisted state; missing or corrupt state starts empty
    /// 3. Re-queue pending URLs of an interrupted run that belong to `base_domain`
    /// 4. Claim the normalized seed; if it was already visited and nothing is
    ///    pending, return the visited set unchanged
    /// 5. Keep up to `max_concurrent` fetches running; claim each newly
    ///    discovered link and queue it
    /// 6. Persist after every expanded page and once more at the end
    ///
    /// Always returns the full visited set (including URLs from earlier runs).
    pub async fn crawl(&mut self, seed: &str, base_domain: &str) -> VisitedSet {
        self.last_progress = CrawlProgress::default();

        let seed_url = match parse_http_url(seed) {
            Ok(seed_url) => seed_url,
            Err(e) => {
                tracing::error!("Invalid seed URL {}: {}", seed, e);
                return VisitedSet::new();
            }
        };

        let started = Instant::now();
        let base_domain = base_domain.to_lowercase();
        let mut state = self.load_state();
        let mut progress = CrawlProgress::default();

        let mut queue: VecDeque<String> = state
            .pending_matching(|url| {
                is_valid(url, &base_domain, self.fetcher.blocked_extensions())
            })
            .into();
        if !queue.is_empty() {
            tracing::info!(
                "Resuming {} pending URLs from an interrupted crawl",
                queue.len()
            );
        }

        let seed = normalize(seed_url.as_str());
        if state.claim(&seed) {
            progress.discovered += 1;
            queue.push_back(seed);
        } else if queue.is_empty() {
            tracing::info!("{} already visited, nothing to crawl", seed);
            return state.visited;
        }

        tracing::info!("Crawling {} within {}", seed_url, base_domain);

        let mut tasks: JoinSet<(String, FetchOutcome)> = JoinSet::new();
        loop {
            while tasks.len() < self.max_concurrent {
                let Some(url) = queue.pop_front() else {
                    break;
                };
                let fetcher = self.fetcher.clone();
                let base = base_domain.clone();
                tasks.spawn(async move {
                    let outcome = fetcher.fetch_links(&url, &base).await;
                    (url, outcome)
                });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            match joined {
                Ok((url, outcome)) => {
                    progress.record(&outcome);
                    if let FetchOutcome::Failed(reason) = &outcome {
                        tracing::debug!("No links from {}: {}", url, reason);
                    }

                    for link in outcome.into_links() {
                        if state.claim(&link) {
                            progress.discovered += 1;
                            queue.push_back(link);
                        }
                    }
                    state.complete(&url);
                    self.persist(&state);
                }
                Err(e) => {
                    // The URL stays pending and is retried by the next run.
                    progress.aborted += 1;
                    tracing::error!("Fetch task aborted: {}", e);
                }
            }

            if progress.processed() % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages processed, {} queued, {} in flight",
                    progress.processed(),
                    queue.len(),
                    tasks.len()
                );
            }
        }

        self.persist(&state);
        self.last_progress = progress;

        tracing::info!(
            "Crawl of {} finished in {:.2?}: {} fetched, {} blocked, {} failed, {} visited in total",
            base_domain,
            started.elapsed(),
            progress.fetched,
            progress.blocked,
            progress.failed,
            state.visited.len()
        );

        state.visited
    }

    fn load_state(&self) -> CrawlState {
        if self.fresh {
            return CrawlState::new();
        }

        match self.storage.load() {
            Ok(state) => {
                tracing::debug!(
                    "Loaded {} visited and {} pending URLs",
                    state.visited.len(),
                    state.pending.len()
                );
                state
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable crawl state: {}", e);
                CrawlState::new()
            }
        }
    }

    fn persist(&mut self, state: &CrawlState) {
        if let Err(e) = self.storage.save(state) {
            tracing::warn!("Failed to persist crawl state: {}", e);
        }
    }
}
