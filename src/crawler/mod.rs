//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Shared rolling-window rate limiting
//! - Robots-aware HTTP fetching and link extraction
//! - Bounded concurrent crawl coordination with resumable state
//! - README discovery in GitHub repositories

mod coordinator;
mod fetcher;
mod parser;
mod rate_limiter;
mod repository;

pub use coordinator::{Coordinator, CrawlProgress};
pub use fetcher::{build_http_client, FetchOutcome, LinkFetcher};
pub use parser::extract_links;
pub use rate_limiter::RateLimiter;
pub use repository::{parse_repo_url, RepoEntry, RepoWalker};

use crate::config::Config;
use crate::state::VisitedSet;
use crate::storage::JsonFileStorage;
use crate::url::base_domain;
use crate::CrawlError;

/// Crawls one website using the configured state file
///
/// The base domain is the seed's host. A seed that is not an absolute
/// http/https URL yields an empty set without any network access.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The URL to start from
/// * `fresh` - Ignore previously persisted state
///
/// # Returns
///
/// * `Ok(VisitedSet)` - Every URL visited in this and earlier runs
/// * `Err(CrawlError)` - The HTTP client could not be built
pub async fn crawl_site(
    config: &Config,
    seed: &str,
    fresh: bool,
) -> Result<VisitedSet, CrawlError> {
    let domain = match base_domain(seed) {
        Ok(domain) => domain,
        Err(e) => {
            tracing::error!("Invalid seed URL {}: {}", seed, e);
            return Ok(VisitedSet::new());
        }
    };

    let fetcher = LinkFetcher::from_config(config)?;
    let storage = JsonFileStorage::new(&config.output.visited_path);
    let mut coordinator =
        Coordinator::new(fetcher, storage, config.crawler.max_concurrent_fetches as usize)
            .fresh(fresh);

    Ok(coordinator.crawl(seed, &domain).await)
}
