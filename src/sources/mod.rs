//! Source collection pipeline
//!
//! Runs every configured source and merges the results into the URL list
//! handed to the document loader:
//! - each website is crawled within its own base domain
//! - each GitHub repository is walked for README pages
//!
//! All sources share one HTTP client, one rate limiter and one robots cache,
//! so the request budget holds across the whole run. Websites share the
//! visited-state file; pending URLs are only resumed by the site they belong to.

use crate::config::Config;
use crate::crawler::{build_http_client, Coordinator, LinkFetcher, RateLimiter, RepoWalker};
use crate::output::write_url_list;
use crate::storage::JsonFileStorage;
use crate::url::{base_domain, is_valid};
use crate::CrawlError;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::{Duration, Instant};

/// Kind of a configured source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Website,
    Repository,
}

/// URLs contributed by one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCount {
    pub kind: SourceKind,
    pub source: String,
    pub urls: usize,
}

/// Result of a full collection run
#[derive(Debug, Clone)]
pub struct SourceSummary {
    pub sources: Vec<SourceCount>,
    /// Distinct URLs written to the output list
    pub total: usize,
    pub elapsed: Duration,
}

/// Crawls every website, walks every repository and writes the merged list
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fresh` - Discard persisted crawl state before starting
///
/// # Returns
///
/// * `Ok(SourceSummary)` - Per-source counts and the merged total
/// * `Err(CrawlError)` - The client could not be built, the persisted state
///   could not be cleared, or the URL list could not be written
pub async fn collect_sources(config: &Config, fresh: bool) -> Result<SourceSummary, CrawlError> {
    let started = Instant::now();
    let timeout = config.crawler.request_timeout();
    let client = build_http_client(&config.user_agent, timeout)?;
    let limiter = RateLimiter::from_config(&config.crawler);

    let storage = JsonFileStorage::new(&config.output.visited_path);
    if fresh {
        tracing::info!("Discarding crawl state at {}", storage.visited_path().display());
        storage.clear()?;
    }

    let fetcher = LinkFetcher::with_client(config, client.clone(), limiter.clone());
    let mut coordinator = Coordinator::new(
        fetcher,
        storage,
        config.crawler.max_concurrent_fetches as usize,
    );

    let mut merged = BTreeSet::new();
    let mut sources = Vec::new();

    for website in &config.sources.websites {
        let domain = match base_domain(website) {
            Ok(domain) => domain,
            Err(e) => {
                tracing::error!("Skipping website {}: {}", website, e);
                continue;
            }
        };

        tracing::info!("Crawling website {}", website);
        let visited = coordinator.crawl(website, &domain).await;
        let site_urls: Vec<String> = visited
            .into_iter()
            .filter(|url| is_valid(url, &domain, &config.crawler.blocked_extensions))
            .collect();

        sources.push(SourceCount {
            kind: SourceKind::Website,
            source: website.clone(),
            urls: site_urls.len(),
        });
        merged.extend(site_urls);
    }

    let walker = RepoWalker::from_config(config, client, limiter);
    for repository in &config.sources.repositories {
        tracing::info!("Walking repository {}", repository);
        let readmes = walker.readme_urls(repository).await;

        sources.push(SourceCount {
            kind: SourceKind::Repository,
            source: repository.clone(),
            urls: readmes.len(),
        });
        merged.extend(readmes);
    }

    let urls: Vec<String> = merged.into_iter().collect();
    write_url_list(Path::new(&config.output.urls_path), &urls)?;

    let summary = SourceSummary {
        sources,
        total: urls.len(),
        elapsed: started.elapsed(),
    };
    tracing::info!(
        "Collected {} URLs from {} sources in {:.2?}",
        summary.total,
        summary.sources.len(),
        summary.elapsed
    );
    Ok(summary)
}
