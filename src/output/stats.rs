//! Statistics generation from persisted crawl state
//!
//! This module provides functionality for extracting and displaying
//! statistics from the storage layer.

use crate::state::CrawlState;
use crate::storage::Storage;
use crate::CrawlError;
use std::collections::BTreeMap;
use url::Url;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Total number of URLs claimed so far
    pub visited: usize,

    /// URLs claimed but not yet expanded (left by an interrupted crawl)
    pub pending: usize,

    /// Visited URL count per host
    pub hosts: BTreeMap<String, usize>,
}

impl CrawlStatistics {
    /// Computes statistics for a crawl state
    pub fn from_state(state: &CrawlState) -> Self {
        let mut hosts = BTreeMap::new();
        for url in state.visited.iter() {
            let host = Url::parse(url)
                .ok()
                .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
                .unwrap_or_else(|| "(unparseable)".to_string());
            *hosts.entry(host).or_insert(0) += 1;
        }

        Self {
            visited: state.visited.len(),
            pending: state.pending.len(),
            hosts,
        }
    }

    /// URLs whose expansion has finished
    pub fn completed(&self) -> usize {
        self.visited.saturating_sub(self.pending)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to read
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(CrawlError)` - The persisted state could not be read
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics, CrawlError> {
    let state = storage.load()?;
    Ok(CrawlStatistics::from_state(&state))
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Visited URLs: {}", stats.visited);
    println!("  Completed: {}", stats.completed());
    println!("  Pending: {}", stats.pending);
    println!("  Unique hosts: {}", stats.hosts.len());
    println!();

    if !stats.hosts.is_empty() {
        println!("URLs by Host:");
        // Sort hosts by count (descending)
        let mut host_counts: Vec<_> = stats.hosts.iter().collect();
        host_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (host, count) in host_counts {
            let percentage = (*count as f64 / stats.visited as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", host, count, percentage);
        }
        println!();
    }

    if stats.pending > 0 {
        println!(
            "{} URLs are pending; the next run resumes them",
            stats.pending
        );
    }
}
