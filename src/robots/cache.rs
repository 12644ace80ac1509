//! Per-host robots.txt cache
//!
//! Each host's robots.txt is fetched lazily, at most once per run (or again
//! once the cached copy is older than 24 hours). Concurrent first requests
//! for the same host share one fetch.

use crate::robots::{fetch_robots, robots_url_for, ParsedRobots};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use url::Url;

/// Cached robots.txt data for a host
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt content
    pub content: ParsedRobots,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the cached robots.txt is older than 24 hours
    pub fn is_stale(&self) -> bool {
        self.age() > Duration::hours(24)
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        self.content.is_allowed(url, user_agent)
    }
}

type Slot = Arc<OnceCell<CachedRobots>>;

/// Lazily populated robots.txt rules keyed by `scheme://host[:port]`
#[derive(Debug)]
pub struct RobotsCache {
    client: Client,
    agent: String,
    timeout: std::time::Duration,
    entries: Mutex<HashMap<String, Slot>>,
}

impl RobotsCache {
    /// Creates an empty cache
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for robots.txt requests
    /// * `agent` - User agent token evaluated against robots groups (`*` for the global group)
    /// * `timeout` - Timeout for each robots.txt request
    pub fn new(client: Client, agent: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self {
            client,
            agent: agent.into(),
            timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Checks whether `url` may be fetched
    ///
    /// Fails open: a URL that cannot be parsed, or a host whose robots.txt
    /// cannot be retrieved, is allowed.
    pub async fn is_allowed(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Cannot derive robots.txt for {}: {}", url, e);
                return true;
            }
        };

        let robots_url = match robots_url_for(&parsed) {
            Some(robots_url) => robots_url,
            None => {
                tracing::warn!("Cannot derive robots.txt for {}: no host", url);
                return true;
            }
        };

        let slot = self.slot_for(robots_url.as_str());
        let cached = slot
            .get_or_init(|| async {
                let robots = fetch_robots(&self.client, &robots_url, self.timeout).await;
                tracing::debug!(
                    "Cached {} ({})",
                    robots_url,
                    if robots.allows_everything() { "allow all" } else { "rules" }
                );
                if let Some(delay) = robots.crawl_delay(&self.agent) {
                    tracing::debug!("{} asks for a crawl delay of {}s", robots_url, delay);
                }
                CachedRobots::new(robots)
            })
            .await;

        let allowed = cached.is_allowed(url, &self.agent);
        if !allowed {
            tracing::debug!("robots.txt disallows {}", url);
        }
        allowed
    }

    /// Number of hosts with a robots.txt entry
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot_for(&self, key: &str) -> Slot {
        let mut entries = self.lock_entries();

        let stale = entries
            .get(key)
            .and_then(|slot| slot.get())
            .map(CachedRobots::is_stale)
            .unwrap_or(false);
        if stale {
            entries.remove(key);
        }

        entries.entry(key.to_string()).or_default().clone()
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
