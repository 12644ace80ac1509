//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Robots.txt checks before every page fetch
//! - Rate-limited GET requests with a per-request timeout
//! - Turning a page into its normalized, in-domain outgoing links
//! - Error classification into a typed outcome

use crate::config::{Config, UserAgentConfig};
use crate::crawler::parser::extract_links;
use crate::crawler::rate_limiter::RateLimiter;
use crate::robots::RobotsCache;
use crate::url::{is_valid, normalize};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Result of expanding one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was fetched; these are its surviving links (possibly none)
    Links(Vec<String>),

    /// robots.txt disallows the page
    Blocked,

    /// The fetch failed (network error, timeout, non-200 status, unreadable body)
    Failed(String),
}

impl FetchOutcome {
    /// Links discovered on the page; empty unless the fetch succeeded
    pub fn links(&self) -> &[String] {
        match self {
            Self::Links(links) => links,
            Self::Blocked | Self::Failed(_) => &[],
        }
    }

    pub fn into_links(self) -> Vec<String> {
        match self {
            Self::Links(links) => links,
            Self::Blocked | Self::Failed(_) => Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Links(_))
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use polite_crawl::config::UserAgentConfig;
/// use polite_crawl::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "PoliteCrawl".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited, robots-aware page link fetcher
///
/// Cloning is cheap; clones share the HTTP client, rate limiter, and robots
/// cache.
#[derive(Debug, Clone)]
pub struct LinkFetcher {
    client: Client,
    limiter: RateLimiter,
    robots: Arc<RobotsCache>,
    timeout: Duration,
    blocked_extensions: Arc<[String]>,
}

impl LinkFetcher {
    pub fn new(
        client: Client,
        limiter: RateLimiter,
        robots: Arc<RobotsCache>,
        timeout: Duration,
        blocked_extensions: Vec<String>,
    ) -> Self {
        Self {
            client,
            limiter,
            robots,
            timeout,
            blocked_extensions: blocked_extensions.into(),
        }
    }

    /// Builds a fetcher with its own client, limiter, and robots cache
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let timeout = config.crawler.request_timeout();
        let client = build_http_client(&config.user_agent, timeout)?;
        let limiter = RateLimiter::from_config(&config.crawler);
        Ok(Self::with_client(config, client, limiter))
    }

    /// Builds a fetcher around an existing client and limiter
    pub fn with_client(config: &Config, client: Client, limiter: RateLimiter) -> Self {
        let timeout = config.crawler.request_timeout();
        let robots = RobotsCache::new(client.clone(), &config.crawler.robots_agent, timeout);
        Self::new(
            client,
            limiter,
            Arc::new(robots),
            timeout,
            config.crawler.blocked_extensions.clone(),
        )
    }

    pub fn blocked_extensions(&self) -> &[String] {
        &self.blocked_extensions
    }

    /// Fetches a page and returns its in-domain links
    ///
    /// # Request Flow
    ///
    /// 1. Wait for a rate-limiter slot (one slot per call)
    /// 2. Check robots.txt → `Blocked` if disallowed
    /// 3. GET the page → `Failed` on error or any status other than 200
    /// 4. Skip bodies whose `Content-Type` is present and not HTML
    /// 5. Extract `<a href>` targets, resolve against the page URL after
    ///    redirects, normalize, keep those passing [`is_valid`]
    /// 6. Drop duplicates within this page, keeping first-seen order
    ///
    /// Never returns an error: one bad page cannot abort a crawl.
    pub async fn fetch_links(&self, url: &str, base_domain: &str) -> FetchOutcome {
        self.limiter.acquire().await;
        let started = Instant::now();

        if !self.robots.is_allowed(url).await {
            tracing::info!("Crawling disallowed by robots.txt: {}", url);
            return FetchOutcome::Blocked;
        }

        let page_url = match Url::parse(url) {
            Ok(page_url) => page_url,
            Err(e) => {
                tracing::error!("Failed to fetch {}: {}", url, e);
                return FetchOutcome::Failed(format!("Invalid URL: {}", e));
            }
        };

        let response = match self
            .client
            .get(page_url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let reason = describe_error(&e);
                tracing::error!("Failed to fetch {}: {}", url, reason);
                return FetchOutcome::Failed(reason);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::error!("Failed to fetch {}: HTTP {}", url, status.as_u16());
            return FetchOutcome::Failed(format!("HTTP {}", status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        if !is_html_content_type(content_type) {
            tracing::debug!(
                "Skipping non-HTML body of {} ({})",
                url,
                content_type.unwrap_or_default()
            );
            return FetchOutcome::Links(Vec::new());
        }

        let final_url = response.url().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let reason = describe_error(&e);
                tracing::error!("Failed to read {}: {}", url, reason);
                return FetchOutcome::Failed(reason);
            }
        };

        let mut seen = HashSet::new();
        let links: Vec<String> = extract_links(&body, &final_url)
            .into_iter()
            .map(|link| normalize(&link))
            .filter(|link| is_valid(link, base_domain, &self.blocked_extensions[..]))
            .filter(|link| seen.insert(link.clone()))
            .collect();

        tracing::debug!(
            "Fetched {} links from {} in {:.2?}",
            links.len(),
            url,
            started.elapsed()
        );
        FetchOutcome::Links(links)
    }
}

/// Classifies a reqwest error into a short reason
/// A missing header is treated as HTML
fn is_html_content_type(content_type: Option<&str>) -> bool {
    content_type.map_or(true, |value| value.to_ascii_lowercase().contains("html"))
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}
