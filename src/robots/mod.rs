//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Unavailable robots.txt files fail open: crawl completeness wins over strict
//! compliance when the rules cannot be read.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::ParsedRobots;

use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Derives `scheme://host[:port]/robots.txt` for a page URL
///
/// Returns None for URLs without a host.
///
/// # Examples
///
/// ```
/// use polite_crawl::robots::robots_url_for;
/// use url::Url;
///
/// let page = Url::parse("https://aws.amazon.com/ec2/pricing?x=1").unwrap();
/// assert_eq!(robots_url_for(&page).unwrap().as_str(), "https://aws.amazon.com/robots.txt");
/// ```
pub fn robots_url_for(url: &Url) -> Option<Url> {
    url.host_str()?;
    url.join("/robots.txt").ok()
}

/// Fetches and parses a robots.txt file
///
/// Anything other than HTTP 200 with a readable body yields
/// [`ParsedRobots::allow_all`], logged as a warning.
pub async fn fetch_robots(client: &Client, robots_url: &Url, timeout: Duration) -> ParsedRobots {
    let response = match client
        .get(robots_url.clone())
        .timeout(timeout)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Error fetching {}: {}", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    if response.status() != StatusCode::OK {
        tracing::warn!(
            "Could not fetch {}: HTTP {}",
            robots_url,
            response.status().as_u16()
        );
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::warn!("Error reading {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}
