//! GitHub repository README discovery
//!
//! Strategy:
//! - Parse the repository URL into owner and name
//! - List the repository root through the contents API
//! - Collect README files, recurse into sub-folders concurrently up to the
//!   configured depth
//! - Flatten every README page link into one list
//!
//! Repositories are trees, so no visited set is needed. Every listing request
//! goes through the shared rate limiter. A folder that cannot be listed
//! contributes nothing; the rest of the walk continues.

use crate::config::Config;
use crate::crawler::rate_limiter::RateLimiter;
use crate::{CrawlError, UrlError, UrlResult};
use futures::future::{join_all, BoxFuture, FutureExt};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const GITHUB_JSON: &str = "application/vnd.github+json";

/// One entry of a contents API directory listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl RepoEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == "dir"
    }

    /// True for files named `README` or `README.<ext>`, in any case
    pub fn is_readme(&self) -> bool {
        if self.is_dir() {
            return false;
        }
        let name = self.name.to_ascii_lowercase();
        name == "readme" || name.starts_with("readme.")
    }
}

/// Parses a GitHub repository URL into `(owner, repo)`
///
/// Supported formats:
/// - `https://github.com/owner/repo`
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo/tree/main/docs` (extra segments ignored)
/// - `github.com/owner/repo`
///
/// # Examples
///
/// ```
/// use polite_crawl::crawler::parse_repo_url;
///
/// let (owner, repo) = parse_repo_url("https://github.com/aws-samples/aws-cdk-examples.git").unwrap();
/// assert_eq!((owner.as_str(), repo.as_str()), ("aws-samples", "aws-cdk-examples"));
/// ```
pub fn parse_repo_url(repo_url: &str) -> UrlResult<(String, String)> {
    let url = Url::parse(repo_url)
        .or_else(|_| Url::parse(&format!("https://{}", repo_url)))
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    if host != "github.com" && host != "www.github.com" {
        return Err(UrlError::NotARepository(repo_url.to_string()));
    }

    let mut segments = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty());

    match (segments.next(), segments.next()) {
        (Some(owner), Some(repo)) => {
            let repo = repo.trim_end_matches(".git");
            if repo.is_empty() {
                return Err(UrlError::NotARepository(repo_url.to_string()));
            }
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(UrlError::NotARepository(repo_url.to_string())),
    }
}

/// Walks a repository's folders collecting README page links
#[derive(Debug, Clone)]
pub struct RepoWalker {
    client: Client,
    limiter: RateLimiter,
    api_base: String,
    max_depth: u32,
    timeout: Duration,
}

impl RepoWalker {
    pub fn new(
        client: Client,
        limiter: RateLimiter,
        api_base: impl Into<String>,
        max_depth: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            limiter,
            api_base: api_base.into(),
            max_depth,
            timeout,
        }
    }

    /// Builds a walker sharing an existing client and limiter
    pub fn from_config(config: &Config, client: Client, limiter: RateLimiter) -> Self {
        Self::new(
            client,
            limiter,
            &config.github.api_base,
            config.github.max_depth,
            config.crawler.request_timeout(),
        )
    }

    /// Collects the README links of a repository
    ///
    /// An unparseable repository URL or an unreachable root yields an empty
    /// list; the failure is logged.
    pub async fn readme_urls(&self, repo_url: &str) -> Vec<String> {
        let (owner, repo) = match parse_repo_url(repo_url) {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!("Skipping repository {}: {}", repo_url, e);
                return Vec::new();
            }
        };

        let readmes = self.walk(&owner, &repo, String::new(), 0).await;
        tracing::info!("Found {} README pages in {}/{}", readmes.len(), owner, repo);
        readmes
    }

    fn walk<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        path: String,
        depth: u32,
    ) -> BoxFuture<'a, Vec<String>> {
        async move {
            let entries = match self.list_directory(owner, repo, &path).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::error!("Failed to list {}/{}/{}: {}", owner, repo, path, e);
                    return Vec::new();
                }
            };

            let mut readmes: Vec<String> = entries
                .iter()
                .filter(|entry| entry.is_readme())
                .filter_map(|entry| entry.html_url.clone())
                .collect();

            if depth < self.max_depth {
                let folders = entries
                    .iter()
                    .filter(|entry| entry.is_dir())
                    .map(|entry| self.walk(owner, repo, entry.path.clone(), depth + 1));
                for nested in join_all(folders).await {
                    readmes.extend(nested);
                }
            }

            readmes
        }
        .boxed()
    }

    /// Lists one repository directory through the contents API
    pub async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<RepoEntry>, CrawlError> {
        let api_url = self.contents_url(owner, repo, path)?;

        self.limiter.acquire().await;
        let response = self
            .client
            .get(api_url.clone())
            .header(ACCEPT, GITHUB_JSON)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| CrawlError::Http {
                url: api_url.to_string(),
                source,
            })?;

        if response.status() != StatusCode::OK {
            return Err(CrawlError::Status {
                url: api_url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| CrawlError::Http {
            url: api_url.to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&body)?)
    }

    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> Result<Url, CrawlError> {
        let mut url = Url::parse(&self.api_base)?;
        url.path_segments_mut()
            .map_err(|_| UrlError::Parse(format!("cannot be a base URL: {}", self.api_base)))?
            .pop_if_empty()
            .extend(["repos", owner, repo, "contents"])
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }
}
