use serde::Deserialize;
use std::time::Duration;

/// Path extensions that never lead to an HTML page
pub const DEFAULT_BLOCKED_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".png", ".js", ".css"];

/// Main configuration structure for polite-crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub github: GithubConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of fetches that may start within one period
    #[serde(default = "default_calls")]
    pub calls: u32,

    /// Length of the rolling rate-limit window (seconds)
    #[serde(rename = "period-secs", default = "default_period_secs")]
    pub period_secs: u64,

    /// Timeout for every outbound request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of page fetches in flight at once
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: u32,

    /// Path suffixes that are never crawled
    #[serde(rename = "blocked-extensions", default = "default_blocked_extensions")]
    pub blocked_extensions: Vec<String>,

    /// User agent token evaluated against robots.txt groups
    #[serde(rename = "robots-agent", default = "default_robots_agent")]
    pub robots_agent: String,
}

impl CrawlerConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            calls: default_calls(),
            period_secs: default_period_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            blocked_extensions: default_blocked_extensions(),
            robots_agent: default_robots_agent(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON file holding the visited URL list
    #[serde(rename = "visited-path", default = "default_visited_path")]
    pub visited_path: String,

    /// Path to the JSON file receiving the collected URL list
    #[serde(rename = "urls-path", default = "default_urls_path")]
    pub urls_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            visited_path: default_visited_path(),
            urls_path: default_urls_path(),
        }
    }
}

/// Sources collected by a full pipeline run
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    /// Website seed URLs; each is crawled within its own host
    #[serde(default)]
    pub websites: Vec<String>,

    /// GitHub repository URLs walked for README pages
    #[serde(default)]
    pub repositories: Vec<String>,
}

/// GitHub contents API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    /// Base URL of the REST API
    #[serde(rename = "api-base", default = "default_api_base")]
    pub api_base: String,

    /// How many folder levels below the repository root are listed
    #[serde(rename = "max-depth", default = "default_github_depth")]
    pub max_depth: u32,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            max_depth: default_github_depth(),
        }
    }
}

fn default_calls() -> u32 {
    10
}

fn default_period_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent_fetches() -> u32 {
    8
}

fn default_blocked_extensions() -> Vec<String> {
    DEFAULT_BLOCKED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_robots_agent() -> String {
    "*".to_string()
}

fn default_visited_path() -> String {
    "./visited.json".to_string()
}

fn default_urls_path() -> String {
    "./urls.json".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_github_depth() -> u32 {
    1
}
