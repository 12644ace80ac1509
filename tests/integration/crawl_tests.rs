//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use polite_crawl::config::{
    Config, CrawlerConfig, GithubConfig, OutputConfig, SourcesConfig, UserAgentConfig,
};
use polite_crawl::crawler::{crawl_site, Coordinator, LinkFetcher};
use polite_crawl::sources::collect_sources;
use polite_crawl::state::{CrawlState, VisitedSet};
use polite_crawl::storage::{JsonFileStorage, Storage};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing its state into `dir`
fn create_test_config(dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            calls: 1000,
            period_secs: 1,
            request_timeout_secs: 5,
            max_concurrent_fetches: 4,
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            visited_path: dir.join("visited.json").display().to_string(),
            urls_path: dir.join("urls.json").display().to_string(),
        },
        sources: SourcesConfig::default(),
        github: GithubConfig::default(),
    }
}

fn create_coordinator(config: &Config) -> Coordinator<JsonFileStorage> {
    let fetcher = LinkFetcher::from_config(config).expect("Failed to build fetcher");
    let storage = JsonFileStorage::new(&config.output.visited_path);
    Coordinator::new(fetcher, storage, config.crawler.max_concurrent_fetches as usize)
}

/// Mounts an HTML page at `route` linking to each of `links`
async fn mount_page(server: &MockServer, route: &str, links: &[&str], expected_hits: u64) {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">{}</a>"#, link, link))
        .collect();
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                format!("<html><body>{}</body></html>", anchors),
                "text/html",
            ),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn read_state(config: &Config) -> CrawlState {
    JsonFileStorage::new(&config.output.visited_path)
        .load()
        .expect("Failed to load state")
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    let absolute_page2 = format!("{}/page2/", base_url);
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/",
        &[
            "/page1",
            absolute_page2.as_str(),
            "/page1#section",
            "/page1?ref=home",
            "https://other.example.org/elsewhere",
            "/report.pdf",
            "/style.css",
            "mailto:team@example.com",
        ],
        1,
    )
    .await;
    mount_page(&mock_server, "/page1", &["/"], 1).await;
    mount_page(&mock_server, "/page2", &["/page1"], 1).await;

    let visited = crawl_site(&config, &format!("{}/", base_url), false)
        .await
        .expect("Crawl failed");

    let expected: VisitedSet = [
        base_url.clone(),
        format!("{}/page1", base_url),
        format!("{}/page2", base_url),
    ]
    .into_iter()
    .collect();
    assert_eq!(visited, expected);

    // The visited list is persisted and nothing is left pending
    let state = read_state(&config);
    assert_eq!(state.visited, expected);
    assert!(state.pending.is_empty());
}

#[tokio::test]
async fn test_cycle_fetches_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    mount_page(&mock_server, "/a", &["/b"], 1).await;
    mount_page(&mock_server, "/b", &["/a", "/a/", "/b#top"], 1).await;

    let mut coordinator = create_coordinator(&config);
    let visited = coordinator
        .crawl(&format!("{}/a", base_url), "127.0.0.1")
        .await;

    assert_eq!(visited.len(), 2);
    assert_eq!(coordinator.last_progress().fetched, 2);
    // Expectations of exactly one hit per page are verified when the server drops
}

#[tokio::test]
async fn test_robots_disallow_blocks_fetch() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    mount_robots(&mock_server, "User-agent: *\nDisallow: /private").await;
    mount_page(&mock_server, "/", &["/public", "/private/data"], 1).await;
    mount_page(&mock_server, "/public", &[], 1).await;
    mount_page(&mock_server, "/private/data", &["/secret-link"], 0).await;

    let mut coordinator = create_coordinator(&config);
    let visited = coordinator.crawl(&base_url, "127.0.0.1").await;

    // The blocked page was claimed but never fetched or expanded
    assert!(visited.contains(&format!("{}/private/data", base_url)));
    assert!(!visited.contains(&format!("{}/secret-link", base_url)));
    assert_eq!(coordinator.last_progress().blocked, 1);
    assert_eq!(coordinator.last_progress().fetched, 2);
}

#[tokio::test]
async fn test_missing_robots_fails_open() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", &["/docs"], 1).await;
    mount_page(&mock_server, "/docs", &[], 1).await;

    let mut coordinator = create_coordinator(&config);
    let visited = coordinator.crawl(&base_url, "127.0.0.1").await;

    assert_eq!(visited.len(), 2);
    assert_eq!(coordinator.last_progress().blocked, 0);
}

#[tokio::test]
async fn test_robots_server_error_fails_open() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", &[], 1).await;

    let mut coordinator = create_coordinator(&config);
    coordinator.crawl(&base_url, "127.0.0.1").await;

    assert_eq!(coordinator.last_progress().fetched, 1);
}

#[tokio::test]
async fn test_resume_expands_pending_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    let a = format!("{}/a", base_url);
    let b = format!("{}/b", base_url);

    // A previous run claimed A and B but was interrupted before expanding them
    let mut storage = JsonFileStorage::new(&config.output.visited_path);
    let mut prior = CrawlState::new();
    prior.claim(&a);
    prior.claim(&b);
    storage.save(&prior).expect("Failed to seed state");

    mount_page(&mock_server, "/a", &["/b", "/c"], 1).await;
    mount_page(&mock_server, "/b", &["/a", "/d"], 1).await;
    mount_page(&mock_server, "/c", &["/a"], 1).await;
    mount_page(&mock_server, "/d", &["/b"], 1).await;

    let mut coordinator = create_coordinator(&config);
    let visited = coordinator.crawl(&a, "127.0.0.1").await;

    let expected: VisitedSet = [a, b, format!("{}/c", base_url), format!("{}/d", base_url)]
        .into_iter()
        .collect();
    assert_eq!(visited, expected);
    // Only C and D were new
    assert_eq!(coordinator.last_progress().discovered, 2);

    let state = read_state(&config);
    assert_eq!(state.visited, expected);
    assert!(state.pending.is_empty());
}

#[tokio::test]
async fn test_completed_state_is_not_refetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    mount_page(&mock_server, "/", &["/next"], 1).await;
    mount_page(&mock_server, "/next", &[], 1).await;

    let first = crawl_site(&config, &base_url, false).await.unwrap();
    assert_eq!(first.len(), 2);

    // Second run finds the seed already visited and fetches nothing
    let second = crawl_site(&config, &base_url, false).await.unwrap();
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_single_failure_isolated() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    mount_page(&mock_server, "/", &["/broken", "/third"], 1).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/third", &[], 1).await;

    let mut coordinator = create_coordinator(&config);
    let visited = coordinator.crawl(&base_url, "127.0.0.1").await;

    assert!(visited.contains(&base_url));
    assert!(visited.contains(&format!("{}/third", base_url)));
    assert_eq!(coordinator.last_progress().failed, 1);
    assert_eq!(coordinator.last_progress().fetched, 2);
}

#[tokio::test]
async fn test_non_html_body_yields_no_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 159, 146, 150]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut coordinator = create_coordinator(&config);
    let visited = coordinator.crawl(&base_url, "127.0.0.1").await;

    assert_eq!(visited.len(), 1);
}

#[tokio::test]
async fn test_invalid_seed_makes_no_requests() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    let visited = crawl_site(&config, "ftp://127.0.0.1/files", false)
        .await
        .unwrap();

    assert!(visited.is_empty());
    assert!(!Path::new(&config.output.visited_path).exists());
}

#[tokio::test]
async fn test_fresh_ignores_previous_state() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    let mut storage = JsonFileStorage::new(&config.output.visited_path);
    let prior: VisitedSet = [base_url.clone()].into_iter().collect();
    storage.save(&CrawlState::from_visited(prior)).unwrap();

    mount_page(&mock_server, "/", &[], 1).await;

    let visited = crawl_site(&config, &base_url, true).await.unwrap();
    assert_eq!(visited.len(), 1);
}

#[tokio::test]
async fn test_collect_sources_writes_merged_list() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.sources.websites = vec![format!("{}/", base_url)];
    config.sources.repositories = vec!["https://github.com/octo/demo".to_string()];
    config.github.api_base = base_url.clone();

    mount_page(&mock_server, "/", &["/guide"], 1).await;
    mount_page(&mock_server, "/guide", &[], 1).await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"name":"README.md","path":"README.md","type":"file","html_url":"https://github.com/octo/demo/blob/main/README.md"}]"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = collect_sources(&config, false).await.expect("Collection failed");

    assert_eq!(summary.sources.len(), 2);
    assert_eq!(summary.sources[0].urls, 2);
    assert_eq!(summary.sources[1].urls, 1);
    assert_eq!(summary.total, 3);

    let written: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(&config.output.urls_path).unwrap()).unwrap();
    let mut expected = vec![
        base_url.clone(),
        format!("{}/guide", base_url),
        "https://github.com/octo/demo/blob/main/README.md".to_string(),
    ];
    expected.sort();
    assert_eq!(written, expected);
}

#[tokio::test]
async fn test_visited_set_only_grows() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    // URLs from an earlier crawl of another site share the state file
    let prior: VisitedSet = ["https://other.example.org", "https://other.example.org/docs"]
        .into_iter()
        .collect();
    let mut storage = JsonFileStorage::new(&config.output.visited_path);
    storage.save(&CrawlState::from_visited(prior.clone())).unwrap();

    mount_page(&mock_server, "/", &["/one"], 1).await;
    mount_page(&mock_server, "/one", &[], 1).await;

    let visited = crawl_site(&config, &base_url, false).await.unwrap();

    assert_eq!(visited.len(), prior.len() + 2);
    for url in prior.iter() {
        assert!(visited.contains(url));
    }
    assert_eq!(read_state(&config).visited, visited);
}

#[tokio::test]
async fn test_page_fetches_share_rate_budget() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.crawler.calls = 1;
    config.crawler.period_secs = 1;

    mount_page(&mock_server, "/", &["/one", "/two"], 1).await;
    mount_page(&mock_server, "/one", &[], 1).await;
    mount_page(&mock_server, "/two", &[], 1).await;

    let started = Instant::now();
    let mut coordinator = create_coordinator(&config);
    let visited = coordinator.crawl(&base_url, "127.0.0.1").await;

    // One page per second: the third fetch waits for two windows
    assert_eq!(visited.len(), 3);
    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test]
async fn test_timed_out_page_is_isolated() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.crawler.request_timeout_secs = 1;

    mount_page(&mock_server, "/", &["/slow", "/third"], 1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/hidden">hidden</a>"#, "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/third", &[], 1).await;
    mount_page(&mock_server, "/hidden", &[], 0).await;

    let mut coordinator = create_coordinator(&config);
    let visited = coordinator.crawl(&base_url, "127.0.0.1").await;

    assert!(visited.contains(&base_url));
    assert!(visited.contains(&format!("{}/third", base_url)));
    let progress = coordinator.last_progress();
    assert_eq!(progress.failed, 1);
    assert_eq!(progress.fetched, 2);
    assert_eq!(progress.aborted, 0);
}

#[tokio::test]
async fn test_non_html_content_type_is_not_parsed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());

    mount_page(&mock_server, "/", &["/report"], 1).await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/hidden">hidden</a>"#, "application/octet-stream"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/hidden", &[], 0).await;

    let mut coordinator = create_coordinator(&config);
    let visited = coordinator.crawl(&base_url, "127.0.0.1").await;

    assert_eq!(visited.len(), 2);
    assert!(visited.contains(&format!("{}/report", base_url)));
    assert_eq!(coordinator.last_progress().fetched, 2);
}
