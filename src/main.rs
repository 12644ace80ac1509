//! polite-crawl main entry point
//!
//! This is the command-line interface for the polite-crawl URL collector.

use anyhow::Context;
use clap::Parser;
use polite_crawl::config::{load_config_with_hash, Config};
use polite_crawl::crawler::{build_http_client, crawl_site, RateLimiter, RepoWalker};
use polite_crawl::output::{load_statistics, print_statistics, write_url_list};
use polite_crawl::sources::{collect_sources, SourceKind, SourceSummary};
use polite_crawl::storage::JsonFileStorage;
use polite_crawl::url::{base_domain, is_valid};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// polite-crawl: a polite, resumable URL collector
///
/// polite-crawl crawls websites within their own domain while respecting
/// robots.txt and a shared rate limit, walks GitHub repositories for README
/// pages, and writes the collected URL list as JSON.
#[derive(Parser, Debug)]
#[command(name = "polite-crawl")]
#[command(version)]
#[command(about = "A polite, resumable URL collector", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start a fresh crawl, ignoring previous state
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "url", "repo"])]
    dry_run: bool,

    /// Show statistics from the persisted crawl state and exit
    #[arg(long, conflicts_with_all = ["dry_run", "url", "repo", "fresh"])]
    stats: bool,

    /// Crawl a single website instead of the configured sources
    #[arg(long, value_name = "URL", conflicts_with_all = ["dry_run", "stats", "repo"])]
    url: Option<String>,

    /// Walk a single GitHub repository instead of the configured sources
    #[arg(long, value_name = "URL", conflicts_with_all = ["dry_run", "stats", "url"])]
    repo: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(url) = cli.url.as_deref() {
        handle_single_site(&config, url, cli.fresh).await?;
    } else if let Some(repo) = cli.repo.as_deref() {
        handle_single_repo(&config, repo).await?;
    } else {
        handle_collect(&config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("polite_crawl=info,warn"),
            1 => EnvFilter::new("polite_crawl=debug,info"),
            2 => EnvFilter::new("polite_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== polite-crawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Rate limit: {} requests per {}s",
        config.crawler.calls, config.crawler.period_secs
    );
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!(
        "  Blocked extensions: {}",
        config.crawler.blocked_extensions.join(", ")
    );
    println!("  robots.txt agent: {}", config.crawler.robots_agent);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Visited state: {}", config.output.visited_path);
    println!("  URL list: {}", config.output.urls_path);

    println!("\nWebsites ({}):", config.sources.websites.len());
    for website in &config.sources.websites {
        println!("  - {}", website);
    }

    println!(
        "\nRepositories ({}, folder depth {}):",
        config.sources.repositories.len(),
        config.github.max_depth
    );
    for repository in &config.sources.repositories {
        println!("  - {}", repository);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would collect from {} sources",
        config.sources.websites.len() + config.sources.repositories.len()
    );
}

/// Handles the --stats mode: shows statistics from the persisted state
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("State file: {}\n", config.output.visited_path);

    let storage = JsonFileStorage::new(&config.output.visited_path);
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --url mode: crawls one website and writes its URLs
async fn handle_single_site(config: &Config, url: &str, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous state)");
    }

    let domain = base_domain(url).with_context(|| format!("Invalid website URL {}", url))?;
    let visited = crawl_site(config, url, fresh).await?;

    // The state file may also hold URLs of other configured websites.
    let urls: Vec<String> = visited
        .into_iter()
        .filter(|visited_url| is_valid(visited_url, &domain, &config.crawler.blocked_extensions))
        .collect();
    write_url_list(Path::new(&config.output.urls_path), &urls)?;

    println!("✓ {} URLs written to {}", urls.len(), config.output.urls_path);
    Ok(())
}

/// Handles the --repo mode: walks one repository and writes its README links
async fn handle_single_repo(config: &Config, repo: &str) -> anyhow::Result<()> {
    let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
    let walker = RepoWalker::from_config(config, client, RateLimiter::from_config(&config.crawler));

    let mut urls = walker.readme_urls(repo).await;
    urls.sort();
    urls.dedup();
    write_url_list(Path::new(&config.output.urls_path), &urls)?;

    println!("✓ {} README URLs written to {}", urls.len(), config.output.urls_path);
    Ok(())
}

/// Handles the main collection run over every configured source
async fn handle_collect(config: &Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous state)");
    } else {
        tracing::info!("Starting crawl (will resume if interrupted run exists)");
    }

    tracing::info!(
        "Websites: {}, Repositories: {}",
        config.sources.websites.len(),
        config.sources.repositories.len()
    );

    let summary = collect_sources(config, fresh)
        .await
        .context("Source collection failed")?;
    print_summary(&summary, &config.output.urls_path);

    Ok(())
}

fn print_summary(summary: &SourceSummary, urls_path: &str) {
    println!("=== Collection Summary ===\n");
    for count in &summary.sources {
        let kind = match count.kind {
            SourceKind::Website => "website",
            SourceKind::Repository => "repository",
        };
        println!("  [{}] {}: {} URLs", kind, count.source, count.urls);
    }
    println!();
    println!(
        "✓ {} distinct URLs written to {} in {:.1?}",
        summary.total, urls_path, summary.elapsed
    );
}
