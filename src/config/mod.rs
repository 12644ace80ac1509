//! Configuration module for polite-crawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use polite_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Rate limit: {} calls per {}s", config.crawler.calls, config.crawler.period_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, GithubConfig, OutputConfig, SourcesConfig, UserAgentConfig,
    DEFAULT_BLOCKED_EXTENSIONS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
