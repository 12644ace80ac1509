//! Output module for crawl results and reports
//!
//! This module handles:
//! - Writing the collected URL list for the document loader
//! - Statistics over the persisted crawl state

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};

use crate::CrawlError;
use std::path::Path;

/// Writes `urls` as a pretty-printed JSON array, creating parent directories
///
/// # Arguments
///
/// * `path` - Destination file, replaced if it exists
/// * `urls` - URLs in the order they should appear
///
/// # Returns
///
/// * `Ok(())` - The list was written
/// * `Err(CrawlError)` - The file could not be written
pub fn write_url_list(path: &Path, urls: &[String]) -> Result<(), CrawlError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(urls)?;
    std::fs::write(path, json)?;

    tracing::info!("Wrote {} URLs to {}", urls.len(), path.display());
    Ok(())
}
