//! Storage traits and error types
//!
//! This module defines the trait interface for crawl-state backends and
//! associated error types.

use crate::state::CrawlState;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Corrupt state in {path}: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for crawl-state backends
///
/// A single top-level crawl owns its backend for the duration of the crawl;
/// implementations need not coordinate concurrent writers.
pub trait Storage: Send {
    /// Loads the persisted state
    ///
    /// Absent state is not an error: it loads as an empty [`CrawlState`].
    fn load(&self) -> StorageResult<CrawlState>;

    /// Replaces the persisted state with `state`
    fn save(&mut self, state: &CrawlState) -> StorageResult<()>;
}
