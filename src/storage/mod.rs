//! Storage module for persisting crawl progress
//!
//! This module handles reading and writing the visited set between runs:
//! - JSON file backend (the visited URL list plus a pending sidecar)
//! - In-memory backend for embedding and tests

mod json;
mod traits;

pub use json::JsonFileStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::CrawlState;

/// Storage that keeps state in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: CrawlState,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing state, as if it had been persisted earlier
    pub fn with_state(state: CrawlState) -> Self {
        Self { state, saves: 0 }
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Number of times the state has been saved
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> StorageResult<CrawlState> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &CrawlState) -> StorageResult<()> {
        self.state = state.clone();
        self.saves += 1;
        Ok(())
    }
}
