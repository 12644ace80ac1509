//! JSON file storage implementation
//!
//! The visited set is stored as a JSON list of URLs at the configured path.
//! Pending URLs live beside it in `<stem>.pending.json`. Both files are
//! rewritten wholesale through a temporary file and a rename, so a crash
//! mid-write leaves the previous contents intact.

use crate::state::{CrawlState, VisitedSet};
use crate::storage::traits::{Storage, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-backed crawl state
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    visited_path: PathBuf,
    pending_path: PathBuf,
}

impl JsonFileStorage {
    /// Creates a storage rooted at the visited-list path
    pub fn new(visited_path: impl Into<PathBuf>) -> Self {
        let visited_path = visited_path.into();
        let pending_path = visited_path.with_extension("pending.json");
        Self {
            visited_path,
            pending_path,
        }
    }

    pub fn visited_path(&self) -> &Path {
        &self.visited_path
    }

    pub fn pending_path(&self) -> &Path {
        &self.pending_path
    }

    /// Deletes both state files; missing files are ignored
    pub fn clear(&self) -> StorageResult<()> {
        for path in [&self.visited_path, &self.pending_path] {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(StorageError::Io {
                        path: path.display().to_string(),
                        source,
                    })
                }
            }
        }
        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> StorageResult<CrawlState> {
        let visited: VisitedSet = read_json_or_default(&self.visited_path)?;
        let pending: BTreeSet<String> = read_json_or_default(&self.pending_path)?;
        Ok(CrawlState { visited, pending })
    }

    fn save(&mut self, state: &CrawlState) -> StorageResult<()> {
        write_json_atomic(&self.visited_path, &serde_json::to_vec(&state.visited)?)?;
        write_json_atomic(&self.pending_path, &serde_json::to_vec(&state.pending)?)?;
        Ok(())
    }
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> StorageResult<T> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
        path: path.display().to_string(),
        source,
    })
}

fn write_json_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let io_err = |source| StorageError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}
