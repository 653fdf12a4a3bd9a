//! On-disk cache of raw commit history
//!
//! Entries are keyed by the start commit hash and the requested commit limit,
//! so a new commit or a different limit is simply a miss. Every failure here
//! is logged and treated as a miss; the cache never fails an analysis.

use super::history::{Commit, HistoryError, HistorySource};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name used for faultline's caches
pub const CACHE_DIR: &str = ".faultline-cache";

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// faultline version that wrote the entry
    version: String,
    start_commit: String,
    limit: usize,
    commits: Vec<Commit>,
}

/// Commit history cache scoped to one tool invocation
#[derive(Debug, Clone)]
pub struct CommitCache {
    dir: Option<PathBuf>,
}

impl CommitCache {
    /// Cache stored under `<root>/.faultline-cache/commits`
    pub fn new(root: &Path) -> Self {
        Self {
            dir: Some(root.join(CACHE_DIR).join("commits")),
        }
    }

    /// A cache that never hits and never writes
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    fn entry_path(&self, start_commit: &str, limit: usize) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}-{}.msgpack", start_commit, limit)))
    }

    /// Cached commits for `(start_commit, limit)`, if present and readable
    pub fn load(&self, start_commit: &str, limit: usize) -> Option<Vec<Commit>> {
        let path = self.entry_path(start_commit, limit)?;
        match Self::read_entry(&path) {
            Ok(Some(entry)) if entry.start_commit == start_commit && entry.limit == limit => {
                debug!("commit cache hit: {}", path.display());
                Some(entry.commits)
            }
            Ok(_) => {
                debug!("commit cache miss: {}", path.display());
                None
            }
            Err(e) => {
                debug!("ignoring unreadable commit cache {}: {:#}", path.display(), e);
                None
            }
        }
    }

    fn read_entry(path: &Path) -> Result<Option<CacheEntry>> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        let entry: CacheEntry = rmp_serde::from_slice(&bytes)?;
        if entry.version != crate::VERSION {
            return Ok(None);
        }
        Ok(Some(entry))
    }

    /// Store commits for `(start_commit, limit)`; failures are logged only
    pub fn store(&self, start_commit: &str, limit: usize, commits: &[Commit]) {
        let Some(path) = self.entry_path(start_commit, limit) else {
            return;
        };
        let entry = CacheEntry {
            version: crate::VERSION.to_string(),
            start_commit: start_commit.to_string(),
            limit,
            commits: commits.to_vec(),
        };
        if let Err(e) = Self::write_entry(&path, &entry) {
            debug!("could not write commit cache {}: {:#}", path.display(), e);
        }
    }

    fn write_entry(path: &Path, entry: &CacheEntry) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).context("Failed to create cache directory")?;
        }
        let bytes = rmp_serde::to_vec(entry)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Commits from the cache, or from `source` on a miss (then cached)
    pub fn load_or_fetch(
        &self,
        source: &dyn HistorySource,
        limit: usize,
    ) -> Result<Vec<Commit>, HistoryError> {
        let start_commit = source.start_commit()?;
        if let Some(commits) = self.load(&start_commit, limit) {
            return Ok(commits);
        }

        let commits = source.commits(limit)?;
        self.store(&start_commit, limit, &commits);
        Ok(commits)
    }

    /// Clear the cache
    pub fn clear(&self) -> Result<()> {
        if let Some(dir) = &self.dir {
            if dir.exists() {
                std::fs::remove_dir_all(dir)?;
            }
        }
        Ok(())
    }
}
