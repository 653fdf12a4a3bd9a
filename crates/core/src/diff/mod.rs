//! Ref-to-ref comparison of function health
//!
//! Each ref is read from git blobs and run through the full pipeline on its
//! own; the two snapshot maps are then compared by [`DiffEngine`].

pub mod blob;
pub mod engine;
pub mod snapshot;

pub use blob::GitTreeReader;
pub use engine::{
    DiffEngine, DiffResult, DiffStatus, DiffSummary, FunctionDiff, MetricDelta, Verdict,
};
pub use snapshot::{snapshot_report, NodeSnapshot};

use crate::analysis::analyze_sources;
use crate::config::FaultlineConfig;
use crate::discovery::PathFilter;
use crate::git::{CommitCache, Git2History, HistorySource};
use crate::parser::{relative_path, ParserDispatcher};
use anyhow::{Context, Result};
use git2::Repository;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("invalid ref range '{0}': expected <base>..<head>, <base>...<head> or <base>")]
    InvalidRange(String),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

/// The two refs a diff compares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefRange {
    pub base: String,
    pub head: String,
}

impl RefRange {
    /// Parse `base..head`, `base...head` or a lone `base` (head = `HEAD`)
    pub fn parse(input: &str) -> Result<Self, DiffError> {
        let invalid = || DiffError::InvalidRange(input.to_string());
        if input.is_empty() || input.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let (base, head) = if let Some((base, head)) = input.split_once("...") {
            (base, head)
        } else if let Some((base, head)) = input.split_once("..") {
            (base, head)
        } else {
            (input, "HEAD")
        };

        for side in [base, head] {
            if side.is_empty() || side.contains("..") || side.starts_with('.') || side.ends_with('.') {
                return Err(invalid());
            }
        }

        Ok(Self {
            base: base.to_string(),
            head: head.to_string(),
        })
    }
}

impl std::fmt::Display for RefRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.base, self.head)
    }
}

/// Analyse both refs of `range` for the code under `path` and compare them.
///
/// `path` may be the repository root or any directory inside it; only files
/// under it are analysed at either ref.
pub fn diff_refs(
    path: &Path,
    range: &RefRange,
    config: &FaultlineConfig,
    cache: &CommitCache,
) -> Result<DiffResult> {
    let analysis_root = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let repo = Repository::discover(&analysis_root).map_err(DiffError::Git)?;
    let repo_root = repo
        .workdir()
        .context("Bare repositories are not supported")?
        .canonicalize()?;
    if !analysis_root.starts_with(&repo_root) {
        anyhow::bail!(
            "{} is not inside repository {}",
            analysis_root.display(),
            repo_root.display()
        );
    }
    let prefix = relative_path(&repo_root, &analysis_root);

    let (before, after) = rayon::join(
        || snapshot_at(&repo_root, &prefix, &range.base, config, cache),
        || snapshot_at(&repo_root, &prefix, &range.head, config, cache),
    );
    let before = before.with_context(|| format!("Failed to analyse {}", range.base))?;
    let after = after.with_context(|| format!("Failed to analyse {}", range.head))?;

    let result = DiffEngine::new().compare(&range.base, &range.head, &before, &after);
    info!(
        "diff {}: {} stressed, {} improved, {} added, {} removed, {} unchanged",
        range,
        result.summary.stressed,
        result.summary.improved,
        result.summary.added,
        result.summary.removed,
        result.summary.unchanged
    );
    Ok(result)
}

/// Run the pipeline over the tree at `rev`
fn snapshot_at(
    repo_root: &Path,
    prefix: &str,
    rev: &str,
    config: &FaultlineConfig,
    cache: &CommitCache,
) -> Result<BTreeMap<String, NodeSnapshot>> {
    let reader = GitTreeReader::new(repo_root)?;
    let dispatcher = ParserDispatcher::new();
    let analysis_root = if prefix.is_empty() {
        repo_root.to_path_buf()
    } else {
        repo_root.join(prefix)
    };

    let filter = PathFilter::new(&analysis_root, &config.ignore.paths)?;
    let sources =
        reader.read_sources_at_ref(rev, prefix, &dispatcher.supported_extensions(), &filter)?;

    let history = if config.git.enabled {
        match Git2History::discover(repo_root) {
            Ok(history) => Some(history.at_revision(rev)),
            Err(e) => {
                warn!("git history unavailable for {}: {}", rev, e);
                None
            }
        }
    } else {
        None
    };

    let report = analyze_sources(
        &analysis_root,
        &sources,
        history.as_ref().map(|h| h as &dyn HistorySource),
        config,
        cache,
    );
    Ok(snapshot_report(&report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_dot_range() {
        let range = RefRange::parse("main..feature").unwrap();
        assert_eq!(range.base, "main");
        assert_eq!(range.head, "feature");
    }

    #[test]
    fn test_parse_three_dot_range() {
        let range = RefRange::parse("v1.2.0...HEAD~1").unwrap();
        assert_eq!(range.base, "v1.2.0");
        assert_eq!(range.head, "HEAD~1");
    }

    #[test]
    fn test_parse_single_ref_defaults_head() {
        let range = RefRange::parse("origin/main").unwrap();
        assert_eq!(range.base, "origin/main");
        assert_eq!(range.head, "HEAD");
    }

    #[test]
    fn test_parse_rejects_malformed_ranges() {
        for input in ["", "..", "main..", "..main", "a..b..c", "a...b...c", "a b", "main ..x", "a....b"] {
            assert!(
                matches!(RefRange::parse(input), Err(DiffError::InvalidRange(_))),
                "accepted {:?}",
                input
            );
        }
    }
}
