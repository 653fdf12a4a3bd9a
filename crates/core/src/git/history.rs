//! Commit history retrieval using libgit2
//!
//! Walks the history reachable from a start revision and reports, for each
//! commit, the new-file line ranges it changed.

use git2::{Delta, DiffOptions, Repository, Sort};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inclusive line range in new-file coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

/// Lines a commit changed in one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the repository root
    pub file: String,
    pub ranges: Vec<LineRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub author: String,
    /// Seconds since the epoch
    pub date: i64,
    /// First line of the message
    pub message: String,
    pub is_fix: bool,
    pub changes: Vec<FileChange>,
}

fn fix_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)\bfix(es|ed|ing)?\b",
            r"(?i)\bbugs?\b",
            r"(?i)\bhotfix\b",
            r"(?i)\bpatch\b",
            r"(?i)\brevert\b",
            r"(?i)\bregression\b",
            r"(?i)\bcrash(es|ed)?\b",
            r"(?i)\bbroken\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid fix pattern"))
        .collect()
    })
}

/// Whether a commit message indicates a bug fix
pub fn is_fix_message(message: &str) -> bool {
    fix_patterns().iter().any(|re| re.is_match(message))
}

/// Where commit history comes from
pub trait HistorySource: Send + Sync {
    /// Root of the repository; commit paths are relative to it
    fn repo_root(&self) -> &Path;

    /// Full hash of the commit the walk starts from
    fn start_commit(&self) -> Result<String, HistoryError>;

    /// Up to `limit` non-merge commits, newest first
    fn commits(&self, limit: usize) -> Result<Vec<Commit>, HistoryError>;
}

/// History source backed by a local git repository
#[derive(Debug, Clone)]
pub struct Git2History {
    repo_root: PathBuf,
    start: String,
}

impl Git2History {
    /// Find the repository containing `path`; the walk starts at `HEAD`
    pub fn discover(path: &Path) -> Result<Self, HistoryError> {
        let repo = Repository::discover(path)
            .map_err(|_| HistoryError::NotARepository(path.to_path_buf()))?;
        let repo_root = repo
            .workdir()
            .map(Path::to_path_buf)
            .or_else(|| repo.path().parent().map(Path::to_path_buf))
            .ok_or_else(|| HistoryError::NotARepository(path.to_path_buf()))?;
        debug!("opened git repository at {}", repo_root.display());

        Ok(Self {
            repo_root,
            start: "HEAD".to_string(),
        })
    }

    /// Start the walk at another revision
    pub fn at_revision(mut self, rev: impl Into<String>) -> Self {
        self.start = rev.into();
        self
    }

    fn open(&self) -> Result<Repository, HistoryError> {
        Ok(Repository::open(&self.repo_root)?)
    }

    /// Changed new-file ranges per file between a commit and its first parent
    fn commit_changes(
        repo: &Repository,
        commit: &git2::Commit<'_>,
    ) -> Result<Vec<FileChange>, HistoryError> {
        let parent = commit.parent(0).ok();
        let tree = commit.tree()?;
        let parent_tree = parent.as_ref().map(|p| p.tree()).transpose()?;

        let mut opts = DiffOptions::new();
        opts.context_lines(0);
        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

        let mut by_file: BTreeMap<String, Vec<LineRange>> = BTreeMap::new();
        diff.foreach(
            &mut |_, _| true,
            None,
            Some(&mut |delta, hunk| {
                if delta.status() == Delta::Deleted {
                    return true;
                }
                let Some(path) = delta.new_file().path() else {
                    return true;
                };
                let start = hunk.new_start() as usize;
                let lines = hunk.new_lines() as usize;
                // pure deletion: the single line at the hunk's position
                let range = if lines == 0 {
                    LineRange {
                        start: start.max(1),
                        end: start.max(1),
                    }
                } else {
                    LineRange {
                        start,
                        end: start + lines - 1,
                    }
                };
                by_file
                    .entry(path.to_string_lossy().replace('\\', "/"))
                    .or_default()
                    .push(range);
                true
            }),
            None,
        )?;

        Ok(by_file
            .into_iter()
            .map(|(file, ranges)| FileChange { file, ranges })
            .collect())
    }
}

impl HistorySource for Git2History {
    fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    fn start_commit(&self) -> Result<String, HistoryError> {
        let repo = self.open()?;
        let commit = repo.revparse_single(&self.start)?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    fn commits(&self, limit: usize) -> Result<Vec<Commit>, HistoryError> {
        let repo = self.open()?;
        let start = repo.revparse_single(&self.start)?.peel_to_commit()?;

        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(start.id())?;

        let mut commits = Vec::new();
        for oid in revwalk {
            if commits.len() >= limit {
                break;
            }

            let commit = repo.find_commit(oid?)?;
            if commit.parent_count() > 1 {
                continue;
            }

            let full_message = commit.message().unwrap_or("");
            let message = full_message.lines().next().unwrap_or("").to_string();

            commits.push(Commit {
                hash: commit.id().to_string(),
                author: commit.author().name().unwrap_or("Unknown").to_string(),
                date: commit.time().seconds(),
                is_fix: is_fix_message(full_message),
                message,
                changes: Self::commit_changes(&repo, &commit)?,
            });
        }

        debug!("read {} commits from {}", commits.len(), self.start);
        Ok(commits)
    }
}
