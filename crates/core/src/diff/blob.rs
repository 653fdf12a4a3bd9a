//! Git blob reading for analysing historical commits
//!
//! Reads source files for any git ref (branch, tag, commit) straight from
//! the object database, so two refs can be analysed side by side without a
//! checkout.

use anyhow::{Context, Result};
use git2::{ObjectType, Oid, Repository};
use std::path::Path;
use tracing::debug;

use crate::discovery::PathFilter;

/// Reads file contents from git trees without checking out
pub struct GitTreeReader {
    repo: Repository,
}

impl GitTreeReader {
    /// Open a git repository at the given path
    pub fn new(repo_path: &Path) -> Result<Self> {
        let repo = Repository::open(repo_path)
            .context("Failed to open git repository for blob reading")?;
        Ok(Self { repo })
    }

    /// Source files at `ref_spec` as `(relative path, content)` pairs
    ///
    /// Only paths under `prefix` (a `/`-separated directory inside the
    /// repository, empty for the whole tree) are read, and returned paths are
    /// relative to it. `extensions` take the form `[".js", ".ts"]`. Binary and
    /// non-UTF-8 blobs are skipped.
    pub fn read_sources_at_ref(
        &self,
        ref_spec: &str,
        prefix: &str,
        extensions: &[&str],
        filter: &PathFilter,
    ) -> Result<Vec<(String, String)>> {
        let tree = self.resolve_tree(ref_spec)?;
        let prefix = prefix.trim_matches('/');

        // Pass 1: collect (relative_path, oid) pairs to avoid borrow issues
        let mut entries: Vec<(String, Oid)> = Vec::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() != Some(ObjectType::Blob) {
                return git2::TreeWalkResult::Ok;
            }

            let name = match entry.name() {
                Some(n) => n,
                None => return git2::TreeWalkResult::Ok,
            };

            // `dir` is either empty or ends with '/'
            let repo_path = format!("{}{}", dir, name);
            let rel_path = if prefix.is_empty() {
                repo_path
            } else {
                match repo_path
                    .strip_prefix(prefix)
                    .and_then(|rest| rest.strip_prefix('/'))
                {
                    Some(rest) => rest.to_string(),
                    None => return git2::TreeWalkResult::Ok,
                }
            };

            if !has_matching_extension(&rel_path, extensions) || filter.is_ignored(&rel_path) {
                return git2::TreeWalkResult::Ok;
            }

            entries.push((rel_path, entry.id()));
            git2::TreeWalkResult::Ok
        })?;

        // Pass 2: read blobs
        let mut files = Vec::with_capacity(entries.len());
        for (rel_path, oid) in entries {
            if let Ok(blob) = self.repo.find_blob(oid) {
                if blob.is_binary() {
                    continue;
                }
                match std::str::from_utf8(blob.content()) {
                    Ok(content) => files.push((rel_path, content.to_string())),
                    Err(_) => debug!("skipping non-UTF-8 blob {} at {}", rel_path, ref_spec),
                }
            }
        }

        debug!("read {} source files at {}", files.len(), ref_spec);
        Ok(files)
    }

    /// Full hash of the commit `ref_spec` points to
    pub fn commit_hash(&self, ref_spec: &str) -> Result<String> {
        let obj = self
            .repo
            .revparse_single(ref_spec)
            .with_context(|| format!("Failed to resolve git ref '{}'", ref_spec))?;
        let commit = obj
            .peel_to_commit()
            .with_context(|| format!("'{}' does not point to a commit", ref_spec))?;
        Ok(commit.id().to_string())
    }

    fn resolve_tree(&self, spec: &str) -> Result<git2::Tree<'_>> {
        let obj = self
            .repo
            .revparse_single(spec)
            .with_context(|| format!("Failed to resolve git ref '{}'", spec))?;
        let commit = obj
            .peel_to_commit()
            .with_context(|| format!("'{}' does not point to a commit", spec))?;
        commit.tree().context("Failed to get tree from commit")
    }
}

fn has_matching_extension(path: &str, extensions: &[&str]) -> bool {
    match path.rfind('.') {
        Some(dot) if !path[dot..].contains('/') => extensions.contains(&&path[dot..]),
        _ => false,
    }
}
