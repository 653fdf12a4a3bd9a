//! Maps commits onto functions and aggregates per-function history
//!
//! A commit touches a function when one of its changed line ranges overlaps
//! the function's span in the analysed snapshot. Functions touched by the
//! same commit co-change; the co-change counts feed the Codependent archetype.

use super::history::Commit;
use crate::graph::{CallGraph, FunctionNode};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

/// Per-function history aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GitMetrics {
    pub commits: usize,
    pub fix_commits: usize,
    pub authors: BTreeSet<String>,
    pub first_seen: i64,
    pub last_seen: i64,
    /// other function id -> commits touching both
    pub co_commits: BTreeMap<String, usize>,
}

impl GitMetrics {
    pub fn fix_ratio(&self) -> f64 {
        if self.commits == 0 {
            return 0.0;
        }
        self.fix_commits as f64 / self.commits as f64
    }
}

/// Lookup from the paths a commit may use to the graph's relative paths.
///
/// Each file is registered under its absolute path, its path relative to the
/// analysis root and its path relative to the repository root, so the two
/// roots may differ (analysing a subdirectory of a repository).
#[derive(Debug, Default)]
pub struct FileIndex {
    keys: BTreeMap<String, String>,
}

impl FileIndex {
    pub fn build(graph: &CallGraph, analysis_root: &Path, repo_root: &Path) -> Self {
        let mut keys = BTreeMap::new();

        for rel in graph.files() {
            let absolute = analysis_root.join(rel);
            keys.insert(path_key(&absolute), rel.to_string());
            keys.insert(rel.to_string(), rel.to_string());
            if let Ok(from_repo) = absolute.strip_prefix(repo_root) {
                keys.insert(path_key(from_repo), rel.to_string());
            }
        }

        Self { keys }
    }

    /// Graph-relative path for a commit path. Falls back to suffix matching
    /// in either direction when no key matches exactly.
    pub fn resolve(&self, file: &str) -> Option<&str> {
        if let Some(rel) = self.keys.get(file) {
            return Some(rel.as_str());
        }

        let suffix = format!("/{}", file);
        self.keys
            .iter()
            .find(|(key, _)| key.ends_with(&suffix) || file.ends_with(&format!("/{}", key)))
            .map(|(_, rel)| rel.as_str())
    }
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Strongest co-change partner of a function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partner {
    pub id: String,
    pub correlation: f64,
    pub co_commits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    pub id: String,
    pub commits: usize,
    pub fix_commits: usize,
    pub authors: usize,
}

/// Totals over the analysed commit window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GitSummary {
    pub commits_analyzed: usize,
    pub fix_commits: usize,
    /// Commits that touched too many functions to count co-changes
    pub broad_commits: usize,
    pub functions_touched: usize,
}

/// History correlated with one graph snapshot
#[derive(Debug, Clone, Default, Serialize)]
pub struct GitAnalysis {
    metrics: BTreeMap<String, GitMetrics>,
    summary: GitSummary,
}

impl GitAnalysis {
    /// Map every commit onto the graph and aggregate.
    ///
    /// Co-change pairs are not counted for a commit touching more than
    /// `max_functions_per_commit` functions.
    pub fn correlate(
        graph: &CallGraph,
        index: &FileIndex,
        commits: &[Commit],
        max_functions_per_commit: usize,
    ) -> Self {
        let mut by_file: BTreeMap<&str, Vec<&FunctionNode>> = BTreeMap::new();
        for node in graph.functions() {
            by_file.entry(node.rel_path()).or_default().push(node);
        }

        let mut analysis = GitAnalysis::default();

        for commit in commits {
            let touched = touched_functions(commit, index, &by_file);
            analysis.summary.commits_analyzed += 1;
            if commit.is_fix {
                analysis.summary.fix_commits += 1;
            }
            if touched.is_empty() {
                continue;
            }

            for id in &touched {
                let m = analysis.metrics.entry((*id).to_string()).or_default();
                if m.commits == 0 {
                    m.first_seen = commit.date;
                    m.last_seen = commit.date;
                }
                m.commits += 1;
                if commit.is_fix {
                    m.fix_commits += 1;
                }
                m.authors.insert(commit.author.clone());
                m.first_seen = m.first_seen.min(commit.date);
                m.last_seen = m.last_seen.max(commit.date);
            }

            if touched.len() > max_functions_per_commit {
                debug!(
                    "commit {} touches {} functions, skipping co-change",
                    commit.hash,
                    touched.len()
                );
                analysis.summary.broad_commits += 1;
                continue;
            }

            for a in &touched {
                for b in &touched {
                    if a == b {
                        continue;
                    }
                    if let Some(m) = analysis.metrics.get_mut(*a) {
                        *m.co_commits.entry((*b).to_string()).or_insert(0) += 1;
                    }
                }
            }
        }

        analysis.summary.functions_touched = analysis.metrics.len();
        info!(
            "git: {} commits ({} fixes) touched {} functions",
            analysis.summary.commits_analyzed,
            analysis.summary.fix_commits,
            analysis.summary.functions_touched
        );
        analysis
    }

    pub fn metrics(&self, id: &str) -> Option<&GitMetrics> {
        self.metrics.get(id)
    }

    pub fn summary(&self) -> &GitSummary {
        &self.summary
    }

    /// `co_commits(a, b) / min(commits(a), commits(b))`, 0 when unknown
    pub fn correlation(&self, a: &str, b: &str) -> f64 {
        let (Some(ma), Some(mb)) = (self.metrics.get(a), self.metrics.get(b)) else {
            return 0.0;
        };
        let co = ma.co_commits.get(b).copied().unwrap_or(0);
        let base = ma.commits.min(mb.commits);
        if base == 0 {
            return 0.0;
        }
        co as f64 / base as f64
    }

    /// Partner with the highest correlation among those sharing at least
    /// `min_co_commits` commits. Ties keep the first partner in id order.
    pub fn strongest_partner(&self, id: &str, min_co_commits: usize) -> Option<Partner> {
        let metrics = self.metrics.get(id)?;
        let mut best: Option<Partner> = None;

        for (other, &count) in &metrics.co_commits {
            if count < min_co_commits {
                continue;
            }
            let correlation = self.correlation(id, other);
            if best.as_ref().map_or(true, |b| correlation > b.correlation) {
                best = Some(Partner {
                    id: other.clone(),
                    correlation,
                    co_commits: count,
                });
            }
        }

        best
    }

    /// Most bug-prone functions: by fix commits, then commits, then id
    pub fn hotspots(&self, limit: usize) -> Vec<Hotspot> {
        let mut spots: Vec<Hotspot> = self
            .metrics
            .iter()
            .map(|(id, m)| Hotspot {
                id: id.clone(),
                commits: m.commits,
                fix_commits: m.fix_commits,
                authors: m.authors.len(),
            })
            .collect();
        spots.sort_by(|a, b| {
            b.fix_commits
                .cmp(&a.fix_commits)
                .then(b.commits.cmp(&a.commits))
                .then_with(|| a.id.cmp(&b.id))
        });
        spots.truncate(limit);
        spots
    }
}

fn touched_functions<'g>(
    commit: &Commit,
    index: &FileIndex,
    by_file: &BTreeMap<&str, Vec<&'g FunctionNode>>,
) -> BTreeSet<&'g str> {
    let mut touched = BTreeSet::new();
    for change in &commit.changes {
        let Some(rel) = index.resolve(&change.file) else {
            continue;
        };
        let Some(functions) = by_file.get(rel) else {
            continue;
        };
        for node in functions {
            if change.ranges.iter().any(|r| node.overlaps(r.start, r.end)) {
                touched.insert(node.id());
            }
        }
    }
    touched
}
