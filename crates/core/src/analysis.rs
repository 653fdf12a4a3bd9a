//! End-to-end analysis pipeline
//!
//! discovery → parse → build graph → stats → clusters → bridges →
//! git correlation → classification. One call owns one [`CallGraph`];
//! nothing is shared between runs except the commit cache.

use crate::archetypes::{Archetype, Classification, Classifier, ClassifyContext};
use crate::bridges::{detect_bridges, BridgeNode};
use crate::clusters::{Cluster, ClusterDetector};
use crate::config::FaultlineConfig;
use crate::discovery::discover_files;
use crate::git::{CommitCache, FileIndex, Git2History, GitAnalysis, HistorySource};
use crate::graph::builder::strategy_counts;
use crate::graph::{CallGraph, GraphBuilder, ResolutionStrategy};
use crate::parser::{FileExtraction, ParserDispatcher};
use crate::stats::GraphStats;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Headline numbers for one analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub files: usize,
    pub parse_failures: usize,
    pub functions: usize,
    pub edges: usize,
    pub resolved_edges: usize,
    pub unresolved_edges: usize,
    pub cross_module_edges: usize,
    pub modules: usize,
    pub resolution: BTreeMap<ResolutionStrategy, usize>,
    pub archetypes: BTreeMap<Archetype, usize>,
    pub clusters: usize,
    pub multi_module_clusters: usize,
    pub bridges: usize,
}

/// Everything one run produces
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    summary: AnalysisSummary,
    stats: GraphStats,
    classifications: BTreeMap<String, Vec<Classification>>,
    clusters: Vec<Cluster>,
    bridges: Vec<BridgeNode>,
    git: Option<GitAnalysis>,
    parse_errors: Vec<String>,
    graph: CallGraph,
}

impl AnalysisReport {
    pub fn graph(&self) -> &CallGraph {
        &self.graph
    }

    pub fn stats(&self) -> &GraphStats {
        &self.stats
    }

    /// Archetype matches per function id (empty list when none matched)
    pub fn classifications(&self) -> &BTreeMap<String, Vec<Classification>> {
        &self.classifications
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn bridges(&self) -> &[BridgeNode] {
        &self.bridges
    }

    /// `None` when history was disabled or unavailable
    pub fn git(&self) -> Option<&GitAnalysis> {
        self.git.as_ref()
    }

    pub fn summary(&self) -> &AnalysisSummary {
        &self.summary
    }

    pub fn parse_errors(&self) -> &[String] {
        &self.parse_errors
    }

    /// Function ids matching `archetype`, highest confidence first
    pub fn with_archetype(&self, archetype: Archetype) -> Vec<(&str, &Classification)> {
        let mut matches: Vec<(&str, &Classification)> = self
            .classifications
            .iter()
            .filter_map(|(id, list)| {
                list.iter()
                    .find(|c| c.archetype == archetype)
                    .map(|c| (id.as_str(), c))
            })
            .collect();
        matches.sort_by(|a, b| b.1.confidence.total_cmp(&a.1.confidence).then_with(|| a.0.cmp(b.0)));
        matches
    }
}

/// Analyse the working tree under `root`
pub fn analyze_path(
    root: &Path,
    config: &FaultlineConfig,
    cache: &CommitCache,
) -> Result<AnalysisReport> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", root.display()))?;
    let dispatcher = ParserDispatcher::new();

    let files = discover_files(&root, &dispatcher.supported_extensions(), &config.ignore.paths)
        .context("Failed to discover source files")?;
    info!("discovered {} source files under {}", files.len(), root.display());

    let (extractions, errors) = dispatcher.parse_files_parallel(&root, &files);

    let history = if config.git.enabled {
        match Git2History::discover(&root) {
            Ok(history) => Some(history),
            Err(e) => {
                debug!("no git history: {}", e);
                None
            }
        }
    } else {
        None
    };

    Ok(build_report(
        &root,
        extractions,
        errors,
        history.as_ref().map(|h| h as &dyn HistorySource),
        config,
        cache,
    ))
}

/// Analyse in-memory `(relative path, source)` pairs
///
/// `root` is where the sources notionally live; it anchors repository
/// relative paths when `history` is given.
pub fn analyze_sources(
    root: &Path,
    sources: &[(String, String)],
    history: Option<&dyn HistorySource>,
    config: &FaultlineConfig,
    cache: &CommitCache,
) -> AnalysisReport {
    let dispatcher = ParserDispatcher::new();
    let (extractions, errors) = dispatcher.parse_sources_parallel(sources);
    build_report(root, extractions, errors, history, config, cache)
}

fn build_report(
    root: &Path,
    extractions: Vec<FileExtraction>,
    parse_errors: Vec<String>,
    history: Option<&dyn HistorySource>,
    config: &FaultlineConfig,
    cache: &CommitCache,
) -> AnalysisReport {
    let files = extractions.len();
    let graph = GraphBuilder::new(root).build(extractions);
    let stats = GraphStats::compute(&graph);

    let clusters =
        ClusterDetector::new(config.clusters.min_size, config.clusters.max_iterations).detect(&graph);
    let bridges = detect_bridges(&graph);

    let git = history.and_then(|source| correlate_history(&graph, root, source, config, cache));

    let ctx = ClassifyContext::new(git.as_ref(), &bridges, config.git.min_co_commits);
    let classifier = Classifier::new().without(&config.disabled_archetypes());
    let classifications = classifier.classify(&graph, &stats, &ctx);

    let mut archetypes = BTreeMap::new();
    for list in classifications.values() {
        for c in list {
            *archetypes.entry(c.archetype).or_insert(0) += 1;
        }
    }

    let resolved_edges = graph.resolved_edges().count();
    let summary = AnalysisSummary {
        files,
        parse_failures: parse_errors.len(),
        functions: graph.function_count(),
        edges: graph.edges().len(),
        resolved_edges,
        unresolved_edges: graph.unresolved_count(),
        cross_module_edges: graph.edges().iter().filter(|e| e.is_cross_module()).count(),
        modules: graph.modules().len(),
        resolution: strategy_counts(&graph),
        archetypes,
        clusters: clusters.len(),
        multi_module_clusters: clusters.iter().filter(|c| c.multi_module).count(),
        bridges: bridges.len(),
    };
    info!(
        "analysis complete: {} functions, {} clusters, {} bridges, git {}",
        summary.functions,
        summary.clusters,
        summary.bridges,
        if git.is_some() { "on" } else { "off" }
    );

    AnalysisReport {
        summary,
        stats,
        classifications,
        clusters,
        bridges,
        git,
        parse_errors,
        graph,
    }
}

/// Fetch (or load) history and map it onto the graph. Any failure drops the
/// git-dependent features for this run.
fn correlate_history(
    graph: &CallGraph,
    analysis_root: &Path,
    source: &dyn HistorySource,
    config: &FaultlineConfig,
    cache: &CommitCache,
) -> Option<GitAnalysis> {
    let commits = match cache.load_or_fetch(source, config.git.max_commits) {
        Ok(commits) => commits,
        Err(e) => {
            warn!("git history unavailable, skipping history features: {}", e);
            return None;
        }
    };

    let index = FileIndex::build(graph, analysis_root, source.repo_root());
    Some(GitAnalysis::correlate(
        graph,
        &index,
        &commits,
        config.git.max_functions_per_commit,
    ))
}
