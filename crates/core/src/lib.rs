//! Faultline Core - call-graph health analysis for JavaScript and TypeScript
//!
//! This crate provides the analysis engine behind faultline:
//! - AST parsing via Tree-sitter and cross-file call resolution
//! - An immutable call graph with fan-in/fan-out metrics
//! - Percentile statistics and archetype classification
//! - Cluster and bridge detection
//! - Git history correlation and ref-to-ref diffs

pub mod analysis;
pub mod archetypes;
pub mod bridges;
pub mod clusters;
pub mod config;
pub mod diff;
pub mod discovery;
pub mod git;
pub mod graph;
pub mod parser;
pub mod stats;

pub use analysis::{analyze_path, analyze_sources, AnalysisReport, AnalysisSummary};
pub use archetypes::{Archetype, ArchetypeDetail, Classification, Classifier, ClassifyContext};
pub use bridges::{detect_bridges, BridgeNode, BridgePair};
pub use clusters::{Cluster, ClusterDetector};
pub use config::FaultlineConfig;
pub use diff::{diff_refs, DiffEngine, DiffError, DiffResult, DiffSummary, FunctionDiff, RefRange};
pub use discovery::discover_files;
pub use git::{CommitCache, Git2History, GitAnalysis, HistoryError, HistorySource};
pub use graph::{CallEdge, CallGraph, FunctionNode, GraphBuilder, ResolutionStrategy};
pub use parser::{FileExtraction, LanguageParser, ParseError, ParserDispatcher};
pub use stats::{Distribution, GraphStats};

/// Faultline version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
