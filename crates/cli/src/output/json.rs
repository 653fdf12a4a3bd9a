//! JSON output formatting

use faultline_core::archetypes::Classification;
use faultline_core::clusters::Cluster;
use faultline_core::git::{GitSummary, Hotspot};
use faultline_core::graph::FunctionMetrics;
use faultline_core::{AnalysisReport, AnalysisSummary, BridgeNode, DiffResult, GraphStats};
use serde::Serialize;

/// Hotspots listed in JSON output
const JSON_HOTSPOTS: usize = 25;

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub summary: &'a AnalysisSummary,
    pub stats: &'a GraphStats,
    pub functions: Vec<JsonFunction<'a>>,
    pub clusters: &'a [Cluster],
    pub bridges: &'a [BridgeNode],
    pub git: Option<JsonGit<'a>>,
    pub parse_errors: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct JsonFunction<'a> {
    pub id: &'a str,
    pub name: String,
    pub file: &'a str,
    pub line: usize,
    pub end_line: usize,
    pub module: &'a str,
    pub metrics: FunctionMetrics,
    pub archetypes: &'a [Classification],
}

#[derive(Debug, Serialize)]
pub struct JsonGit<'a> {
    pub summary: &'a GitSummary,
    pub hotspots: Vec<Hotspot>,
}

#[derive(Debug, Serialize)]
pub struct JsonDiff<'a> {
    pub version: &'static str,
    #[serde(flatten)]
    pub result: &'a DiffResult,
}

pub fn build_report(report: &AnalysisReport) -> JsonReport<'_> {
    let graph = report.graph();
    let functions = graph
        .functions()
        .filter_map(|node| {
            let metrics = graph.metrics(node.id())?;
            Some(JsonFunction {
                id: node.id(),
                name: node.qualified_name(),
                file: node.rel_path(),
                line: node.line(),
                end_line: node.end_line(),
                module: node.module(),
                metrics,
                archetypes: report
                    .classifications()
                    .get(node.id())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]),
            })
        })
        .collect();

    JsonReport {
        version: faultline_core::VERSION,
        summary: report.summary(),
        stats: report.stats(),
        functions,
        clusters: report.clusters(),
        bridges: report.bridges(),
        git: report.git().map(|git| JsonGit {
            summary: git.summary(),
            hotspots: git.hotspots(JSON_HOTSPOTS),
        }),
        parse_errors: report.parse_errors(),
    }
}

pub fn render_report(report: &AnalysisReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&build_report(report))
}

pub fn render_diff(result: &DiffResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonDiff {
        version: faultline_core::VERSION,
        result,
    })
}
