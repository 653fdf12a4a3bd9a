//! Per-function snapshots used to compare two analyses

use crate::analysis::AnalysisReport;
use crate::archetypes::Archetype;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// What a diff needs to know about one function at one ref
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    /// `relPath::qualifiedName`, stable across refs
    pub key: String,
    /// Graph id within its own analysis
    pub id: String,
    pub rel_path: String,
    pub module: String,
    pub line: usize,
    pub complexity: usize,
    pub fan_in: usize,
    pub fan_out: usize,
    pub cross_module_fan_out: usize,
    pub lines_of_code: usize,
    pub archetypes: BTreeSet<Archetype>,
}

/// Snapshot every function of a report, keyed by `relPath::qualifiedName`.
///
/// Functions sharing a qualified name within one file keep their source
/// order: the second becomes `key#2`, the third `key#3`.
pub fn snapshot_report(report: &AnalysisReport) -> BTreeMap<String, NodeSnapshot> {
    let graph = report.graph();
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut snapshots = BTreeMap::new();

    for node in graph.functions() {
        let base = format!("{}::{}", node.rel_path(), node.qualified_name());
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;
        let key = if *count == 1 {
            base
        } else {
            format!("{}#{}", base, count)
        };

        let archetypes = report
            .classifications()
            .get(node.id())
            .map(|list| list.iter().map(|c| c.archetype).collect())
            .unwrap_or_default();

        snapshots.insert(
            key.clone(),
            NodeSnapshot {
                key,
                id: node.id().to_string(),
                rel_path: node.rel_path().to_string(),
                module: node.module().to_string(),
                line: node.line(),
                complexity: node.complexity(),
                fan_in: graph.fan_in(node.id()),
                fan_out: graph.fan_out(node.id()),
                cross_module_fan_out: graph.cross_module_fan_out(node.id()),
                lines_of_code: node.lines_of_code(),
                archetypes,
            },
        );
    }

    snapshots
}
