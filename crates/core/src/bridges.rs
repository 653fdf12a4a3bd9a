//! Bridge detection: functions that monopolise a path between two modules
//!
//! For every ordered module pair `(A, B)` the "bridgers" are the functions
//! called from module A that themselves call into module B (A and B both
//! different from the function's own module). A function's exclusivity for a
//! pair is `1 / |bridgers(A, B)|`; the sole bridger of a pair scores 1.

use crate::graph::CallGraph;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Functions scoring below this are not reported
pub const MIN_BRIDGE_SCORE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgePair {
    pub from_module: String,
    pub to_module: String,
    /// `1 / number of functions bridging this pair`
    pub exclusivity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeNode {
    pub id: String,
    pub module: String,
    /// Highest exclusivity over all bridged pairs
    pub score: f64,
    /// Pairs with exclusivity >= 0.5, highest first
    pub pairs: Vec<BridgePair>,
}

#[derive(Default)]
struct ExternalModules<'g> {
    callers: BTreeSet<&'g str>,
    callees: BTreeSet<&'g str>,
}

pub fn detect_bridges(graph: &CallGraph) -> Vec<BridgeNode> {
    // Pass 1: external caller and callee modules per function
    let mut external: BTreeMap<&str, ExternalModules<'_>> = BTreeMap::new();
    for edge in graph.resolved_edges() {
        let Some(to) = edge.to() else { continue };
        let (Some(from_module), Some(to_module)) = (graph.module_of(edge.from()), graph.module_of(to))
        else {
            continue;
        };
        if from_module == to_module {
            continue;
        }
        external
            .entry(edge.from())
            .or_default()
            .callees
            .insert(to_module);
        external.entry(to).or_default().callers.insert(from_module);
    }

    // Pass 2: bridgers per ordered module pair
    let mut bridgers: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
    for (&node, modules) in &external {
        for &a in &modules.callers {
            for &b in &modules.callees {
                if a != b {
                    bridgers.entry((a, b)).or_default().insert(node);
                }
            }
        }
    }

    // Pass 3: exclusivity
    let mut per_node: BTreeMap<&str, Vec<BridgePair>> = BTreeMap::new();
    for ((a, b), nodes) in &bridgers {
        let exclusivity = 1.0 / nodes.len() as f64;
        for &node in nodes {
            per_node.entry(node).or_default().push(BridgePair {
                from_module: a.to_string(),
                to_module: b.to_string(),
                exclusivity,
            });
        }
    }

    let mut result: Vec<BridgeNode> = per_node
        .into_iter()
        .filter_map(|(id, pairs)| {
            let score = pairs.iter().map(|p| p.exclusivity).fold(0.0, f64::max);
            if score < MIN_BRIDGE_SCORE {
                return None;
            }
            let mut pairs: Vec<BridgePair> = pairs
                .into_iter()
                .filter(|p| p.exclusivity >= MIN_BRIDGE_SCORE)
                .collect();
            pairs.sort_by(|x, y| y.exclusivity.total_cmp(&x.exclusivity));
            Some(BridgeNode {
                id: id.to_string(),
                module: graph.module_of(id).unwrap_or_default().to_string(),
                score,
                pairs,
            })
        })
        .collect();

    result.sort_by(|x, y| y.score.total_cmp(&x.score).then_with(|| x.id.cmp(&y.id)));
    result
}
