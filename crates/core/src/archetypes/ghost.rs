//! The Ghost: substantial code that only one or two callers ever reach

use super::{distinct_callers, Archetype, ArchetypeDetector, ClassifyContext, Detection};
use crate::graph::{CallGraph, FunctionNode};
use crate::stats::{normalize, GraphStats};

pub struct GhostDetector;

impl GhostDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GhostDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchetypeDetector for GhostDetector {
    fn archetype(&self) -> Archetype {
        Archetype::Ghost
    }

    fn detect(
        &self,
        node: &FunctionNode,
        graph: &CallGraph,
        stats: &GraphStats,
        _ctx: &ClassifyContext<'_>,
    ) -> Option<Detection> {
        let m = graph.metrics(node.id())?;
        if !(1..=2).contains(&m.fan_in) {
            return None;
        }
        let complexity = m.complexity as f64;
        let loc = m.lines_of_code as f64;
        if complexity < stats.complexity.p50 && loc < stats.lines_of_code.p50 {
            return None;
        }

        let callers = distinct_callers(graph, node.id());
        let reasons = vec![
            format!("Only reached from: {}", callers.join(", ")),
            format!(
                "Complexity {} over {} lines for a single path of use",
                m.complexity, m.lines_of_code
            ),
        ];
        let confidence =
            0.4 + 0.4 * normalize(complexity, stats.complexity.p50, stats.complexity.max);
        Some(Detection::new(confidence, reasons))
    }
}
