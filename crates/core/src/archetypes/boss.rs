//! The Boss: a function a large share of the code base calls into

use super::{distinct_callers, Archetype, ArchetypeDetector, ClassifyContext, Detection};
use crate::graph::{CallGraph, FunctionNode};
use crate::stats::{normalize, GraphStats};
use std::collections::BTreeSet;

/// Absolute floor under the p95 fan-in threshold, so small code bases do
/// not crown a boss with a handful of callers
const MIN_FAN_IN: f64 = 5.0;

pub struct BossDetector;

impl BossDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BossDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchetypeDetector for BossDetector {
    fn archetype(&self) -> Archetype {
        Archetype::Boss
    }

    fn detect(
        &self,
        node: &FunctionNode,
        graph: &CallGraph,
        stats: &GraphStats,
        _ctx: &ClassifyContext<'_>,
    ) -> Option<Detection> {
        let m = graph.metrics(node.id())?;
        let threshold = stats.fan_in.p95.max(MIN_FAN_IN);
        let fan_in = m.fan_in as f64;
        if fan_in < threshold {
            return None;
        }

        let confidence = 0.5 + 0.5 * normalize(fan_in, threshold, stats.fan_in.max);
        let mut reasons = vec![format!(
            "Called from {} call sites (p95 for this code base is {:.0})",
            m.fan_in, stats.fan_in.p95
        )];

        if m.fan_out * 3 <= m.fan_in {
            reasons.push(format!(
                "Delegates little: calls {} functions itself while {} calls depend on it",
                m.fan_out, m.fan_in
            ));
        }

        let callers = distinct_callers(graph, node.id());
        let caller_modules: BTreeSet<&str> = callers
            .iter()
            .filter_map(|c| graph.module_of(c))
            .collect();
        if caller_modules.len() > 1 {
            reasons.push(format!(
                "Callers span {} modules: {}",
                caller_modules.len(),
                caller_modules.into_iter().collect::<Vec<_>>().join(", ")
            ));
        }

        let reach = graph.query().transitive_callers(node.id(), None).len();
        if reach > callers.len() {
            reasons.push(format!("{} functions reach it transitively", reach));
        }

        Some(Detection::new(confidence, reasons))
    }
}
