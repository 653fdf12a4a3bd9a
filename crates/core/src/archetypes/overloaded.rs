//! The Overloaded: too many parameters on top of real work

use super::{Archetype, ArchetypeDetector, ClassifyContext, Detection};
use crate::graph::{CallGraph, FunctionNode};
use crate::stats::{normalize, GraphStats};

const MIN_PARAMS: f64 = 4.0;

pub struct OverloadedDetector;

impl OverloadedDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OverloadedDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchetypeDetector for OverloadedDetector {
    fn archetype(&self) -> Archetype {
        Archetype::Overloaded
    }

    fn detect(
        &self,
        node: &FunctionNode,
        graph: &CallGraph,
        stats: &GraphStats,
        _ctx: &ClassifyContext<'_>,
    ) -> Option<Detection> {
        let m = graph.metrics(node.id())?;
        let params = m.params as f64;
        let complexity = m.complexity as f64;
        let fan_out = m.fan_out as f64;

        let threshold = stats.params.p90.max(MIN_PARAMS);
        if params < threshold {
            return None;
        }
        let busy = complexity >= stats.complexity.p75 || fan_out >= stats.fan_out.p75;
        if !busy {
            return None;
        }

        let reasons = vec![
            format!("Takes {} parameters (p90 is {:.0})", m.params, stats.params.p90),
            format!(
                "Also carries complexity {} and {} outgoing calls",
                m.complexity, m.fan_out
            ),
        ];
        let confidence = 0.5 * normalize(params, stats.params.p50, stats.params.max)
            + 0.3 * normalize(complexity, stats.complexity.p50, stats.complexity.max)
            + 0.2 * normalize(fan_out, stats.fan_out.p50, stats.fan_out.max);

        Some(Detection::new(confidence, reasons))
    }
}
