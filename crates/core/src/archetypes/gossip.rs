//! The Gossip: talks to other modules more than to its own

use super::{Archetype, ArchetypeDetector, ClassifyContext, Detection};
use crate::graph::{CallGraph, FunctionNode};
use crate::stats::{normalize, GraphStats};
use std::collections::BTreeSet;

const MIN_CROSS_MODULE_FAN_OUT: f64 = 3.0;
const HIGH_RATIO: f64 = 0.8;
const MIN_FAN_OUT: usize = 3;

pub struct GossipDetector;

impl GossipDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GossipDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchetypeDetector for GossipDetector {
    fn archetype(&self) -> Archetype {
        Archetype::Gossip
    }

    fn detect(
        &self,
        node: &FunctionNode,
        graph: &CallGraph,
        stats: &GraphStats,
        _ctx: &ClassifyContext<'_>,
    ) -> Option<Detection> {
        let m = graph.metrics(node.id())?;
        let cross = m.cross_module_fan_out as f64;
        let threshold = stats.cross_module_fan_out.p90.max(MIN_CROSS_MODULE_FAN_OUT);

        let by_count = cross >= threshold;
        let by_ratio = m.cross_module_ratio >= HIGH_RATIO && m.fan_out >= MIN_FAN_OUT;
        if !by_count && !by_ratio {
            return None;
        }

        let targets: BTreeSet<&str> = graph
            .callees(node.id())
            .filter(|e| e.is_cross_module())
            .filter_map(|e| e.to())
            .filter_map(|to| graph.module_of(to))
            .collect();

        let mut reasons = vec![format!(
            "{} of its {} calls cross into other modules ({:.0}%)",
            m.cross_module_fan_out,
            m.fan_out,
            m.cross_module_ratio * 100.0
        )];
        if !targets.is_empty() {
            reasons.push(format!(
                "Reaches into: {}",
                targets.into_iter().collect::<Vec<_>>().join(", ")
            ));
        }

        let confidence = 0.6 * normalize(cross, 0.0, stats.cross_module_fan_out.max)
            + 0.4 * m.cross_module_ratio;
        Some(Detection::new(confidence, reasons))
    }
}
