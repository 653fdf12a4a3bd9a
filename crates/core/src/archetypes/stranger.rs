//! The Stranger: lives in one module, works almost entirely for others

use super::{Archetype, ArchetypeDetector, ClassifyContext, Detection};
use crate::graph::{CallGraph, FunctionNode};
use crate::stats::{normalize, GraphStats};

const MIN_FAN_OUT: usize = 3;
const MIN_RATIO: f64 = 0.75;
const CROSS_FLOOR: f64 = 2.0;

pub struct StrangerDetector;

impl StrangerDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StrangerDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchetypeDetector for StrangerDetector {
    fn archetype(&self) -> Archetype {
        Archetype::Stranger
    }

    fn detect(
        &self,
        node: &FunctionNode,
        graph: &CallGraph,
        stats: &GraphStats,
        _ctx: &ClassifyContext<'_>,
    ) -> Option<Detection> {
        let m = graph.metrics(node.id())?;
        if m.fan_out < MIN_FAN_OUT || m.cross_module_ratio < MIN_RATIO {
            return None;
        }

        let confidence = m.cross_module_ratio
            * normalize(
                m.cross_module_fan_out as f64,
                CROSS_FLOOR,
                stats.cross_module_fan_out.max,
            );
        let reasons = vec![
            format!(
                "{:.0}% of its calls leave module '{}'",
                m.cross_module_ratio * 100.0,
                node.module()
            ),
            "Possibly belongs in another module".to_string(),
        ];
        Some(Detection::new(confidence, reasons))
    }
}
