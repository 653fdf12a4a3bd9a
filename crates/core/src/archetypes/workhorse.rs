//! The Workhorse: complex, long and busy all at once

use super::{Archetype, ArchetypeDetector, ClassifyContext, Detection};
use crate::graph::{CallGraph, FunctionNode};
use crate::stats::{normalize, Distribution, GraphStats};

pub struct WorkhorseDetector;

impl WorkhorseDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WorkhorseDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn at_or_above_p85(value: f64, dist: &Distribution) -> bool {
    value > 0.0 && value >= dist.p85
}

impl ArchetypeDetector for WorkhorseDetector {
    fn archetype(&self) -> Archetype {
        Archetype::Workhorse
    }

    fn detect(
        &self,
        node: &FunctionNode,
        graph: &CallGraph,
        stats: &GraphStats,
        _ctx: &ClassifyContext<'_>,
    ) -> Option<Detection> {
        let m = graph.metrics(node.id())?;
        let complexity = m.complexity as f64;
        let fan_out = m.fan_out as f64;
        let loc = m.lines_of_code as f64;

        let mut reasons = Vec::new();
        if at_or_above_p85(complexity, &stats.complexity) {
            reasons.push(format!(
                "Cyclomatic complexity {} (p85 is {:.0})",
                m.complexity, stats.complexity.p85
            ));
        }
        if at_or_above_p85(fan_out, &stats.fan_out) {
            reasons.push(format!(
                "Makes {} calls (p85 is {:.0})",
                m.fan_out, stats.fan_out.p85
            ));
        }
        if at_or_above_p85(loc, &stats.lines_of_code) {
            reasons.push(format!(
                "{} lines long (p85 is {:.0})",
                m.lines_of_code, stats.lines_of_code.p85
            ));
        }
        if reasons.len() < 2 {
            return None;
        }

        let confidence = 0.4 * normalize(complexity, stats.complexity.p85, stats.complexity.max)
            + 0.3 * normalize(fan_out, stats.fan_out.p85, stats.fan_out.max)
            + 0.3 * normalize(loc, stats.lines_of_code.p85, stats.lines_of_code.max);

        Some(Detection::new(confidence, reasons))
    }
}
