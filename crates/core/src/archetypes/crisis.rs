//! The Crisis Point: a function history keeps fixing

use super::{Archetype, ArchetypeDetail, ArchetypeDetector, ClassifyContext, Detection};
use crate::graph::{CallGraph, FunctionNode};
use crate::stats::{normalize, GraphStats};

const MIN_COMMITS: usize = 5;
const MIN_FIX_RATIO: f64 = 0.4;

pub struct CrisisPointDetector;

impl CrisisPointDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CrisisPointDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchetypeDetector for CrisisPointDetector {
    fn archetype(&self) -> Archetype {
        Archetype::CrisisPoint
    }

    fn detect(
        &self,
        node: &FunctionNode,
        _graph: &CallGraph,
        _stats: &GraphStats,
        ctx: &ClassifyContext<'_>,
    ) -> Option<Detection> {
        let metrics = ctx.git?.metrics(node.id())?;
        let ratio = metrics.fix_ratio();
        if metrics.commits < MIN_COMMITS || ratio < MIN_FIX_RATIO {
            return None;
        }

        let mut reasons = vec![format!(
            "{} of the {} commits touching it were fixes ({:.0}%)",
            metrics.fix_commits,
            metrics.commits,
            ratio * 100.0
        )];
        if metrics.authors.len() > 2 {
            reasons.push(format!(
                "Changed by {} different authors",
                metrics.authors.len()
            ));
        }

        let confidence = 0.4 + 0.6 * normalize(ratio, MIN_FIX_RATIO, 1.0);
        Some(
            Detection::new(confidence, reasons).with_detail(ArchetypeDetail::CrisisPoint {
                commits: metrics.commits,
                fix_commits: metrics.fix_commits,
                authors: metrics.authors.len(),
            }),
        )
    }
}
