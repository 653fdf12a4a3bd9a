//! The Codependent: rarely changes without one particular partner

use super::{Archetype, ArchetypeDetail, ArchetypeDetector, ClassifyContext, Detection};
use crate::graph::{CallGraph, FunctionNode};
use crate::stats::{normalize, GraphStats};

const MIN_CORRELATION: f64 = 0.5;

pub struct CodependentDetector;

impl CodependentDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CodependentDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchetypeDetector for CodependentDetector {
    fn archetype(&self) -> Archetype {
        Archetype::Codependent
    }

    fn detect(
        &self,
        node: &FunctionNode,
        _graph: &CallGraph,
        _stats: &GraphStats,
        ctx: &ClassifyContext<'_>,
    ) -> Option<Detection> {
        let partner = ctx.git?.strongest_partner(node.id(), ctx.min_co_commits)?;
        if partner.correlation < MIN_CORRELATION {
            return None;
        }

        let reasons = vec![format!(
            "Changed together with {} in {} commits ({:.0}% of the less active one's changes)",
            partner.id,
            partner.co_commits,
            partner.correlation * 100.0
        )];
        let confidence = normalize(partner.correlation, MIN_CORRELATION, 1.0);

        Some(
            Detection::new(confidence, reasons).with_detail(ArchetypeDetail::Codependent {
                partner: partner.id,
                correlation: partner.correlation,
                co_commits: partner.co_commits,
            }),
        )
    }
}
