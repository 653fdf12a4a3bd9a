//! The Bridge: the sole or dominant connector between two modules

use super::{Archetype, ArchetypeDetail, ArchetypeDetector, ClassifyContext, Detection};
use crate::bridges::MIN_BRIDGE_SCORE;
use crate::graph::{CallGraph, FunctionNode};
use crate::stats::GraphStats;

pub struct BridgeDetector;

impl BridgeDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BridgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchetypeDetector for BridgeDetector {
    fn archetype(&self) -> Archetype {
        Archetype::Bridge
    }

    fn detect(
        &self,
        node: &FunctionNode,
        _graph: &CallGraph,
        _stats: &GraphStats,
        ctx: &ClassifyContext<'_>,
    ) -> Option<Detection> {
        let bridge = ctx.bridges.get(node.id())?;
        if bridge.score < MIN_BRIDGE_SCORE {
            return None;
        }

        let reasons = bridge
            .pairs
            .iter()
            .map(|p| {
                let sharing = (1.0 / p.exclusivity).round() as usize;
                if sharing <= 1 {
                    format!("Only path from {} to {}", p.from_module, p.to_module)
                } else {
                    format!(
                        "One of {} paths from {} to {}",
                        sharing, p.from_module, p.to_module
                    )
                }
            })
            .collect();

        Some(
            Detection::new(bridge.score, reasons).with_detail(ArchetypeDetail::Bridge {
                pairs: bridge.pairs.clone(),
            }),
        )
    }
}
