//! The Hermit: nothing in the analysed code calls it

use super::{Archetype, ArchetypeDetector, ClassifyContext, Detection};
use crate::graph::{CallGraph, FunctionKind, FunctionNode};
use crate::stats::{normalize, GraphStats};
use regex::Regex;
use std::sync::OnceLock;

/// Confidence ceiling for functions that are plausibly invoked from outside
const ENTRY_POINT_CAP: f64 = 0.3;

fn entry_point_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"^(main|init|setup|bootstrap|start|run|default|handler|middleware)$",
            r"^(handle|on|route)[A-Z_]",
            r"(?i)^(get|post|put|patch|delete|head|options|all)$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid entry point pattern"))
        .collect()
    })
}

/// Whether a function looks like something a framework or runtime calls
pub fn is_entry_point(node: &FunctionNode) -> bool {
    node.kind() == FunctionKind::Anonymous
        || entry_point_patterns()
            .iter()
            .any(|re| re.is_match(node.name()))
}

pub struct HermitDetector;

impl HermitDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HermitDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchetypeDetector for HermitDetector {
    fn archetype(&self) -> Archetype {
        Archetype::Hermit
    }

    fn detect(
        &self,
        node: &FunctionNode,
        graph: &CallGraph,
        stats: &GraphStats,
        _ctx: &ClassifyContext<'_>,
    ) -> Option<Detection> {
        if graph.fan_in(node.id()) > 0 {
            return None;
        }

        let loc = node.lines_of_code() as f64;
        let mut confidence =
            0.6 + 0.4 * normalize(loc, stats.lines_of_code.p50, stats.lines_of_code.max);
        let mut reasons = vec!["No calls to it were found in the analysed code".to_string()];

        if is_entry_point(node) {
            confidence = confidence.min(ENTRY_POINT_CAP);
            let why = if node.kind() == FunctionKind::Anonymous {
                "Anonymous callback, likely invoked by a framework or runtime"
            } else {
                "Name suggests an entry point that may be invoked from outside"
            };
            reasons.push(why.to_string());
        } else {
            reasons.push(format!(
                "{} lines that may be dead code",
                node.lines_of_code()
            ));
        }

        Some(Detection::new(confidence, reasons))
    }
}
