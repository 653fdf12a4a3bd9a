//! Archetype classification
//!
//! Each detector is an independent, stateless rule scoring one function
//! against the code base's own percentile thresholds. A function is checked
//! against every enabled detector and may match any number of archetypes.

pub mod boss;
pub mod bridge;
pub mod codependent;
pub mod crisis;
pub mod ghost;
pub mod gossip;
pub mod hermit;
pub mod overloaded;
pub mod stranger;
pub mod workhorse;

use crate::bridges::{BridgeNode, BridgePair};
use crate::git::GitAnalysis;
use crate::graph::{CallGraph, FunctionNode};
use crate::stats::GraphStats;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Boss,
    Workhorse,
    Gossip,
    Hermit,
    Stranger,
    Overloaded,
    Ghost,
    CrisisPoint,
    Codependent,
    Bridge,
}

impl Archetype {
    pub const ALL: [Archetype; 10] = [
        Archetype::Boss,
        Archetype::Workhorse,
        Archetype::Gossip,
        Archetype::Hermit,
        Archetype::Stranger,
        Archetype::Overloaded,
        Archetype::Ghost,
        Archetype::CrisisPoint,
        Archetype::Codependent,
        Archetype::Bridge,
    ];

    /// Identifier used in config files and JSON
    pub fn id(self) -> &'static str {
        match self {
            Archetype::Boss => "boss",
            Archetype::Workhorse => "workhorse",
            Archetype::Gossip => "gossip",
            Archetype::Hermit => "hermit",
            Archetype::Stranger => "stranger",
            Archetype::Overloaded => "overloaded",
            Archetype::Ghost => "ghost",
            Archetype::CrisisPoint => "crisis_point",
            Archetype::Codependent => "codependent",
            Archetype::Bridge => "bridge",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Archetype::Boss => "The Boss",
            Archetype::Workhorse => "The Workhorse",
            Archetype::Gossip => "The Gossip",
            Archetype::Hermit => "The Hermit",
            Archetype::Stranger => "The Stranger",
            Archetype::Overloaded => "The Overloaded",
            Archetype::Ghost => "The Ghost",
            Archetype::CrisisPoint => "The Crisis Point",
            Archetype::Codependent => "The Codependent",
            Archetype::Bridge => "The Bridge",
        }
    }

    /// Parse an id (`crisis_point`) or a label (`The Crisis Point`)
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let wanted = wanted.strip_prefix("the_").unwrap_or(&wanted);
        Self::ALL.into_iter().find(|a| a.id() == wanted)
    }

    /// Archetypes whose appearance on a function signals added risk
    pub fn is_concerning(self) -> bool {
        matches!(
            self,
            Archetype::Boss
                | Archetype::Workhorse
                | Archetype::Gossip
                | Archetype::Stranger
                | Archetype::Overloaded
                | Archetype::CrisisPoint
                | Archetype::Codependent
        )
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Archetype-specific payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArchetypeDetail {
    None,
    Codependent {
        partner: String,
        correlation: f64,
        co_commits: usize,
    },
    CrisisPoint {
        commits: usize,
        fix_commits: usize,
        authors: usize,
    },
    Bridge {
        pairs: Vec<BridgePair>,
    },
}

/// What a detector reports on a match
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub detail: ArchetypeDetail,
}

impl Detection {
    pub fn new(confidence: f64, reasons: Vec<String>) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            confidence,
            reasons,
            detail: ArchetypeDetail::None,
        }
    }

    pub fn with_detail(mut self, detail: ArchetypeDetail) -> Self {
        self.detail = detail;
        self
    }
}

/// One archetype match for one function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub archetype: Archetype,
    pub label: &'static str,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub detail: ArchetypeDetail,
}

impl Classification {
    fn from_detection(archetype: Archetype, detection: Detection) -> Self {
        Self {
            archetype,
            label: archetype.label(),
            confidence: detection.confidence,
            reasons: detection.reasons,
            detail: detection.detail,
        }
    }
}

/// Inputs beyond the graph and its statistics
#[derive(Debug, Clone, Default)]
pub struct ClassifyContext<'a> {
    pub git: Option<&'a GitAnalysis>,
    pub bridges: HashMap<&'a str, &'a BridgeNode>,
    /// Minimum shared commits for a co-change partner
    pub min_co_commits: usize,
}

impl<'a> ClassifyContext<'a> {
    pub fn new(git: Option<&'a GitAnalysis>, bridges: &'a [BridgeNode], min_co_commits: usize) -> Self {
        Self {
            git,
            bridges: bridges.iter().map(|b| (b.id.as_str(), b)).collect(),
            min_co_commits,
        }
    }
}

/// Trait for archetype detectors
pub trait ArchetypeDetector: Send + Sync {
    fn archetype(&self) -> Archetype;

    /// Score `node`, or `None` when it does not qualify
    fn detect(
        &self,
        node: &FunctionNode,
        graph: &CallGraph,
        stats: &GraphStats,
        ctx: &ClassifyContext<'_>,
    ) -> Option<Detection>;
}

/// Runs every enabled detector over every function
pub struct Classifier {
    detectors: Vec<Box<dyn ArchetypeDetector>>,
}

impl Classifier {
    /// Create a classifier with all built-in detectors
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(boss::BossDetector::new()),
                Box::new(workhorse::WorkhorseDetector::new()),
                Box::new(gossip::GossipDetector::new()),
                Box::new(hermit::HermitDetector::new()),
                Box::new(stranger::StrangerDetector::new()),
                Box::new(overloaded::OverloadedDetector::new()),
                Box::new(ghost::GhostDetector::new()),
                Box::new(crisis::CrisisPointDetector::new()),
                Box::new(codependent::CodependentDetector::new()),
                Box::new(bridge::BridgeDetector::new()),
            ],
        }
    }

    /// Drop the detectors for the given archetypes
    pub fn without(mut self, disabled: &[Archetype]) -> Self {
        self.detectors.retain(|d| !disabled.contains(&d.archetype()));
        self
    }

    pub fn archetypes(&self) -> Vec<Archetype> {
        self.detectors.iter().map(|d| d.archetype()).collect()
    }

    /// Matches for one function, highest confidence first
    pub fn classify_node(
        &self,
        node: &FunctionNode,
        graph: &CallGraph,
        stats: &GraphStats,
        ctx: &ClassifyContext<'_>,
    ) -> Vec<Classification> {
        let mut matches: Vec<Classification> = self
            .detectors
            .iter()
            .filter_map(|d| {
                d.detect(node, graph, stats, ctx)
                    .map(|det| Classification::from_detection(d.archetype(), det))
            })
            .collect();
        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        matches
    }

    /// Classification list for every function id (possibly empty)
    pub fn classify(
        &self,
        graph: &CallGraph,
        stats: &GraphStats,
        ctx: &ClassifyContext<'_>,
    ) -> BTreeMap<String, Vec<Classification>> {
        let nodes: Vec<&FunctionNode> = graph.functions().collect();
        nodes
            .par_iter()
            .map(|node| {
                (
                    node.id().to_string(),
                    self.classify_node(node, graph, stats, ctx),
                )
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Ids of the distinct functions calling `id`, in first-call order
pub(crate) fn distinct_callers<'g>(graph: &'g CallGraph, id: &str) -> Vec<&'g str> {
    graph.query().direct_callers(id)
}
