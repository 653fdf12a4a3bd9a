//! Community detection by label propagation
//!
//! Works on the undirected view of resolved calls. Every function starts with
//! its own id as label; each pass visits functions in id order and each takes
//! the most frequent label among its neighbours (smallest label on ties).
//! Stops when a pass changes nothing or after `max_iterations`.

use crate::graph::CallGraph;
use petgraph::graphmap::UnGraphMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

pub const DEFAULT_MIN_SIZE: usize = 3;
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// A group of functions that call each other more than they call the rest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Position after sorting
    pub id: usize,
    /// The propagated label (a member id)
    pub label: String,
    /// Member ids, sorted
    pub members: Vec<String>,
    pub size: usize,
    pub modules: BTreeSet<String>,
    pub multi_module: bool,
    pub internal_edges: usize,
    /// `internal_edges / (n * (n - 1) / 2)`
    pub density: f64,
    /// Up to three members with the highest internal degree
    pub hubs: Vec<String>,
}

pub struct ClusterDetector {
    min_size: usize,
    max_iterations: usize,
}

impl Default for ClusterDetector {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ClusterDetector {
    pub fn new(min_size: usize, max_iterations: usize) -> Self {
        Self {
            min_size,
            max_iterations,
        }
    }

    /// Undirected adjacency over resolved edges, self-calls excluded.
    /// Every function is a node, connected or not.
    fn adjacency<'g>(graph: &'g CallGraph) -> UnGraphMap<&'g str, ()> {
        let mut pairs: BTreeSet<(&str, &str)> = BTreeSet::new();
        for edge in graph.resolved_edges() {
            let Some(to) = edge.to() else { continue };
            let from = edge.from();
            if from == to {
                continue;
            }
            pairs.insert(if from < to { (from, to) } else { (to, from) });
        }

        let nodes: BTreeSet<&str> = graph
            .functions()
            .map(|f| f.id())
            .chain(pairs.iter().flat_map(|&(a, b)| [a, b]))
            .collect();
        let mut adjacency = UnGraphMap::with_capacity(nodes.len(), pairs.len());
        for node in nodes {
            adjacency.add_node(node);
        }
        for (a, b) in pairs {
            adjacency.add_edge(a, b, ());
        }
        adjacency
    }

    /// Final label of every function. Isolated functions keep their own id.
    pub fn propagate<'g>(&self, graph: &'g CallGraph) -> BTreeMap<&'g str, &'g str> {
        let adjacency = Self::adjacency(graph);
        let mut labels: BTreeMap<&str, &str> = adjacency.nodes().map(|n| (n, n)).collect();
        let order: Vec<&str> = labels.keys().copied().collect();

        for pass in 0..self.max_iterations {
            let mut changed = false;

            // Labels update in place, in id order, so a node sees the labels
            // its neighbours already adopted this pass.
            for &node in &order {
                let mut counts: HashMap<&str, usize> = HashMap::new();
                for neighbor in adjacency.neighbors(node) {
                    if let Some(&l) = labels.get(neighbor) {
                        *counts.entry(l).or_insert(0) += 1;
                    }
                }

                let best = counts
                    .into_iter()
                    .max_by(|(la, ca), (lb, cb)| ca.cmp(cb).then_with(|| lb.cmp(la)));
                if let Some((best, _)) = best {
                    if labels.insert(node, best) != Some(best) {
                        changed = true;
                    }
                }
            }

            if !changed {
                debug!("label propagation converged after {} passes", pass + 1);
                break;
            }
        }

        labels
    }

    pub fn detect(&self, graph: &CallGraph) -> Vec<Cluster> {
        let adjacency = Self::adjacency(graph);
        let labels = self.propagate(graph);

        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (&node, &label) in &labels {
            groups.entry(label).or_default().push(node);
        }

        let mut clusters: Vec<Cluster> = groups
            .into_iter()
            .filter(|(_, members)| members.len() >= self.min_size)
            .map(|(label, members)| Self::describe(graph, &adjacency, label, members))
            .collect();

        clusters.sort_by(|a, b| {
            b.multi_module
                .cmp(&a.multi_module)
                .then(b.size.cmp(&a.size))
                .then_with(|| a.label.cmp(&b.label))
        });
        for (idx, cluster) in clusters.iter_mut().enumerate() {
            cluster.id = idx;
        }
        clusters
    }

    fn describe(
        graph: &CallGraph,
        adjacency: &UnGraphMap<&str, ()>,
        label: &str,
        members: Vec<&str>,
    ) -> Cluster {
        let member_set: BTreeSet<&str> = members.iter().copied().collect();

        let degrees: Vec<(&str, usize)> = members
            .iter()
            .map(|&m| {
                let degree = adjacency
                    .neighbors(m)
                    .filter(|n| member_set.contains(n))
                    .count();
                (m, degree)
            })
            .collect();
        let internal_edges = degrees.iter().map(|(_, d)| d).sum::<usize>() / 2;

        let n = members.len();
        let possible = n * n.saturating_sub(1) / 2;
        let density = if possible == 0 {
            0.0
        } else {
            internal_edges as f64 / possible as f64
        };

        let mut ranked = degrees;
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let hubs = ranked.iter().take(3).map(|(m, _)| m.to_string()).collect();

        let modules: BTreeSet<String> = members
            .iter()
            .filter_map(|m| graph.module_of(m))
            .map(str::to_string)
            .collect();

        Cluster {
            id: 0,
            label: label.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
            size: n,
            multi_module: modules.len() > 1,
            modules,
            internal_edges,
            density,
            hubs,
        }
    }
}
