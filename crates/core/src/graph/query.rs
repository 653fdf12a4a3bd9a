//! Graph traversals over resolved call edges

use super::CallGraph;
use std::collections::{HashSet, VecDeque};

/// A query interface for multi-hop graph operations
pub struct GraphQuery<'a> {
    graph: &'a CallGraph,
}

impl<'a> GraphQuery<'a> {
    pub fn new(graph: &'a CallGraph) -> Self {
        Self { graph }
    }

    /// Distinct functions that call `id` directly
    pub fn direct_callers(&self, id: &str) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        self.graph
            .callers(id)
            .map(|e| e.from())
            .filter(|from| seen.insert(*from))
            .collect()
    }

    /// All functions that reach `id` by following calls backwards
    pub fn transitive_callers(&self, id: &str, max_depth: Option<usize>) -> Vec<&'a str> {
        self.walk(id, max_depth, |graph, current| {
            graph.callers(current).map(|e| e.from()).collect()
        })
    }

    /// All functions reachable from `id` through resolved calls
    pub fn transitive_callees(&self, id: &str, max_depth: Option<usize>) -> Vec<&'a str> {
        self.walk(id, max_depth, |graph, current| {
            graph.callees(current).filter_map(|e| e.to()).collect()
        })
    }

    fn walk<F>(&self, start: &str, max_depth: Option<usize>, next: F) -> Vec<&'a str>
    where
        F: Fn(&'a CallGraph, &str) -> Vec<&'a str>,
    {
        let Some(start_node) = self.graph.function(start) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&'a str, usize)> = VecDeque::new();

        visited.insert(start_node.id());
        queue.push_back((start_node.id(), 0));

        while let Some((current, depth)) = queue.pop_front() {
            if let Some(max) = max_depth {
                if depth >= max {
                    continue;
                }
            }

            for neighbor in next(self.graph, current) {
                if visited.insert(neighbor) {
                    result.push(neighbor);
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        result
    }
}
