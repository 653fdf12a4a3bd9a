//! Call graph data structures
//!
//! The graph has a two-phase lifecycle:
//! - [`CallGraphBuilder`] is insert-only. Functions and edges are appended with
//!   no referential checks.
//! - [`CallGraph`] is produced by [`CallGraphBuilder::freeze`]. The caller and
//!   callee indices are built exactly once during that transition and the graph
//!   is read-only afterwards.

pub mod builder;
pub mod edges;
pub mod nodes;
pub mod query;

pub use builder::GraphBuilder;
pub use edges::{CallEdge, ResolutionStrategy};
pub use nodes::{module_of, FunctionDef, FunctionKind, FunctionNode};
pub use query::GraphQuery;

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Insert-only phase of a call graph
#[derive(Debug, Clone, Default)]
pub struct CallGraphBuilder {
    root_path: PathBuf,
    functions: Vec<FunctionNode>,
    edges: Vec<CallEdge>,
}

impl CallGraphBuilder {
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            functions: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Add a function node
    pub fn add_function(&mut self, node: FunctionNode) {
        self.functions.push(node);
    }

    /// Add a call edge. The callee does not have to be inserted yet.
    pub fn add_edge(&mut self, edge: CallEdge) {
        self.edges.push(edge);
    }

    pub fn functions(&self) -> &[FunctionNode] {
        &self.functions
    }

    /// Build the caller/callee indices and switch to the read-only phase
    pub fn freeze(self) -> CallGraph {
        let mut by_id = HashMap::with_capacity(self.functions.len());
        for (idx, node) in self.functions.iter().enumerate() {
            by_id.entry(node.id().to_string()).or_insert(idx);
        }

        let mut callers: HashMap<String, Vec<usize>> = HashMap::new();
        let mut callees: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, edge) in self.edges.iter().enumerate() {
            callees.entry(edge.from().to_string()).or_default().push(idx);
            if let Some(to) = edge.to() {
                callers.entry(to.to_string()).or_default().push(idx);
            }
        }

        CallGraph {
            root_path: self.root_path,
            functions: self.functions,
            edges: self.edges,
            index: GraphIndex {
                by_id,
                callers,
                callees,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GraphIndex {
    by_id: HashMap<String, usize>,
    /// callee id -> indices of edges pointing at it, in insertion order
    callers: HashMap<String, Vec<usize>>,
    /// caller id -> indices of edges leaving it, in insertion order
    callees: HashMap<String, Vec<usize>>,
}

/// Derived per-function metrics, computed from the edge indices on demand
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FunctionMetrics {
    pub fan_in: usize,
    pub fan_out: usize,
    pub cross_module_fan_out: usize,
    pub cross_module_ratio: f64,
    pub complexity: usize,
    pub lines_of_code: usize,
    pub params: usize,
}

/// Read-only call graph for one snapshot of the code base
#[derive(Debug, Clone, Serialize)]
pub struct CallGraph {
    root_path: PathBuf,
    functions: Vec<FunctionNode>,
    edges: Vec<CallEdge>,
    #[serde(skip)]
    index: GraphIndex,
}

impl CallGraph {
    /// Build a graph directly from parts
    pub fn from_parts(root_path: PathBuf, functions: Vec<FunctionNode>, edges: Vec<CallEdge>) -> Self {
        CallGraphBuilder {
            root_path,
            functions,
            edges,
        }
        .freeze()
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Look up a function by id
    pub fn function(&self, id: &str) -> Option<&FunctionNode> {
        self.index.by_id.get(id).map(|&idx| &self.functions[idx])
    }

    /// All functions in insertion order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionNode> {
        self.functions.iter()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// All edges in insertion order
    pub fn edges(&self) -> &[CallEdge] {
        &self.edges
    }

    /// Resolved edges only
    pub fn resolved_edges(&self) -> impl Iterator<Item = &CallEdge> {
        self.edges.iter().filter(|e| e.is_resolved())
    }

    /// Edges pointing at `id`, in insertion order
    pub fn callers<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a CallEdge> + 'a {
        self.index
            .callers
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.edges[idx])
    }

    /// Edges leaving `id`, in insertion order
    pub fn callees<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a CallEdge> + 'a {
        self.index
            .callees
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.edges[idx])
    }

    pub fn fan_in(&self, id: &str) -> usize {
        self.index.callers.get(id).map_or(0, Vec::len)
    }

    pub fn fan_out(&self, id: &str) -> usize {
        self.index.callees.get(id).map_or(0, Vec::len)
    }

    /// Outgoing resolved calls whose target lives in a different module
    pub fn cross_module_fan_out(&self, id: &str) -> usize {
        self.callees(id).filter(|e| e.is_cross_module()).count()
    }

    /// Share of outgoing calls that cross a module boundary (0 with no calls)
    pub fn cross_module_ratio(&self, id: &str) -> f64 {
        let fan_out = self.fan_out(id);
        if fan_out == 0 {
            return 0.0;
        }
        self.cross_module_fan_out(id) as f64 / fan_out as f64
    }

    /// All derived metrics for a function
    pub fn metrics(&self, id: &str) -> Option<FunctionMetrics> {
        let node = self.function(id)?;
        Some(FunctionMetrics {
            fan_in: self.fan_in(id),
            fan_out: self.fan_out(id),
            cross_module_fan_out: self.cross_module_fan_out(id),
            cross_module_ratio: self.cross_module_ratio(id),
            complexity: node.complexity(),
            lines_of_code: node.lines_of_code(),
            params: node.params(),
        })
    }

    /// Module of a function id, if the id is known
    pub fn module_of(&self, id: &str) -> Option<&str> {
        self.function(id).map(|n| n.module())
    }

    /// Distinct modules, sorted
    pub fn modules(&self) -> BTreeSet<&str> {
        self.functions.iter().map(|n| n.module()).collect()
    }

    /// Distinct source files that contributed functions
    pub fn files(&self) -> BTreeSet<&str> {
        self.functions.iter().map(|n| n.rel_path()).collect()
    }

    pub fn unresolved_count(&self) -> usize {
        self.edges.iter().filter(|e| !e.is_resolved()).count()
    }

    /// Get a query interface for traversals
    pub fn query(&self) -> GraphQuery<'_> {
        GraphQuery::new(self)
    }
}
