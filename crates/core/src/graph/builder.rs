//! Turns per-file extraction results into one resolved call graph

use super::{CallEdge, CallGraph, CallGraphBuilder, FunctionNode, ResolutionStrategy};
use crate::parser::resolver::{CallSite, ModuleResolver, NameResolver, SymbolIndex};
use crate::parser::FileExtraction;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, info};

/// Builds a [`CallGraph`] from parser output.
///
/// All functions of all files are inserted before any call is resolved, so
/// the result depends only on the set of extractions, never on their order.
pub struct GraphBuilder {
    root: PathBuf,
}

impl GraphBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn build(&self, mut extractions: Vec<FileExtraction>) -> CallGraph {
        extractions.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

        let mut graph = CallGraphBuilder::new(self.root.clone());
        let mut taken: HashSet<String> = HashSet::new();
        // per file: function index -> node id
        let mut file_ids: Vec<Vec<String>> = Vec::with_capacity(extractions.len());
        let mut defaults: HashMap<String, String> = HashMap::new();

        // ── Phase 1: insert every function ──────────────────────────────
        for extraction in &extractions {
            let mut ids = Vec::with_capacity(extraction.functions.len());
            for def in &extraction.functions {
                let mut id = format!("{}::{}", extraction.rel_path, def.qualified_name());
                while taken.contains(&id) {
                    id = format!("{}@L{}", id, def.line);
                }
                taken.insert(id.clone());
                graph.add_function(FunctionNode::new(
                    id.clone(),
                    extraction.rel_path.clone(),
                    def.clone(),
                ));
                ids.push(id);
            }

            if let Some(target) = default_target(extraction, &ids) {
                defaults.insert(extraction.rel_path.clone(), target);
            }
            file_ids.push(ids);
        }

        // ── Phase 2: indices over the complete function set ─────────────
        let files: HashSet<String> = extractions.iter().map(|e| e.rel_path.clone()).collect();
        let modules = ModuleResolver::new(&files);
        let index = SymbolIndex::build(graph.functions(), &defaults);
        let resolver = NameResolver::new(&index);
        let module_by_id: HashMap<&str, &str> = graph
            .functions()
            .iter()
            .map(|n| (n.id(), n.module()))
            .collect();

        // ── Phase 3: resolve every call site ────────────────────────────
        let mut edges = Vec::new();
        for (extraction, ids) in extractions.iter().zip(&file_ids) {
            let mut imports = extraction.imports.clone();
            for binding in imports.values_mut() {
                binding.resolved_file = modules.resolve(&binding.specifier, &extraction.rel_path);
            }

            for call in &extraction.calls {
                let Some(from) = ids.get(call.caller) else {
                    debug!(
                        "{}: call to {} has no caller function",
                        extraction.rel_path, call.callee_name
                    );
                    continue;
                };

                let site = CallSite {
                    rel_path: &extraction.rel_path,
                    callee_name: &call.callee_name,
                    callee_object: call.callee_object.as_deref(),
                    imports: &imports,
                };

                let edge = match resolver.resolve(&site) {
                    Some(resolution) => {
                        let cross_module = module_by_id.get(from.as_str())
                            != module_by_id.get(resolution.target.as_str());
                        CallEdge::resolved(
                            from.clone(),
                            resolution.target,
                            call.callee_name.clone(),
                            call.callee_object.clone(),
                            extraction.rel_path.clone(),
                            call.line,
                            cross_module,
                            resolution.strategy,
                        )
                    }
                    None => CallEdge::unresolved(
                        from.clone(),
                        call.callee_name.clone(),
                        call.callee_object.clone(),
                        extraction.rel_path.clone(),
                        call.line,
                    ),
                };
                edges.push(edge);
            }
        }

        for edge in edges {
            graph.add_edge(edge);
        }

        let graph = graph.freeze();
        info!(
            "call graph: {} functions, {} edges ({} unresolved) across {} files",
            graph.function_count(),
            graph.edges().len(),
            graph.unresolved_count(),
            files.len()
        );
        graph
    }
}

/// The id bound to a file's `default` export key: the explicitly declared
/// default export when there is one, otherwise the first function in the file.
fn default_target(extraction: &FileExtraction, ids: &[String]) -> Option<String> {
    if let Some(name) = &extraction.default_export {
        let explicit = extraction
            .functions
            .iter()
            .position(|f| &f.qualified_name() == name)
            .or_else(|| extraction.functions.iter().position(|f| &f.name == name));
        if let Some(idx) = explicit {
            return ids.get(idx).cloned();
        }
    }
    ids.first().cloned()
}

/// Number of resolved edges per strategy
pub fn strategy_counts(graph: &CallGraph) -> BTreeMap<ResolutionStrategy, usize> {
    let mut counts = BTreeMap::new();
    for strategy in graph.resolved_edges().filter_map(|e| e.strategy()) {
        *counts.entry(strategy).or_insert(0) += 1;
    }
    counts
}
