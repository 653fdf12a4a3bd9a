//! Tests for archetype classification over hand-built graphs

use faultline_core::archetypes::{Archetype, Classification, Classifier, ClassifyContext};
use faultline_core::graph::{
    module_of, CallEdge, CallGraph, FunctionDef, FunctionKind, FunctionNode, ResolutionStrategy,
};
use faultline_core::stats::GraphStats;
use std::collections::BTreeMap;
use std::path::PathBuf;

fn func(id: &str, line: usize, end_line: usize, complexity: usize, params: usize) -> FunctionNode {
    let (rel_path, name) = id.split_once("::").unwrap();
    let mut def = FunctionDef::new(name, FunctionKind::Function, line, end_line);
    def.complexity = complexity;
    def.params = params;
    FunctionNode::new(id, rel_path, def)
}

fn small(id: &str) -> FunctionNode {
    func(id, 1, 2, 1, 0)
}

fn link(from: &str, to: &str) -> CallEdge {
    let from_file = from.split_once("::").unwrap().0;
    let to_file = to.split_once("::").unwrap().0;
    let name = to.rsplit("::").next().unwrap();
    CallEdge::resolved(
        from,
        to,
        name,
        None,
        from_file,
        1,
        module_of(from_file) != module_of(to_file),
        ResolutionStrategy::ImportBinding,
    )
}

fn classify_with(
    classifier: &Classifier,
    graph: &CallGraph,
) -> BTreeMap<String, Vec<Classification>> {
    let stats = GraphStats::compute(graph);
    classifier.classify(graph, &stats, &ClassifyContext::default())
}

fn archetypes_of(result: &BTreeMap<String, Vec<Classification>>, id: &str) -> Vec<Archetype> {
    result[id].iter().map(|c| c.archetype).collect()
}

fn confidence(result: &BTreeMap<String, Vec<Classification>>, id: &str, a: Archetype) -> f64 {
    result[id]
        .iter()
        .find(|c| c.archetype == a)
        .map(|c| c.confidence)
        .unwrap_or_else(|| panic!("{} is not {:?}", id, a))
}

/// `core/engine.js::run` is long, complex, busy and called from six places
fn engine_graph() -> CallGraph {
    let run = "core/engine.js::run";
    let mut functions = vec![func(run, 1, 40, 12, 1)];
    let mut edges = Vec::new();

    for i in 1..=4 {
        let helper = format!("core/engine.js::step{}", i);
        functions.push(func(&helper, 40 + i * 3, 41 + i * 3, 1, 0));
        edges.push(link(run, &helper));
    }
    for (file, caller) in [
        ("api/routes.js", "list"),
        ("api/routes.js", "show"),
        ("api/routes.js", "create"),
        ("jobs/nightly.js", "sync"),
        ("jobs/nightly.js", "purge"),
        ("jobs/nightly.js", "report"),
    ] {
        let id = format!("{}::{}", file, caller);
        functions.push(small(&id));
        edges.push(link(&id, run));
    }

    CallGraph::from_parts(PathBuf::from("/project"), functions, edges)
}

// ── Boss and Workhorse ─────────────────────────────────────────────────────

#[test]
fn test_boss_and_workhorse_on_same_function() {
    let graph = engine_graph();
    let result = classify_with(&Classifier::new(), &graph);

    let found = archetypes_of(&result, "core/engine.js::run");
    assert!(found.contains(&Archetype::Boss), "got {:?}", found);
    assert!(found.contains(&Archetype::Workhorse), "got {:?}", found);

    // fan-in 6 is the maximum, above the floor of 5
    assert_eq!(confidence(&result, "core/engine.js::run", Archetype::Boss), 1.0);

    let boss = result["core/engine.js::run"]
        .iter()
        .find(|c| c.archetype == Archetype::Boss)
        .unwrap();
    assert!(boss.reasons.iter().any(|r| r.contains("span 2 modules")));
}

#[test]
fn test_classifications_sorted_by_confidence() {
    let graph = engine_graph();
    let result = classify_with(&Classifier::new(), &graph);

    for list in result.values() {
        for pair in list.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        for c in list {
            assert!((0.0..=1.0).contains(&c.confidence));
        }
    }
    // every function gets an entry, even with no match
    assert_eq!(result.len(), graph.function_count());
}

#[test]
fn test_small_fan_in_is_not_boss() {
    // the most-called function has three callers, under the absolute floor
    let target = "db/users.js::getUserById";
    let callers = ["api/users.js::show", "api/users.js::update", "jobs/cleanup.js::run"];
    let mut functions = vec![func(target, 1, 8, 2, 1)];
    let mut edges = Vec::new();
    for caller in callers {
        functions.push(small(caller));
        edges.push(link(caller, target));
    }
    let graph = CallGraph::from_parts(PathBuf::from("/project"), functions, edges);

    assert_eq!(graph.fan_in(target), 3);
    let result = classify_with(&Classifier::new(), &graph);
    assert!(!archetypes_of(&result, target).contains(&Archetype::Boss));
}

#[test]
fn test_disabled_detectors_do_not_run() {
    let graph = engine_graph();
    let classifier = Classifier::new().without(&[Archetype::Workhorse, Archetype::Hermit]);
    assert_eq!(classifier.archetypes().len(), Archetype::ALL.len() - 2);

    let result = classify_with(&classifier, &graph);
    let found = archetypes_of(&result, "core/engine.js::run");
    assert!(found.contains(&Archetype::Boss));
    assert!(!found.contains(&Archetype::Workhorse));
    assert!(result
        .values()
        .flatten()
        .all(|c| c.archetype != Archetype::Hermit));
}

// ── Structural archetypes ──────────────────────────────────────────────────

#[test]
fn test_hermit_confidence_capped_for_entry_points() {
    let graph = CallGraph::from_parts(
        PathBuf::from("/project"),
        vec![
            func("lib/tmp.js::cleanupTemp", 1, 10, 1, 0),
            func("lib/tmp.js::handleRequest", 12, 21, 1, 0),
        ],
        Vec::new(),
    );
    let result = classify_with(&Classifier::new(), &graph);

    let plain = confidence(&result, "lib/tmp.js::cleanupTemp", Archetype::Hermit);
    let entry = confidence(&result, "lib/tmp.js::handleRequest", Archetype::Hermit);
    assert!(plain > 0.3);
    assert!(entry <= 0.3);
}

#[test]
fn test_gossip_and_stranger_for_cross_module_caller() {
    let handle = "api/handlers.js::handle";
    let targets = ["db/users.js::find", "mail/send.js::deliver", "auth/check.js::verify"];
    let mut functions = vec![func(handle, 1, 12, 2, 2)];
    let mut edges = Vec::new();
    for t in targets {
        functions.push(small(t));
        edges.push(link(handle, t));
    }
    let graph = CallGraph::from_parts(PathBuf::from("/project"), functions, edges);
    let result = classify_with(&Classifier::new(), &graph);

    let found = archetypes_of(&result, handle);
    assert!(found.contains(&Archetype::Gossip), "got {:?}", found);
    assert!(found.contains(&Archetype::Stranger), "got {:?}", found);
    assert_eq!(confidence(&result, handle, Archetype::Stranger), 1.0);

    for t in targets {
        assert!(!archetypes_of(&result, t).contains(&Archetype::Gossip));
    }
}

#[test]
fn test_overloaded_needs_many_params_and_load() {
    let functions = vec![
        func("orders/place.js::placeOrder", 1, 20, 5, 6),
        func("orders/place.js::format", 22, 24, 3, 1),
        func("orders/place.js::idle", 26, 28, 1, 5),
        func("orders/place.js::log", 30, 32, 3, 0),
    ];
    let edges = vec![
        link("orders/place.js::placeOrder", "orders/place.js::format"),
        link("orders/place.js::placeOrder", "orders/place.js::log"),
        link("orders/place.js::format", "orders/place.js::log"),
        link("orders/place.js::log", "orders/place.js::format"),
    ];
    let graph = CallGraph::from_parts(PathBuf::from("/project"), functions, edges);
    let result = classify_with(&Classifier::new(), &graph);

    assert!(archetypes_of(&result, "orders/place.js::placeOrder").contains(&Archetype::Overloaded));
    // five params, but trivially simple and calls nothing
    assert!(!archetypes_of(&result, "orders/place.js::idle").contains(&Archetype::Overloaded));
}

#[test]
fn test_ghost_for_single_caller_heavy_function() {
    let functions = vec![
        func("lib/report.js::main", 1, 3, 1, 0),
        func("lib/report.js::render", 5, 40, 7, 2),
        small("lib/report.js::pad"),
        small("lib/report.js::trim"),
    ];
    let edges = vec![
        link("lib/report.js::main", "lib/report.js::render"),
        link("lib/report.js::main", "lib/report.js::render"),
    ];
    let graph = CallGraph::from_parts(PathBuf::from("/project"), functions, edges);
    let result = classify_with(&Classifier::new(), &graph);

    let ghost = result["lib/report.js::render"]
        .iter()
        .find(|c| c.archetype == Archetype::Ghost)
        .expect("render is a ghost");
    assert!(ghost.reasons[0].contains("lib/report.js::main"));
}

// ── Identifiers ────────────────────────────────────────────────────────────

#[test]
fn test_archetype_ids_and_labels() {
    assert_eq!(Archetype::parse("crisis_point"), Some(Archetype::CrisisPoint));
    assert_eq!(Archetype::parse("The Crisis Point"), Some(Archetype::CrisisPoint));
    assert_eq!(Archetype::parse("Boss"), Some(Archetype::Boss));
    assert_eq!(Archetype::parse("villain"), None);

    for a in Archetype::ALL {
        assert_eq!(Archetype::parse(a.id()), Some(a));
        assert_eq!(Archetype::parse(a.label()), Some(a));
    }
    assert!(!Archetype::Hermit.is_concerning());
    assert!(!Archetype::Bridge.is_concerning());
    assert!(Archetype::Boss.is_concerning());
}
