//! Tests for label-propagation clustering and bridge detection

use faultline_core::archetypes::{Archetype, ArchetypeDetail, Classifier, ClassifyContext};
use faultline_core::bridges::{detect_bridges, MIN_BRIDGE_SCORE};
use faultline_core::clusters::ClusterDetector;
use faultline_core::graph::{
    module_of, CallEdge, CallGraph, FunctionDef, FunctionKind, FunctionNode, ResolutionStrategy,
};
use faultline_core::stats::GraphStats;
use std::path::PathBuf;

fn func(id: &str) -> FunctionNode {
    let (rel_path, name) = id.split_once("::").unwrap();
    FunctionNode::new(id, rel_path, FunctionDef::new(name, FunctionKind::Function, 1, 3))
}

fn link(from: &str, to: &str) -> CallEdge {
    let from_file = from.split_once("::").unwrap().0;
    let to_file = to.split_once("::").unwrap().0;
    CallEdge::resolved(
        from,
        to,
        to.rsplit("::").next().unwrap(),
        None,
        from_file,
        1,
        module_of(from_file) != module_of(to_file),
        ResolutionStrategy::GlobalUnique,
    )
}

fn graph(ids: &[&str], calls: &[(&str, &str)]) -> CallGraph {
    CallGraph::from_parts(
        PathBuf::from("/project"),
        ids.iter().map(|id| func(id)).collect(),
        calls.iter().map(|(a, b)| link(a, b)).collect(),
    )
}

/// Two disjoint triangles; the second spans two modules
fn two_triangles() -> CallGraph {
    graph(
        &[
            "x/m.js::a",
            "x/m.js::b",
            "x/m.js::c",
            "y/p.js::d",
            "y/p.js::e",
            "z/q.js::f",
            "x/m.js::lonely",
        ],
        &[
            ("x/m.js::a", "x/m.js::b"),
            ("x/m.js::b", "x/m.js::c"),
            ("x/m.js::c", "x/m.js::a"),
            ("y/p.js::d", "y/p.js::e"),
            ("y/p.js::e", "z/q.js::f"),
            ("z/q.js::f", "y/p.js::d"),
            // self-calls never connect anything
            ("x/m.js::lonely", "x/m.js::lonely"),
        ],
    )
}

// ── Clusters ───────────────────────────────────────────────────────────────

#[test]
fn test_triangles_become_clusters() {
    let graph = two_triangles();
    let clusters = ClusterDetector::default().detect(&graph);
    assert_eq!(clusters.len(), 2);

    // multi-module clusters sort first
    let first = &clusters[0];
    assert!(first.multi_module);
    assert_eq!(first.id, 0);
    assert_eq!(first.members, vec!["y/p.js::d", "y/p.js::e", "z/q.js::f"]);
    assert_eq!(first.modules.iter().map(String::as_str).collect::<Vec<_>>(), vec!["y", "z"]);
    assert_eq!(first.internal_edges, 3);
    assert_eq!(first.density, 1.0);
    assert_eq!(first.hubs.len(), 3);

    let second = &clusters[1];
    assert!(!second.multi_module);
    assert_eq!(second.size, 3);
    assert_eq!(second.label, "x/m.js::b");
    assert!(!second.members.contains(&"x/m.js::lonely".to_string()));
}

#[test]
fn test_detection_is_deterministic() {
    let graph = two_triangles();
    let detector = ClusterDetector::default();
    assert_eq!(detector.detect(&graph), detector.detect(&graph));
    assert_eq!(detector.propagate(&graph), detector.propagate(&graph));
}

#[test]
fn test_min_size_filters_small_groups() {
    let graph = two_triangles();
    assert!(ClusterDetector::new(4, 15).detect(&graph).is_empty());
    assert_eq!(ClusterDetector::new(2, 15).detect(&graph).len(), 2);
}

#[test]
fn test_isolated_functions_keep_their_own_label() {
    let graph = graph(&["a.js::one", "a.js::two"], &[]);
    let labels = ClusterDetector::default().propagate(&graph);
    assert_eq!(labels.len(), 2);
    assert_eq!(labels["a.js::one"], "a.js::one");
    assert_eq!(labels["a.js::two"], "a.js::two");

    assert!(ClusterDetector::default().detect(&graph).is_empty());
    let singles = ClusterDetector::new(1, 15).detect(&graph);
    assert_eq!(singles.len(), 2);
    assert!(singles.iter().all(|c| c.size == 1 && c.internal_edges == 0));
}

/// A shared helper called from two modules
fn star() -> CallGraph {
    graph(
        &["a/x.js::l1", "a/x.js::l2", "b/y.js::l3", "b/y.js::l4", "c/h.js::hub"],
        &[
            ("a/x.js::l1", "c/h.js::hub"),
            ("a/x.js::l2", "c/h.js::hub"),
            ("b/y.js::l3", "c/h.js::hub"),
            ("b/y.js::l4", "c/h.js::hub"),
        ],
    )
}

#[test]
fn test_star_settles_into_one_cluster() {
    let graph = star();
    let clusters = ClusterDetector::default().detect(&graph);
    assert_eq!(clusters.len(), 1);

    let cluster = &clusters[0];
    assert_eq!(cluster.size, 5);
    assert!(cluster.members.contains(&"c/h.js::hub".to_string()));
    assert_eq!(cluster.internal_edges, 4);
    assert_eq!(cluster.hubs[0], "c/h.js::hub");
    assert!(cluster.multi_module);
}

#[test]
fn test_star_does_not_depend_on_pass_limit() {
    let graph = star();
    let even = ClusterDetector::new(3, 14).propagate(&graph);
    let odd = ClusterDetector::new(3, 15).propagate(&graph);
    assert_eq!(even, odd);
    assert_eq!(ClusterDetector::new(3, 14).detect(&graph), ClusterDetector::new(3, 15).detect(&graph));
}

#[test]
fn test_chain_becomes_one_connected_cluster() {
    let graph = graph(
        &["m/a.js::a", "m/a.js::b", "m/a.js::c", "m/a.js::d"],
        &[
            ("m/a.js::a", "m/a.js::b"),
            ("m/a.js::b", "m/a.js::c"),
            ("m/a.js::c", "m/a.js::d"),
        ],
    );
    let clusters = ClusterDetector::default().detect(&graph);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size, 4);
    assert_eq!(clusters[0].internal_edges, 3);
    assert!(clusters[0].density > 0.0);
    // every cluster found is internally connected
    assert!(clusters.iter().all(|c| c.internal_edges >= c.size - 1));
}

// ── Bridges ────────────────────────────────────────────────────────────────

#[test]
fn test_sole_bridger_has_full_exclusivity() {
    let graph = graph(
        &["api/h.js::handle", "svc/s.js::process", "db/d.js::query"],
        &[
            ("api/h.js::handle", "svc/s.js::process"),
            ("svc/s.js::process", "db/d.js::query"),
        ],
    );
    let bridges = detect_bridges(&graph);
    assert_eq!(bridges.len(), 1);

    let b = &bridges[0];
    assert_eq!(b.id, "svc/s.js::process");
    assert_eq!(b.module, "svc");
    assert_eq!(b.score, 1.0);
    assert_eq!(b.pairs.len(), 1);
    assert_eq!(b.pairs[0].from_module, "api");
    assert_eq!(b.pairs[0].to_module, "db");
}

#[test]
fn test_shared_bridges_split_exclusivity() {
    let ids = [
        "api/h.js::handle",
        "svc/s.js::process",
        "svc/t.js::other",
        "svc/u.js::third",
        "db/d.js::query",
    ];
    let two = graph(
        &ids,
        &[
            ("api/h.js::handle", "svc/s.js::process"),
            ("api/h.js::handle", "svc/t.js::other"),
            ("svc/s.js::process", "db/d.js::query"),
            ("svc/t.js::other", "db/d.js::query"),
        ],
    );
    let bridges = detect_bridges(&two);
    assert_eq!(bridges.len(), 2);
    assert!(bridges.iter().all(|b| b.score == 0.5));
    // ties break by id
    assert_eq!(bridges[0].id, "svc/s.js::process");

    let three = graph(
        &ids,
        &[
            ("api/h.js::handle", "svc/s.js::process"),
            ("api/h.js::handle", "svc/t.js::other"),
            ("api/h.js::handle", "svc/u.js::third"),
            ("svc/s.js::process", "db/d.js::query"),
            ("svc/t.js::other", "db/d.js::query"),
            ("svc/u.js::third", "db/d.js::query"),
        ],
    );
    // 1/3 is below the reporting threshold
    assert!(detect_bridges(&three).is_empty());
}

#[test]
fn test_exclusivity_bounds() {
    let graph = graph(
        &["a/x.js::f", "b/y.js::g", "c/z.js::h", "b/y.js::k", "d/w.js::m"],
        &[
            ("a/x.js::f", "b/y.js::g"),
            ("b/y.js::g", "c/z.js::h"),
            ("b/y.js::g", "d/w.js::m"),
            ("a/x.js::f", "b/y.js::k"),
            ("b/y.js::k", "c/z.js::h"),
            ("c/z.js::h", "b/y.js::k"),
        ],
    );
    for b in detect_bridges(&graph) {
        assert!(b.score >= MIN_BRIDGE_SCORE && b.score <= 1.0);
        for p in &b.pairs {
            assert!(p.exclusivity > 0.0 && p.exclusivity <= 1.0);
            assert_ne!(p.from_module, p.to_module);
        }
    }
}

#[test]
fn test_bridge_archetype_carries_pairs() {
    let graph = graph(
        &["api/h.js::handle", "svc/s.js::process", "db/d.js::query"],
        &[
            ("api/h.js::handle", "svc/s.js::process"),
            ("svc/s.js::process", "db/d.js::query"),
        ],
    );
    let bridges = detect_bridges(&graph);
    let stats = GraphStats::compute(&graph);
    let ctx = ClassifyContext::new(None, &bridges, 3);
    let result = Classifier::new().classify(&graph, &stats, &ctx);

    let bridge = result["svc/s.js::process"]
        .iter()
        .find(|c| c.archetype == Archetype::Bridge)
        .expect("process is a bridge");
    assert_eq!(bridge.confidence, 1.0);
    assert_eq!(bridge.reasons, vec!["Only path from api to db".to_string()]);
    assert!(matches!(&bridge.detail, ArchetypeDetail::Bridge { pairs } if pairs.len() == 1));
}
