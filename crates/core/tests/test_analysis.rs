//! End-to-end tests for the analysis pipeline

use faultline_core::archetypes::Archetype;
use faultline_core::graph::ResolutionStrategy;
use faultline_core::{analyze_path, analyze_sources, CommitCache, FaultlineConfig};
use git2::{Repository, Signature};
use std::path::Path;
use tempfile::TempDir;

const HANDLERS: &str = r#"import { getUserById, saveUser } from '../db/users';
const mailer = require('../services/mailer');

export function showUser(req) {
  return getUserById(req.id);
}

export function updateUser(req) {
  const user = getUserById(req.id);
  saveUser(user);
  mailer.sendUpdate(user);
}
"#;

const USERS: &str = r#"export function getUserById(id) {
  return query('select', id);
}

export function saveUser(user) {
  return query('update', user);
}

function query(kind, arg) {
  if (!arg) {
    throw new Error('missing');
  }
  return [kind, arg];
}
"#;

const MAILER: &str = r#"const { getUserById } = require('../db/users');

exports.sendUpdate = function (user) {
  const fresh = getUserById(user.id);
  deliver(fresh);
};

function deliver(user) {
  console.log(user);
}
"#;

fn sources() -> Vec<(String, String)> {
    vec![
        ("api/handlers.js".to_string(), HANDLERS.to_string()),
        ("db/users.js".to_string(), USERS.to_string()),
        ("services/mailer.js".to_string(), MAILER.to_string()),
    ]
}

fn offline_config() -> FaultlineConfig {
    let mut config = FaultlineConfig::default();
    config.git.enabled = false;
    config
}

#[test]
fn test_summary_counts() {
    let report = analyze_sources(
        Path::new("/project"),
        &sources(),
        None,
        &offline_config(),
        &CommitCache::disabled(),
    );
    let summary = report.summary();

    assert_eq!(summary.files, 3);
    assert_eq!(summary.parse_failures, 0);
    assert_eq!(summary.functions, 7);
    assert_eq!(summary.modules, 3);
    assert_eq!(summary.edges, summary.resolved_edges + summary.unresolved_edges);
    assert_eq!(
        summary.resolution.get(&ResolutionStrategy::NamespaceMember),
        Some(&1)
    );
    assert!(report.git().is_none());

    let graph = report.graph();
    assert_eq!(graph.fan_in("db/users.js::getUserById"), 3);
    assert_eq!(graph.fan_in("db/users.js::query"), 2);
    assert_eq!(graph.cross_module_fan_out("api/handlers.js::updateUser"), 3);
}

#[test]
fn test_fan_in_three_is_not_boss() {
    let report = analyze_sources(
        Path::new("/project"),
        &sources(),
        None,
        &offline_config(),
        &CommitCache::disabled(),
    );
    let bosses = report.with_archetype(Archetype::Boss);
    assert!(bosses.iter().all(|(id, _)| *id != "db/users.js::getUserById"));

    // every function has a classification entry
    assert_eq!(report.classifications().len(), report.summary().functions);
}

#[test]
fn test_with_archetype_is_sorted() {
    let report = analyze_sources(
        Path::new("/project"),
        &sources(),
        None,
        &offline_config(),
        &CommitCache::disabled(),
    );
    let hermits = report.with_archetype(Archetype::Hermit);
    assert!(!hermits.is_empty());
    for pair in hermits.windows(2) {
        assert!(pair[0].1.confidence >= pair[1].1.confidence);
    }
    assert!(hermits.iter().any(|(id, _)| *id == "api/handlers.js::showUser"));
}

#[test]
fn test_disabled_archetypes_are_not_reported() {
    let mut config = offline_config();
    config.ignore.archetypes = vec!["hermit".to_string(), "ghost".to_string()];
    let report = analyze_sources(
        Path::new("/project"),
        &sources(),
        None,
        &config,
        &CommitCache::disabled(),
    );
    assert!(report.with_archetype(Archetype::Hermit).is_empty());
    assert!(report.with_archetype(Archetype::Ghost).is_empty());
    assert!(!report.summary().archetypes.contains_key(&Archetype::Hermit));
}

#[test]
fn test_parse_failures_are_reported_not_fatal() {
    let mut files = sources();
    files.push(("tools/build.py".to_string(), "print('x')".to_string()));
    let report = analyze_sources(
        Path::new("/project"),
        &files,
        None,
        &offline_config(),
        &CommitCache::disabled(),
    );
    assert_eq!(report.summary().files, 4);
    assert_eq!(report.summary().parse_failures, 1);
    assert_eq!(report.parse_errors().len(), 1);
    assert_eq!(report.summary().functions, 7);
}

#[test]
fn test_report_serializes_to_json() {
    let report = analyze_sources(
        Path::new("/project"),
        &sources(),
        None,
        &offline_config(),
        &CommitCache::disabled(),
    );
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["summary"]["functions"], 7);
    assert!(value["classifications"].is_object());
    assert!(value["git"].is_null());
}

#[test]
fn test_empty_input() {
    let report = analyze_sources(
        Path::new("/project"),
        &[],
        None,
        &offline_config(),
        &CommitCache::disabled(),
    );
    assert_eq!(report.summary().functions, 0);
    assert!(report.clusters().is_empty());
    assert!(report.bridges().is_empty());
}

// ── Working tree with history ──────────────────────────────────────────────

fn commit_all(repo: &Repository, root: &Path, files: &[(&str, &str)], message: &str) {
    for (path, content) in files {
        let full = root.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(&full, content).unwrap();
    }
    let mut index = repo.index().unwrap();
    for (path, _) in files {
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();

    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("dev", "dev@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap();
}

#[test]
fn test_analyze_path_with_git_history() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_all(
        &repo,
        dir.path(),
        &[
            ("api/handlers.js", HANDLERS),
            ("db/users.js", USERS),
            ("services/mailer.js", MAILER),
        ],
        "initial commit",
    );
    let patched = USERS.replace("'missing'", "'missing argument'");
    commit_all(&repo, dir.path(), &[("db/users.js", &patched)], "Fix error message");

    let cache = CommitCache::new(dir.path());
    let report = analyze_path(dir.path(), &FaultlineConfig::default(), &cache).unwrap();
    assert_eq!(report.summary().functions, 7);

    let git = report.git().expect("history is correlated");
    assert_eq!(git.summary().commits_analyzed, 2);
    assert_eq!(git.summary().fix_commits, 1);

    let query = git.metrics("db/users.js::query").unwrap();
    assert_eq!(query.commits, 2);
    assert_eq!(query.fix_commits, 1);
    assert_eq!(git.hotspots(1)[0].id, "db/users.js::query");

    // the history was cached under the analysed root
    assert!(dir.path().join(".faultline-cache/commits").is_dir());

    // and the cache directory itself is never analysed
    let again = analyze_path(dir.path(), &FaultlineConfig::default(), &cache).unwrap();
    assert_eq!(again.summary().files, 3);
}

#[test]
fn test_analyze_path_without_repository() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.js"), "function main() {}\n").unwrap();

    let report = analyze_path(dir.path(), &FaultlineConfig::default(), &CommitCache::disabled())
        .unwrap();
    assert_eq!(report.summary().functions, 1);
    assert!(report.git().is_none());
}

#[test]
fn test_analyze_missing_path_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    assert!(analyze_path(&missing, &offline_config(), &CommitCache::disabled()).is_err());
}
