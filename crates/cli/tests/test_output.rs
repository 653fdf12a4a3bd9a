use faultline_cli::commands::init::write_default_config;
use faultline_cli::output::{json, resolve_format, terminal};
use faultline_cli::OutputFormat;
use faultline_core::diff::NodeSnapshot;
use faultline_core::{analyze_sources, AnalysisReport, CommitCache, DiffEngine, FaultlineConfig};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tempfile::TempDir;

fn sample_report() -> AnalysisReport {
    let sources = vec![
        (
            "api/routes.js".to_string(),
            "import { find } from '../db/repo';\nexport function list() { return find(); }\nexport function show() { return find(); }\n".to_string(),
        ),
        (
            "db/repo.js".to_string(),
            "export function find() {\n  return query();\n}\nfunction query() {}\n".to_string(),
        ),
    ];
    let mut config = FaultlineConfig::default();
    config.git.enabled = false;
    analyze_sources(
        Path::new("/project"),
        &sources,
        None,
        &config,
        &CommitCache::disabled(),
    )
}

fn snapshot(key: &str, complexity: usize) -> NodeSnapshot {
    NodeSnapshot {
        key: key.to_string(),
        id: key.to_string(),
        rel_path: "a.js".to_string(),
        module: "a".to_string(),
        line: 1,
        complexity,
        fan_in: 0,
        fan_out: 0,
        cross_module_fan_out: 0,
        lines_of_code: 3,
        archetypes: BTreeSet::new(),
    }
}

// ── JSON ───────────────────────────────────────────────────────────────────

#[test]
fn test_json_report_shape() {
    let report = sample_report();
    let rendered = json::render_report(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(value["version"], faultline_core::VERSION);
    assert_eq!(value["summary"]["functions"], 4);
    assert!(value["git"].is_null());

    let functions = value["functions"].as_array().unwrap();
    assert_eq!(functions.len(), 4);
    let find = functions
        .iter()
        .find(|f| f["id"] == "db/repo.js::find")
        .unwrap();
    assert_eq!(find["module"], "db");
    assert_eq!(find["metrics"]["fan_in"], 2);
    assert_eq!(find["line"], 1);
    assert_eq!(find["end_line"], 3);
    assert!(find["archetypes"].is_array());
}

#[test]
fn test_json_diff_is_flattened() {
    let before: BTreeMap<String, NodeSnapshot> =
        [("a.js::f".to_string(), snapshot("a.js::f", 1))].into();
    let after: BTreeMap<String, NodeSnapshot> =
        [("a.js::f".to_string(), snapshot("a.js::f", 5))].into();
    let result = DiffEngine::new().compare("main", "HEAD", &before, &after);

    let value: serde_json::Value = serde_json::from_str(&json::render_diff(&result).unwrap()).unwrap();
    assert_eq!(value["before_ref"], "main");
    assert_eq!(value["summary"]["stressed"], 1);
    assert_eq!(value["diffs"][0]["verdict"], "stressed");
    assert_eq!(value["diffs"][0]["delta"]["complexity"], 4);
}

// ── Terminal ───────────────────────────────────────────────────────────────

#[test]
fn test_terminal_report_sections() {
    colored::control::set_override(false);
    let report = sample_report();
    let text = terminal::format_report(&report, 15);

    assert!(text.contains("2 files"));
    assert!(text.contains("4 functions"));
    assert!(text.contains("The Hermit"));
    assert!(text.contains("No git history"));
}

#[test]
fn test_terminal_report_truncates() {
    colored::control::set_override(false);
    let report = sample_report();
    let hermits = report
        .with_archetype(faultline_core::Archetype::Hermit)
        .len();
    assert!(hermits >= 2);

    let text = terminal::format_report(&report, 1);
    assert!(text.contains(&format!("... and {} more", hermits - 1)));
}

#[test]
fn test_terminal_diff_lines() {
    colored::control::set_override(false);
    let before: BTreeMap<String, NodeSnapshot> = [
        ("a.js::f".to_string(), snapshot("a.js::f", 1)),
        ("a.js::old".to_string(), snapshot("a.js::old", 1)),
    ]
    .into();
    let after: BTreeMap<String, NodeSnapshot> = [
        ("a.js::f".to_string(), snapshot("a.js::f", 5)),
        ("a.js::new".to_string(), snapshot("a.js::new", 1)),
    ]
    .into();
    let result = DiffEngine::new().compare("v1", "v2", &before, &after);
    let text = terminal::format_diff(&result, 0);

    assert!(text.contains("v1 \u{2192} v2"));
    assert!(text.contains("stressed  a.js::f complexity +4"));
    assert!(text.contains("a.js::new"));
    assert!(text.contains("removed"));
    assert!(text.contains("1 stressed"));
}

#[test]
fn test_terminal_output_is_newline_terminated_lines() {
    colored::control::set_override(false);
    let before: BTreeMap<String, NodeSnapshot> =
        [("a.js::f".to_string(), snapshot("a.js::f", 1))].into();
    let after: BTreeMap<String, NodeSnapshot> = [
        ("a.js::f".to_string(), snapshot("a.js::f", 5)),
        ("a.js::g".to_string(), snapshot("a.js::g", 1)),
    ]
    .into();
    let text = terminal::format_diff(&DiffEngine::new().compare("v1", "v2", &before, &after), 0);

    // header, two functions, rule, totals
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[1].contains("a.js::f"));
    assert!(lines[2].contains("a.js::g"));
    assert!(text.ends_with('\n') && !text.ends_with("\n\n"));

    let report = terminal::format_report(&sample_report(), 15);
    assert!(report.ends_with('\n') && !report.ends_with("\n\n"));
    assert!(!report.contains("\n\n\n"));
}

// ── Format selection and init ──────────────────────────────────────────────

#[test]
fn test_flag_overrides_config_format() {
    let mut config = FaultlineConfig::default();
    assert_eq!(resolve_format(None, &config), OutputFormat::Terminal);

    config.output.format = "json".to_string();
    assert_eq!(resolve_format(None, &config), OutputFormat::Json);
    assert_eq!(
        resolve_format(Some(OutputFormat::Terminal), &config),
        OutputFormat::Terminal
    );
}

#[test]
fn test_init_writes_loadable_config_once() {
    let dir = TempDir::new().unwrap();
    let written = write_default_config(dir.path()).unwrap().unwrap();
    assert!(written.ends_with(".faultline.toml"));

    let loaded = FaultlineConfig::from_file(&written).unwrap();
    assert_eq!(loaded.git.max_commits, 300);

    assert!(write_default_config(dir.path()).unwrap().is_none());
}
