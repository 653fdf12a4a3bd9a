//! Terminal output formatting

use colored::Colorize;
use faultline_core::archetypes::ArchetypeDetail;
use faultline_core::diff::{DiffStatus, Verdict};
use faultline_core::{AnalysisReport, Archetype, DiffResult, FunctionDiff};

fn rule() -> String {
    format!("  {}", "\u{2500}".repeat(60).dimmed())
}

fn render(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn limit(max_items: usize) -> usize {
    if max_items == 0 {
        usize::MAX
    } else {
        max_items
    }
}

fn percent(confidence: f64) -> String {
    format!("{:>3.0}%", confidence * 100.0)
}

/// Compact multi-section summary of an analysis
pub fn format_report(report: &AnalysisReport, max_items: usize) -> String {
    let max_items = limit(max_items);
    let summary = report.summary();
    let graph = report.graph();
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "  {} files \u{00b7} {} functions \u{00b7} {} calls ({} resolved, {} cross-module) \u{00b7} {} modules",
        summary.files,
        summary.functions,
        summary.edges,
        summary.resolved_edges,
        summary.cross_module_edges,
        summary.modules
    ));
    if summary.parse_failures > 0 {
        lines.push(format!(
            "  {}",
            format!("{} file(s) could not be parsed (run with --verbose)", summary.parse_failures)
                .yellow()
        ));
    }

    // ── Archetypes ───────────────────────────────────────────────
    for archetype in Archetype::ALL {
        let matches = report.with_archetype(archetype);
        if matches.is_empty() {
            continue;
        }

        let title = format!("{} ({})", archetype.label(), matches.len());
        lines.push(String::new());
        lines.push(format!(
            "  {}",
            if archetype.is_concerning() {
                title.red().bold()
            } else {
                title.cyan().bold()
            }
        ));

        for (id, classification) in matches.iter().take(max_items) {
            let location = graph
                .function(id)
                .map(|f| format!("{}:{}", f.rel_path(), f.line()))
                .unwrap_or_default();
            lines.push(format!(
                "    {} {} {}",
                percent(classification.confidence).bold(),
                graph
                    .function(id)
                    .map(|f| f.qualified_name())
                    .unwrap_or_else(|| id.to_string()),
                location.dimmed()
            ));

            let detail = match &classification.detail {
                ArchetypeDetail::Codependent {
                    partner,
                    correlation,
                    co_commits,
                } => Some(format!(
                    "changes with {} ({:.0}% of commits, {} shared)",
                    partner,
                    correlation * 100.0,
                    co_commits
                )),
                _ => classification.reasons.first().cloned(),
            };
            if let Some(detail) = detail {
                lines.push(format!("         {}", detail.dimmed()));
            }
        }
        if matches.len() > max_items {
            lines.push(format!(
                "         {}",
                format!("... and {} more", matches.len() - max_items).dimmed()
            ));
        }
    }

    // ── Clusters ─────────────────────────────────────────────────
    if !report.clusters().is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "  {}",
            format!(
                "Clusters ({}, {} spanning modules)",
                summary.clusters, summary.multi_module_clusters
            )
            .bold()
        ));
        for cluster in report.clusters().iter().take(max_items) {
            let modules: Vec<&str> = cluster.modules.iter().map(String::as_str).collect();
            lines.push(format!(
                "    #{} {} functions, density {:.2} [{}] hubs: {}",
                cluster.id,
                cluster.size,
                cluster.density,
                modules.join(", "),
                cluster.hubs.join(", ")
            ));
        }
    }

    // ── Git ──────────────────────────────────────────────────────
    match report.git() {
        Some(git) => {
            let git_summary = git.summary();
            lines.push(String::new());
            lines.push(format!(
                "  {}",
                format!(
                    "History: {} commits ({} fixes, {} too broad for co-change)",
                    git_summary.commits_analyzed, git_summary.fix_commits, git_summary.broad_commits
                )
                .bold()
            ));
            for hotspot in git.hotspots(max_items.min(5)) {
                lines.push(format!(
                    "    {} {} commits, {} fixes, {} authors",
                    hotspot.id, hotspot.commits, hotspot.fix_commits, hotspot.authors
                ));
            }
        }
        None => {
            lines.push(String::new());
            lines.push(format!("  {}", "No git history: history archetypes skipped".dimmed()));
        }
    }

    render(lines)
}

fn diff_line(diff: &FunctionDiff) -> String {
    let tag = match (diff.status, diff.verdict) {
        (DiffStatus::Changed, Some(Verdict::Stressed)) => "stressed".red().bold(),
        (DiffStatus::Changed, Some(Verdict::Improved)) => "improved".green().bold(),
        (DiffStatus::Changed, _) => "changed".normal(),
        (DiffStatus::Added, _) => "new".blue().bold(),
        (DiffStatus::Removed, _) => "removed".dimmed(),
    };

    let mut parts = Vec::new();
    let delta = &diff.delta;
    for (label, value) in [
        ("complexity", delta.complexity),
        ("fan-out", delta.fan_out),
        ("fan-in", delta.fan_in),
        ("cross-module", delta.cross_module_fan_out),
    ] {
        if value != 0 {
            parts.push(format!("{} {:+}", label, value));
        }
    }
    for archetype in &diff.gained {
        parts.push(format!("+{}", archetype.label()));
    }
    for archetype in &diff.lost {
        parts.push(format!("-{}", archetype.label()));
    }

    format!("    {:<9} {} {}", tag, diff.key, parts.join(", ").dimmed())
}

/// Function-level changes between two refs
pub fn format_diff(result: &DiffResult, max_items: usize) -> String {
    let max_items = limit(max_items);
    let s = &result.summary;
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "  {} \u{2192} {}",
        result.before_ref.bold(),
        result.after_ref.bold()
    ));
    for diff in result.diffs.iter().take(max_items) {
        lines.push(diff_line(diff));
    }
    if result.diffs.len() > max_items {
        lines.push(format!(
            "    {}",
            format!("... and {} more", result.diffs.len() - max_items).dimmed()
        ));
    }

    lines.push(rule());
    lines.push(format!(
        "  {} \u{00b7} {} \u{00b7} {} \u{00b7} {} \u{00b7} {}",
        format!("{} stressed", s.stressed).red(),
        format!("{} improved", s.improved).green(),
        format!("{} new", s.added).blue(),
        format!("{} removed", s.removed),
        format!("{} unchanged", s.unchanged).dimmed()
    ));
    render(lines)
}
