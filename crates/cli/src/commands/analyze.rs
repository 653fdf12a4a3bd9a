//! Analyze command: runs the full pipeline over a working tree

use anyhow::Result;
use colored::Colorize;
use faultline_core::{analyze_path, CommitCache, FaultlineConfig};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use crate::output;
use crate::progress::Step;
use crate::{Cli, ExitStatus, OutputFormat};

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub no_git: bool,
    pub no_cache: bool,
    pub top: Option<usize>,
}

pub fn run(path: Option<&Path>, options: &AnalyzeOptions, cli: &Cli) -> Result<ExitStatus> {
    let start = Instant::now();
    let root = path.unwrap_or_else(|| Path::new("."));
    let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    eprintln!(
        "{}",
        format!(
            "  faultline v{} — analyzing {}",
            faultline_core::VERSION,
            root.display()
        )
        .bold()
    );
    eprintln!();

    // ── 1. Config ────────────────────────────────────────────────
    let mut config = FaultlineConfig::find_and_load(&root)?;
    if options.no_git {
        config.git.enabled = false;
    }
    if !config.output.color {
        colored::control::set_override(false);
    }
    let format = output::resolve_format(cli.format, &config);
    let cache = commit_cache(&root, &config, options.no_cache);
    debug!(
        "format {:?}, git {}, cache {}",
        format,
        config.git.enabled,
        cache.is_enabled()
    );

    // ── 2. Pipeline ──────────────────────────────────────────────
    let step = Step::new("Analyzing call graph");
    let report = analyze_path(&root, &config, &cache)?;
    for error in report.parse_errors() {
        debug!("parse failure: {}", error);
        step.warn(error);
    }
    let summary = report.summary();
    let history = match report.git() {
        Some(git) => format!(
            "{} commits, {} fixes",
            git.summary().commits_analyzed,
            git.summary().fix_commits
        ),
        None if config.git.enabled => "no git history".to_string(),
        None => "git disabled".to_string(),
    };
    step.finish(&format!(
        "{} files, {} functions, {} calls, {}",
        summary.files, summary.functions, summary.edges, history
    ));

    // ── 3. Output ────────────────────────────────────────────────
    match format {
        OutputFormat::Json => println!("{}", output::json::render_report(&report)?),
        OutputFormat::Terminal => {
            let max_items = options.top.unwrap_or(config.output.max_items);
            eprintln!();
            print!("{}", output::terminal::format_report(&report, max_items));
            println!();
            println!("  Time: {:.1}s", start.elapsed().as_secs_f64());
        }
    }

    Ok(ExitStatus::Success)
}

pub(crate) fn commit_cache(root: &Path, config: &FaultlineConfig, no_cache: bool) -> CommitCache {
    if config.git.enabled && config.git.cache && !no_cache {
        CommitCache::new(root)
    } else {
        CommitCache::disabled()
    }
}
