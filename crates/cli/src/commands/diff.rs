//! Diff command: compare function health between two refs

use anyhow::Result;
use colored::Colorize;
use faultline_core::{diff_refs, FaultlineConfig, RefRange};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

use super::analyze::commit_cache;
use crate::output;
use crate::progress::Step;
use crate::{Cli, ExitStatus, OutputFormat};

#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    pub no_git: bool,
    pub fail_on_stressed: bool,
}

pub fn run(
    range: &str,
    path: Option<&Path>,
    options: &DiffOptions,
    cli: &Cli,
) -> Result<ExitStatus> {
    // Malformed ranges fail before any git work
    let range = RefRange::parse(range)?;
    debug!("comparing {} against {}", range.base, range.head);

    let start = Instant::now();
    let root = path.unwrap_or_else(|| Path::new("."));
    let root = std::fs::canonicalize(root).unwrap_or_else(|_| PathBuf::from(root));

    eprintln!(
        "{}",
        format!(
            "  faultline v{} — diff {}",
            faultline_core::VERSION,
            range
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
    let cache = commit_cache(&root, &config, false);

    // ── 2. Both refs ─────────────────────────────────────────────
    let step = Step::new(format!("Analyzing {} and {}", range.base, range.head));
    let result = diff_refs(&root, &range, &config, &cache)?;
    step.finish(&format!(
        "{} stressed, {} improved",
        result.summary.stressed, result.summary.improved
    ));

    // ── 3. Output ────────────────────────────────────────────────
    match format {
        OutputFormat::Json => println!("{}", output::json::render_diff(&result)?),
        OutputFormat::Terminal => {
            eprintln!();
            print!(
                "{}",
                output::terminal::format_diff(&result, config.output.max_items)
            );
            println!("  Time: {:.1}s", start.elapsed().as_secs_f64());
        }
    }

    let gate = options.fail_on_stressed || config.diff.fail_on_stressed;
    if gate && result.has_stressed() {
        eprintln!(
            "  {}",
            format!("{} stressed function(s)", result.summary.stressed).red()
        );
        return Ok(ExitStatus::Failed);
    }
    Ok(ExitStatus::Success)
}
