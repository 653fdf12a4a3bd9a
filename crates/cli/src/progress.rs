//! Spinner lines for the pipeline stages, written to stderr

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// One timed pipeline stage, e.g. `Analyzing call graph...`.
///
/// On a non-TTY the spinner draws nothing; the closing line is still printed.
pub struct Step {
    pb: ProgressBar,
    label: String,
    started: Instant,
}

impl Step {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(label.clone());
        pb.enable_steady_tick(Duration::from_millis(80));
        Self {
            pb,
            label,
            started: Instant::now(),
        }
    }

    /// `  Analyzing call graph... done in 0.4s (12 files, 80 functions)`
    pub fn finish(self, summary: &str) {
        self.pb.finish_and_clear();
        eprintln!(
            "  {}... {} in {:.1}s ({})",
            self.label,
            "done".green(),
            self.started.elapsed().as_secs_f64(),
            summary
        );
    }

    /// Printed above the spinner so it is not overwritten
    pub fn warn(&self, msg: impl std::fmt::Display) {
        self.pb
            .println(format!("  {} {}", "warning:".yellow().bold(), msg));
    }
}
