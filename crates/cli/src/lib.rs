//! Faultline CLI library: exposed for integration tests

pub mod commands;
pub mod output;
pub mod progress;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "faultline")]
#[command(about = "Find the functions your codebase quietly depends on", long_about = None)]
#[command(version = faultline_core::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a code base (default command)
    Analyze {
        /// Path to analyze (default: current directory)
        path: Option<PathBuf>,

        /// Skip git history correlation
        #[arg(long)]
        no_git: bool,

        /// Ignore and do not write the commit history cache
        #[arg(long)]
        no_cache: bool,

        /// Max items per terminal section (overrides config)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Compare function health between two git refs
    Diff {
        /// `base..head`, `base...head`, or `base` (head = HEAD)
        range: String,

        /// Directory inside the repository to analyze (default: current directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Skip git history correlation at both refs
        #[arg(long)]
        no_git: bool,

        /// Exit with code 1 when any function is stressed
        #[arg(long)]
        fail_on_stressed: bool,
    },

    /// Initialize .faultline.toml configuration
    Init {
        /// Path to initialize (default: current directory)
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

/// How a command finished, mapped to the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    /// CI gate tripped
    Failed,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failed => 1,
        }
    }
}
