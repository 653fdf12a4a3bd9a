//! Faultline CLI - call-graph health analysis

use anyhow::Result;
use clap::Parser;
use faultline_cli::{commands, Cli, Commands, ExitStatus};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let status = match &cli.command {
        Some(Commands::Analyze {
            path,
            no_git,
            no_cache,
            top,
        }) => {
            let options = commands::analyze::AnalyzeOptions {
                no_git: *no_git,
                no_cache: *no_cache,
                top: *top,
            };
            commands::analyze::run(path.as_deref(), &options, &cli)?
        }
        Some(Commands::Diff {
            range,
            path,
            no_git,
            fail_on_stressed,
        }) => {
            let options = commands::diff::DiffOptions {
                no_git: *no_git,
                fail_on_stressed: *fail_on_stressed,
            };
            commands::diff::run(range, path.as_deref(), &options, &cli)?
        }
        Some(Commands::Init { path }) => {
            commands::init::run(path.as_deref())?;
            ExitStatus::Success
        }
        None => {
            // Default command is analyze with current directory
            commands::analyze::run(None, &commands::analyze::AnalyzeOptions::default(), &cli)?
        }
    };

    if status != ExitStatus::Success {
        std::process::exit(status.code());
    }
    Ok(())
}

/// Logs go to stderr so JSON on stdout stays clean
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
