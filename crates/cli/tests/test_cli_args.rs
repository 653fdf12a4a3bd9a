use clap::Parser;
use faultline_cli::{Cli, Commands, ExitStatus, OutputFormat};
use std::path::PathBuf;

#[test]
fn test_no_subcommand_defaults_to_analyze() {
    let cli = Cli::try_parse_from(["faultline"]).unwrap();
    assert!(cli.command.is_none());
    assert!(cli.format.is_none());
    assert!(!cli.verbose);
}

#[test]
fn test_analyze_flags() {
    let cli = Cli::try_parse_from([
        "faultline", "analyze", "src", "--no-git", "--top", "5", "--format", "json",
    ])
    .unwrap();
    assert_eq!(cli.format, Some(OutputFormat::Json));
    match cli.command {
        Some(Commands::Analyze {
            path,
            no_git,
            no_cache,
            top,
        }) => {
            assert_eq!(path, Some(PathBuf::from("src")));
            assert!(no_git);
            assert!(!no_cache);
            assert_eq!(top, Some(5));
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_diff_requires_range() {
    assert!(Cli::try_parse_from(["faultline", "diff"]).is_err());

    let cli = Cli::try_parse_from([
        "faultline",
        "-v",
        "diff",
        "main..HEAD",
        "--path",
        "packages/api",
        "--fail-on-stressed",
    ])
    .unwrap();
    assert!(cli.verbose);
    match cli.command {
        Some(Commands::Diff {
            range,
            path,
            no_git,
            fail_on_stressed,
        }) => {
            assert_eq!(range, "main..HEAD");
            assert_eq!(path, Some(PathBuf::from("packages/api")));
            assert!(!no_git);
            assert!(fail_on_stressed);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_unknown_format_is_rejected() {
    assert!(Cli::try_parse_from(["faultline", "--format", "xml"]).is_err());
}

#[test]
fn test_exit_codes() {
    assert_eq!(ExitStatus::Success.code(), 0);
    assert_eq!(ExitStatus::Failed.code(), 1);
}
