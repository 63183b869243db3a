// SPDX-License-Identifier: MIT

use clap::Parser;
use dcrpm_core::Verbosity;

use super::*;

fn parse(args: &[&str]) -> Cli {
    let mut full = vec!["dcrpm"];
    full.extend_from_slice(args);
    Cli::try_parse_from(full).expect("parse")
}

#[test]
fn defaults_enable_every_remediation() {
    let cli = parse(&[]);
    assert!(cli.check_tables());
    assert!(cli.rebuild_db());
    assert!(cli.kill_stuck());
    assert!(cli.cleanup_yum_transactions());
    assert!(!cli.dry_run);
    assert!(!cli.json_summary);
    assert_eq!(cli.verbosity, Verbosity::Info);
}

#[test]
fn no_flags_disable_their_matching_feature() {
    let cli = parse(&["--no-check-tables", "--no-rebuild", "--no-kill-stuck", "--no-yum-transactions"]);
    assert!(!cli.check_tables());
    assert!(!cli.rebuild_db());
    assert!(!cli.kill_stuck());
    assert!(!cli.cleanup_yum_transactions());
}

#[test]
fn a_later_positive_flag_overrides_an_earlier_negative_one() {
    let cli = parse(&["--no-check-tables", "--check-tables"]);
    assert!(cli.check_tables());
}

#[test]
fn timeouts_and_paths_are_threaded_into_the_built_config() {
    let cli = parse(&[
        "--dbpath",
        "/tmp/rpmdb",
        "--timeout-query",
        "7",
        "--max-passes",
        "5",
        "--min-packages",
        "42",
    ]);
    let config = cli.build_config(false).expect("valid config");

    assert_eq!(config.db_path, std::path::PathBuf::from("/tmp/rpmdb"));
    assert_eq!(config.timeouts.query, std::time::Duration::from_secs(7));
    assert_eq!(config.max_passes, 5);
    assert_eq!(config.min_expected_packages, 42);
}

#[test]
fn zero_max_passes_is_rejected_by_config_validation() {
    let cli = parse(&["--max-passes", "0"]);
    assert!(cli.build_config(false).is_err());
}

#[test]
fn dry_run_and_json_summary_flags_are_threaded_through() {
    let cli = parse(&["--dry-run", "--json-summary", "--verbosity", "debug"]);
    let config = cli.build_config(false).expect("valid config");

    assert!(config.dry_run);
    assert!(config.json_summary);
    assert_eq!(config.verbosity, Verbosity::Debug);
}
