// SPDX-License-Identifier: MIT

//! `dcrpm`'s command-line surface. One flat argument struct — there are
//! no subcommands, since every invocation runs the same probe/repair
//! cycle against one database.

use std::path::PathBuf;

use clap::Parser;
use dcrpm_core::Verbosity;

#[derive(Parser, Debug)]
#[command(
    name = "dcrpm",
    about = "Detect and repair a corrupt or locked RPM database",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ")"),
    styles = crate::color::styles(),
)]
pub struct Cli {
    /// Path to the rpm db4 database directory.
    #[arg(long, value_name = "PATH", default_value = "/var/lib/rpm")]
    pub dbpath: PathBuf,

    /// Path to yum's state directory (for stale transaction cleanup).
    #[arg(long, value_name = "PATH", default_value = "/var/lib/yum")]
    pub yum_statedir: PathBuf,

    /// Path to the `rpm` binary.
    #[arg(long, value_name = "PATH", default_value = "/usr/bin/rpm")]
    pub rpm: PathBuf,

    /// Path to the `db_recover` binary.
    #[arg(long = "db-recover", value_name = "PATH", default_value = "/usr/bin/db_recover")]
    pub db_recover: PathBuf,

    /// Path to the `db_verify` binary.
    #[arg(long = "db-verify", value_name = "PATH", default_value = "/usr/bin/db_verify")]
    pub db_verify: PathBuf,

    /// Path to the `yum` binary; `yum-complete-transaction` is resolved as
    /// its sibling.
    #[arg(long, value_name = "PATH", default_value = "/usr/bin/yum")]
    pub yum: PathBuf,

    /// Path to the `lsof` binary.
    #[arg(long, value_name = "PATH", default_value = "/usr/bin/lsof")]
    pub lsof: PathBuf,

    /// Per-call deadline for `rpm -qa`, in seconds.
    #[arg(long = "timeout-query", value_name = "SECS", default_value_t = 5)]
    pub timeout_query_secs: u64,

    /// Per-call deadline for `db_recover -v`, in seconds.
    #[arg(long = "timeout-recover", value_name = "SECS", default_value_t = 90)]
    pub timeout_recover_secs: u64,

    /// Per-call deadline for `rpm --rebuilddb`, in seconds.
    #[arg(long = "timeout-rebuild", value_name = "SECS", default_value_t = 600)]
    pub timeout_rebuild_secs: u64,

    /// Per-call deadline for `db_verify`, in seconds.
    #[arg(long = "timeout-verify", value_name = "SECS", default_value_t = 5)]
    pub timeout_verify_secs: u64,

    /// Per-call deadline for `yum-complete-transaction`, in seconds.
    #[arg(long = "timeout-yum", value_name = "SECS", default_value_t = 120)]
    pub timeout_yum_secs: u64,

    /// Per-call deadline for `lsof`, in seconds.
    #[arg(long = "timeout-lsof", value_name = "SECS", default_value_t = 10)]
    pub timeout_lsof_secs: u64,

    /// Deadline for the whole run, in seconds.
    #[arg(long = "timeout-overall", value_name = "SECS", default_value_t = 900)]
    pub timeout_overall_secs: u64,

    /// Maximum probe->repair iterations before giving up.
    #[arg(long, value_name = "N", default_value_t = 3)]
    pub max_passes: usize,

    /// Minimum package count `rpm -qa` must return to be considered healthy.
    #[arg(long = "min-packages", value_name = "N", default_value_t = 30)]
    pub min_packages: usize,

    /// Verify every db4 table with `db_verify` (default: on).
    // Field itself is never read; its sole purpose is to let clap's
    // `overrides_with` reset `no_check_tables` when it appears later.
    #[allow(dead_code)]
    #[arg(long = "check-tables", action = clap::ArgAction::SetTrue, overrides_with = "no_check_tables")]
    check_tables: bool,
    /// Disable `--check-tables`.
    #[arg(long = "no-check-tables", action = clap::ArgAction::SetTrue, overrides_with = "check_tables")]
    no_check_tables: bool,

    /// Allow `rpm --rebuilddb` as a repair action (default: on).
    #[allow(dead_code)]
    #[arg(long = "rebuild", action = clap::ArgAction::SetTrue, overrides_with = "no_rebuild")]
    rebuild: bool,
    /// Disable `--rebuild`.
    #[arg(long = "no-rebuild", action = clap::ArgAction::SetTrue, overrides_with = "rebuild")]
    no_rebuild: bool,

    /// Allow killing processes holding the database open (default: on).
    #[allow(dead_code)]
    #[arg(long = "kill-stuck", action = clap::ArgAction::SetTrue, overrides_with = "no_kill_stuck")]
    kill_stuck: bool,
    /// Disable `--kill-stuck`.
    #[arg(long = "no-kill-stuck", action = clap::ArgAction::SetTrue, overrides_with = "kill_stuck")]
    no_kill_stuck: bool,

    /// Clean up stale yum transaction files (default: on).
    #[allow(dead_code)]
    #[arg(long = "yum-transactions", action = clap::ArgAction::SetTrue, overrides_with = "no_yum_transactions")]
    yum_transactions: bool,
    /// Disable `--yum-transactions`.
    #[arg(long = "no-yum-transactions", action = clap::ArgAction::SetTrue, overrides_with = "yum_transactions")]
    no_yum_transactions: bool,

    /// Relax the "at most one REBUILD_DB per run" invariant.
    #[arg(long)]
    pub allow_multiple_rebuilds: bool,

    /// Reserved escape hatch: allow deleting unrecoverable package entries.
    /// Never selected automatically.
    #[arg(long)]
    pub allow_package_cleanup: bool,

    /// Log and report what would happen without running any repair.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging verbosity.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub verbosity: Verbosity,

    /// Print the run summary as JSON instead of the one-line status.
    #[arg(long)]
    pub json_summary: bool,
}

impl Cli {
    pub fn check_tables(&self) -> bool {
        !self.no_check_tables
    }

    pub fn rebuild_db(&self) -> bool {
        !self.no_rebuild
    }

    pub fn kill_stuck(&self) -> bool {
        !self.no_kill_stuck
    }

    pub fn cleanup_yum_transactions(&self) -> bool {
        !self.no_yum_transactions
    }

    /// Validate and freeze these flags into a [`dcrpm_core::Config`].
    ///
    /// `check_binaries` is disabled in tests so they don't depend on the
    /// host actually having `rpm`/`db_verify`/etc. installed.
    pub fn build_config(&self, check_binaries: bool) -> Result<dcrpm_core::Config, dcrpm_core::ConfigError> {
        dcrpm_core::ConfigBuilder::new()
            .db_path(self.dbpath.clone())
            .ys_path(self.yum_statedir.clone())
            .rpm_bin(self.rpm.clone())
            .recover_bin(self.db_recover.clone())
            .verify_bin(self.db_verify.clone())
            .yum_bin(self.yum.clone())
            .lsof_bin(self.lsof.clone())
            .timeouts(dcrpm_core::Timeouts {
                query: std::time::Duration::from_secs(self.timeout_query_secs),
                recover: std::time::Duration::from_secs(self.timeout_recover_secs),
                rebuild: std::time::Duration::from_secs(self.timeout_rebuild_secs),
                verify: std::time::Duration::from_secs(self.timeout_verify_secs),
                yum: std::time::Duration::from_secs(self.timeout_yum_secs),
                lsof: std::time::Duration::from_secs(self.timeout_lsof_secs),
                overall: std::time::Duration::from_secs(self.timeout_overall_secs),
                ..dcrpm_core::Timeouts::default()
            })
            .max_passes(self.max_passes)
            .min_expected_packages(self.min_packages)
            .features(dcrpm_core::FeatureSwitches {
                check_tables: self.check_tables(),
                rebuild_db: self.rebuild_db(),
                cleanup_yum_transactions: self.cleanup_yum_transactions(),
                kill_stuck: self.kill_stuck(),
                verify_tables: self.check_tables(),
                allow_multiple_rebuilds: self.allow_multiple_rebuilds,
                allow_package_cleanup: self.allow_package_cleanup,
            })
            .dry_run(self.dry_run)
            .verbosity(self.verbosity)
            .json_summary(self.json_summary)
            .build(check_binaries)
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
