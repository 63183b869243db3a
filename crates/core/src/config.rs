// SPDX-License-Identifier: MIT

//! Immutable per-run configuration (C6).
//!
//! A [`Config`] is assembled once at startup — normally from the `dcrpm`
//! binary's `clap`-derived CLI struct — validated, and then passed
//! read-only to every other component for the lifetime of the run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Verbosity level, mapped to a `tracing` filter by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Info,
    Debug,
}

impl std::str::FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiet" => Ok(Self::Quiet),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            other => Err(format!("unknown verbosity: {other}")),
        }
    }
}

/// Signal used to terminate a stuck holder or a timed-out child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KillSignal {
    Term,
    #[default]
    Kill,
}

impl KillSignal {
    pub fn as_nix_signal(self) -> nix::sys::signal::Signal {
        match self {
            Self::Term => nix::sys::signal::Signal::SIGTERM,
            Self::Kill => nix::sys::signal::Signal::SIGKILL,
        }
    }
}

/// Per-operation timeouts (Table A of the design, all in seconds on the CLI).
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub query: Duration,
    pub recover: Duration,
    pub rebuild: Duration,
    pub verify: Duration,
    pub yum: Duration,
    pub lsof: Duration,
    pub overall: Duration,
    /// Grace period between SIGTERM and SIGKILL escalation.
    pub grace: Duration,
    /// How long to wait for a killed holder to actually exit before giving up.
    pub reap: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            query: Duration::from_secs(5),
            recover: Duration::from_secs(90),
            rebuild: Duration::from_secs(600),
            verify: Duration::from_secs(5),
            yum: Duration::from_secs(120),
            lsof: Duration::from_secs(10),
            overall: Duration::from_secs(900),
            grace: Duration::from_secs(5),
            reap: Duration::from_secs(5),
        }
    }
}

/// Which remediations are enabled for this run.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSwitches {
    pub check_tables: bool,
    pub rebuild_db: bool,
    pub cleanup_yum_transactions: bool,
    pub kill_stuck: bool,
    pub verify_tables: bool,
    /// Relaxes the "at most one REBUILD_DB per run" invariant.
    pub allow_multiple_rebuilds: bool,
    /// Open-question feature flag: never selected automatically by the
    /// state machine, reserved for a future explicit invocation path.
    pub allow_package_cleanup: bool,
}

impl Default for FeatureSwitches {
    fn default() -> Self {
        Self {
            check_tables: true,
            rebuild_db: true,
            cleanup_yum_transactions: true,
            kill_stuck: true,
            verify_tables: true,
            allow_multiple_rebuilds: false,
            allow_package_cleanup: false,
        }
    }
}

/// Immutable, fully-validated run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub ys_path: PathBuf,
    pub rpm_bin: PathBuf,
    pub recover_bin: PathBuf,
    pub verify_bin: PathBuf,
    pub yum_bin: PathBuf,
    pub lsof_bin: PathBuf,
    pub timeouts: Timeouts,
    pub max_passes: usize,
    pub min_expected_packages: usize,
    pub features: FeatureSwitches,
    pub kill_signal: KillSignal,
    pub dry_run: bool,
    pub verbosity: Verbosity,
    pub json_summary: bool,
    /// Process IDs never considered stuck holders (always includes our own).
    pub ignore_pids: Vec<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("/var/lib/rpm"),
            ys_path: PathBuf::from("/var/lib/yum"),
            rpm_bin: PathBuf::from("/usr/bin/rpm"),
            recover_bin: PathBuf::from("/usr/bin/db_recover"),
            verify_bin: PathBuf::from("/usr/bin/db_verify"),
            yum_bin: PathBuf::from("/usr/bin/yum"),
            lsof_bin: PathBuf::from("/usr/bin/lsof"),
            timeouts: Timeouts::default(),
            max_passes: 3,
            min_expected_packages: 30,
            features: FeatureSwitches::default(),
            kill_signal: KillSignal::default(),
            dry_run: false,
            verbosity: Verbosity::default(),
            json_summary: false,
            ignore_pids: Vec::new(),
        }
    }
}

/// Builder for [`Config`]; the `dcrpm` binary's CLI parser fills one of
/// these in from flags and calls [`ConfigBuilder::build`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self { config: Config::default() }
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    crate::setters! {
        set { db_path: PathBuf }
        set { ys_path: PathBuf }
        set { rpm_bin: PathBuf }
        set { recover_bin: PathBuf }
        set { verify_bin: PathBuf }
        set { yum_bin: PathBuf }
        set { lsof_bin: PathBuf }
        set { timeouts: Timeouts }
        set { max_passes: usize }
        set { min_expected_packages: usize }
        set { features: FeatureSwitches }
        set { kill_signal: KillSignal }
        set { dry_run: bool }
        set { verbosity: Verbosity }
        set { json_summary: bool }
        set { ignore_pids: Vec<i32> }
    }

    /// Validate and freeze the configuration.
    ///
    /// `check_binaries` is disabled in unit tests so they don't depend on
    /// the host actually having `rpm`/`db_verify`/etc. installed.
    pub fn build(self, check_binaries: bool) -> Result<Config, ConfigError> {
        let cfg = self.config;

        if cfg.max_passes == 0 {
            return Err(ConfigError::InvalidValue("--max-passes must be at least 1".into()));
        }
        if cfg.timeouts.overall.is_zero() {
            return Err(ConfigError::InvalidValue("--timeout-overall must be positive".into()));
        }

        if check_binaries {
            for bin in [
                &cfg.rpm_bin,
                &cfg.recover_bin,
                &cfg.verify_bin,
                &cfg.yum_bin,
                &cfg.lsof_bin,
            ] {
                require_binary(bin)?;
            }
        }

        Ok(cfg)
    }
}

fn require_binary(path: &Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        if !path.exists() {
            return Err(ConfigError::MissingBinary(path.display().to_string()));
        }
        return Ok(());
    }
    // Relative binary name: defer to PATH lookup, which the supervisor
    // performs at spawn time; we only reject it here if it is empty.
    if path.as_os_str().is_empty() {
        return Err(ConfigError::MissingBinary("<empty>".into()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
