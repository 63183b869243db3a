// SPDX-License-Identifier: MIT

//! Typed wrappers over `rpm`, `db_recover`, `db_verify`, `rpm --rebuilddb`,
//! and yum transaction cleanup (C3). Every operation returns a classified
//! [`RpmSymptom`] alongside the raw [`CommandResult`] it was derived from.

use dcrpm_core::{CommandResult, Config, ExitStatus, RpmSymptom};
use dcrpm_supervisor::{RunSpec, Runner};

use crate::classify::{classify_query_stderr, classify_verify_failure};

/// Stateless wrapper tying a [`Runner`] to a run's [`Config`] for every
/// RPM-database probe and repair invocation.
pub struct RpmProbe<'a, R: Runner> {
    runner: &'a R,
    config: &'a Config,
}

impl<'a, R: Runner> RpmProbe<'a, R> {
    pub fn new(runner: &'a R, config: &'a Config) -> Self {
        Self { runner, config }
    }

    /// `rpm -qa --dbpath=<dbPath>`.
    pub async fn probe_query(&self) -> (RpmSymptom, CommandResult) {
        let argv = vec![
            self.config.rpm_bin.display().to_string(),
            "-qa".into(),
            format!("--dbpath={}", self.config.db_path.display()),
        ];
        let spec = RunSpec::new(argv, self.config.timeouts.query, self.config.timeouts.grace);
        let result = self.runner.run(spec).await;

        let symptom = match result.exit_status {
            ExitStatus::TimedOut => RpmSymptom::QueryHung,
            _ if !result.exit_status.is_success() => classify_query_stderr(&result.stderr_str())
                .unwrap_or_else(|| RpmSymptom::Unknown { raw: result.stderr_str().into_owned() }),
            _ => {
                let lines = result.stdout_lines();
                let expected = self.config.min_expected_packages;
                if lines.is_empty() {
                    RpmSymptom::QueryEmpty { expected }
                } else if lines.len() < expected {
                    RpmSymptom::QueryShort { expected, got: lines.len() }
                } else {
                    RpmSymptom::Healthy
                }
            }
        };

        (symptom, result)
    }

    /// `db_verify` on every db4 table file under `dbPath` (basenames
    /// starting with an uppercase letter). Missing `Packages` is reported
    /// before any verification is attempted, since nothing else is
    /// meaningful without it.
    pub async fn probe_tables(&self) -> (RpmSymptom, Vec<CommandResult>) {
        let tables = match self.list_table_files() {
            Ok(tables) => tables,
            Err(_) => return (RpmSymptom::TableMissing { table: "Packages".into() }, Vec::new()),
        };

        if !tables.iter().any(|t| t == "Packages") {
            return (RpmSymptom::TableMissing { table: "Packages".into() }, Vec::new());
        }

        let mut results = Vec::with_capacity(tables.len());
        let mut symptom = RpmSymptom::Healthy;

        for table in tables {
            let path = self.config.db_path.join(&table);
            let argv = vec![self.config.verify_bin.display().to_string(), path.display().to_string()];
            let spec = RunSpec::new(argv, self.config.timeouts.verify, self.config.timeouts.grace);
            let result = self.runner.run(spec).await;

            if !result.exit_status.is_success() && matches!(symptom, RpmSymptom::Healthy) {
                symptom = classify_verify_failure(&table, &result.stderr_str());
            }
            results.push(result);
        }

        (symptom, results)
    }

    /// Query every package name from the primary index, then attempt a
    /// per-package lookup; any lookup failure indicates the secondary
    /// indexes disagree with `Packages`.
    pub async fn probe_index_consistency(&self) -> (RpmSymptom, Vec<CommandResult>) {
        let list_argv = vec![
            self.config.rpm_bin.display().to_string(),
            "-qa".into(),
            "--qf".into(),
            "%{NAME}\\n".into(),
            format!("--dbpath={}", self.config.db_path.display()),
        ];
        let list_spec = RunSpec::new(list_argv, self.config.timeouts.query, self.config.timeouts.grace);
        let list_result = self.runner.run(list_spec).await;
        if !list_result.exit_status.is_success() {
            return (RpmSymptom::Healthy, vec![list_result]);
        }

        let mut results = vec![list_result.clone()];
        for name in list_result.stdout_lines() {
            let argv = vec![
                self.config.rpm_bin.display().to_string(),
                "-q".into(),
                name.clone(),
                format!("--dbpath={}", self.config.db_path.display()),
            ];
            let spec = RunSpec::new(argv, self.config.timeouts.query, self.config.timeouts.grace);
            let result = self.runner.run(spec).await;
            let failed = !result.exit_status.is_success();
            results.push(result);
            if failed {
                return (RpmSymptom::IndexInconsistent { package: name }, results);
            }
        }

        (RpmSymptom::Healthy, results)
    }

    /// `transaction-*` files left behind under `ysPath`.
    pub async fn probe_yum_transactions(&self) -> RpmSymptom {
        let count = std::fs::read_dir(&self.config.ys_path)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|entry| entry.file_name().to_string_lossy().starts_with("transaction-"))
                    .count()
            })
            .unwrap_or(0);

        if count > 0 {
            RpmSymptom::StaleYumTransaction { count }
        } else {
            RpmSymptom::Healthy
        }
    }

    /// `db_recover -v`, conventionally run with `cwd = dbPath`.
    pub async fn recover_db(&self) -> CommandResult {
        let argv = vec![self.config.recover_bin.display().to_string(), "-v".into()];
        let spec = RunSpec::new(argv, self.config.timeouts.recover, self.config.timeouts.grace)
            .with_cwd(self.config.db_path.clone());
        self.runner.run(spec).await
    }

    /// `rpm --rebuilddb --dbpath=<dbPath>`.
    pub async fn rebuild_db(&self) -> CommandResult {
        let argv = vec![
            self.config.rpm_bin.display().to_string(),
            "--rebuilddb".into(),
            format!("--dbpath={}", self.config.db_path.display()),
        ];
        let spec = RunSpec::new(argv, self.config.timeouts.rebuild, self.config.timeouts.grace);
        self.runner.run(spec).await
    }

    /// `yum-complete-transaction --cleanup-only`, resolved as a sibling of
    /// the configured `yum` binary.
    pub async fn clean_yum_transactions(&self) -> CommandResult {
        let argv = vec![self.yum_complete_transaction_bin().display().to_string(), "--cleanup-only".into()];
        let spec = RunSpec::new(argv, self.config.timeouts.yum, self.config.timeouts.grace);
        self.runner.run(spec).await
    }

    fn yum_complete_transaction_bin(&self) -> std::path::PathBuf {
        self.config
            .yum_bin
            .parent()
            .map(|dir| dir.join("yum-complete-transaction"))
            .unwrap_or_else(|| std::path::PathBuf::from("yum-complete-transaction"))
    }

    fn list_table_files(&self) -> std::io::Result<Vec<String>> {
        let mut tables: Vec<String> = std::fs::read_dir(&self.config.db_path)?
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| name.chars().next().is_some_and(|c| c.is_ascii_uppercase()))
            .collect();
        tables.sort();
        Ok(tables)
    }
}

#[cfg(test)]
#[path = "rpm_tests.rs"]
mod tests;
