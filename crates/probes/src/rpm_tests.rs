// SPDX-License-Identifier: MIT

use std::sync::Mutex;

use async_trait::async_trait;
use dcrpm_core::ConfigBuilder;
use tempfile::TempDir;

use super::*;

/// A scripted [`Runner`] that returns one queued [`CommandResult`] per
/// call, in order, regardless of what argv was requested.
struct ScriptedRunner {
    queue: Mutex<Vec<CommandResult>>,
}

impl ScriptedRunner {
    fn new(results: Vec<CommandResult>) -> Self {
        Self { queue: Mutex::new(results.into_iter().rev().collect()) }
    }
}

#[async_trait]
impl Runner for ScriptedRunner {
    async fn run(&self, spec: RunSpec) -> CommandResult {
        let mut result = self.queue.lock().expect("lock").pop().unwrap_or_else(|| healthy_result());
        result.argv = spec.argv;
        result
    }
}

fn healthy_result() -> CommandResult {
    CommandResult {
        argv: Vec::new(),
        started_at_epoch_ms: 0,
        elapsed: std::time::Duration::from_millis(10),
        exit_status: ExitStatus::Code(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
        stdout_truncated: false,
        stderr_truncated: false,
        terminated_by_us: false,
    }
}

fn result_with(exit_status: ExitStatus, stdout: &str, stderr: &str) -> CommandResult {
    CommandResult {
        exit_status,
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
        ..healthy_result()
    }
}

fn config_for(db_path: &std::path::Path, ys_path: &std::path::Path) -> Config {
    ConfigBuilder::new()
        .db_path(db_path.to_path_buf())
        .ys_path(ys_path.to_path_buf())
        .min_expected_packages(2)
        .build(false)
        .expect("valid config")
}

#[tokio::test]
async fn probe_query_reports_healthy_with_enough_packages() {
    let runner = ScriptedRunner::new(vec![result_with(ExitStatus::Code(0), "a-1\nb-1\n", "")]);
    let dir = TempDir::new().expect("tempdir");
    let config = config_for(dir.path(), dir.path());
    let probe = RpmProbe::new(&runner, &config);

    let (symptom, _) = probe.probe_query().await;
    assert_eq!(symptom, RpmSymptom::Healthy);
}

#[tokio::test]
async fn probe_query_reports_short_below_minimum() {
    let runner = ScriptedRunner::new(vec![result_with(ExitStatus::Code(0), "a-1\n", "")]);
    let dir = TempDir::new().expect("tempdir");
    let config = config_for(dir.path(), dir.path());
    let probe = RpmProbe::new(&runner, &config);

    let (symptom, _) = probe.probe_query().await;
    assert_eq!(symptom, RpmSymptom::QueryShort { expected: 2, got: 1 });
}

#[tokio::test]
async fn probe_query_reports_empty_with_no_output() {
    let runner = ScriptedRunner::new(vec![result_with(ExitStatus::Code(0), "", "")]);
    let dir = TempDir::new().expect("tempdir");
    let config = config_for(dir.path(), dir.path());
    let probe = RpmProbe::new(&runner, &config);

    let (symptom, _) = probe.probe_query().await;
    assert_eq!(symptom, RpmSymptom::QueryEmpty { expected: 2 });
}

#[tokio::test]
async fn probe_query_reports_hung_on_timeout() {
    let runner = ScriptedRunner::new(vec![result_with(ExitStatus::TimedOut, "", "")]);
    let dir = TempDir::new().expect("tempdir");
    let config = config_for(dir.path(), dir.path());
    let probe = RpmProbe::new(&runner, &config);

    let (symptom, _) = probe.probe_query().await;
    assert_eq!(symptom, RpmSymptom::QueryHung);
}

#[tokio::test]
async fn probe_query_classifies_known_stderr_signature() {
    let runner = ScriptedRunner::new(vec![result_with(
        ExitStatus::Code(1),
        "",
        "error: db3 error(3) from dbenv->open: DB_RUNRECOVERY",
    )]);
    let dir = TempDir::new().expect("tempdir");
    let config = config_for(dir.path(), dir.path());
    let probe = RpmProbe::new(&runner, &config);

    let (symptom, _) = probe.probe_query().await;
    assert_eq!(symptom, RpmSymptom::DbNeedsRecover);
}

#[tokio::test]
async fn probe_query_falls_back_to_unknown_for_unrecognized_stderr() {
    let runner = ScriptedRunner::new(vec![result_with(ExitStatus::Code(1), "", "never seen before")]);
    let dir = TempDir::new().expect("tempdir");
    let config = config_for(dir.path(), dir.path());
    let probe = RpmProbe::new(&runner, &config);

    let (symptom, _) = probe.probe_query().await;
    assert!(matches!(symptom, RpmSymptom::Unknown { .. }));
}

#[tokio::test]
async fn probe_tables_reports_missing_packages_without_verifying() {
    let runner = ScriptedRunner::new(vec![]);
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("Name"), b"").expect("write fixture");
    let config = config_for(dir.path(), dir.path());
    let probe = RpmProbe::new(&runner, &config);

    let (symptom, results) = probe.probe_tables().await;
    assert_eq!(symptom, RpmSymptom::TableMissing { table: "Packages".into() });
    assert!(results.is_empty());
}

#[tokio::test]
async fn probe_tables_reports_corrupt_on_verify_failure() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("Packages"), b"").expect("write fixture");
    let config = config_for(dir.path(), dir.path());
    let runner = ScriptedRunner::new(vec![result_with(ExitStatus::Code(1), "", "DB_VERIFY_BAD")]);
    let probe = RpmProbe::new(&runner, &config);

    let (symptom, results) = probe.probe_tables().await;
    assert_eq!(
        symptom,
        RpmSymptom::TableCorrupt { table: "Packages".into(), detail: "DB_VERIFY_BAD".into() }
    );
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn probe_tables_healthy_when_every_table_verifies() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("Packages"), b"").expect("write fixture");
    let config = config_for(dir.path(), dir.path());
    let runner = ScriptedRunner::new(vec![result_with(ExitStatus::Code(0), "", "")]);
    let probe = RpmProbe::new(&runner, &config);

    let (symptom, _) = probe.probe_tables().await;
    assert_eq!(symptom, RpmSymptom::Healthy);
}

#[tokio::test]
async fn probe_yum_transactions_counts_stale_files() {
    let dir = TempDir::new().expect("tempdir");
    let ys = TempDir::new().expect("tempdir");
    std::fs::write(ys.path().join("transaction-all.12345"), b"").expect("write fixture");
    let config = config_for(dir.path(), ys.path());
    let runner = ScriptedRunner::new(vec![]);
    let probe = RpmProbe::new(&runner, &config);

    let symptom = probe.probe_yum_transactions().await;
    assert_eq!(symptom, RpmSymptom::StaleYumTransaction { count: 1 });
}

#[tokio::test]
async fn probe_yum_transactions_healthy_when_state_dir_is_clean() {
    let dir = TempDir::new().expect("tempdir");
    let ys = TempDir::new().expect("tempdir");
    let config = config_for(dir.path(), ys.path());
    let runner = ScriptedRunner::new(vec![]);
    let probe = RpmProbe::new(&runner, &config);

    assert_eq!(probe.probe_yum_transactions().await, RpmSymptom::Healthy);
}

#[tokio::test]
async fn probe_index_consistency_reports_failing_lookup() {
    let dir = TempDir::new().expect("tempdir");
    let config = config_for(dir.path(), dir.path());
    let runner = ScriptedRunner::new(vec![
        result_with(ExitStatus::Code(0), "glibc\nbash\n", ""),
        result_with(ExitStatus::Code(0), "glibc-2.17\n", ""),
        result_with(ExitStatus::Code(1), "", "package bash is not installed"),
    ]);
    let probe = RpmProbe::new(&runner, &config);

    let (symptom, results) = probe.probe_index_consistency().await;
    assert_eq!(symptom, RpmSymptom::IndexInconsistent { package: "bash".into() });
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn recover_db_uses_db_path_as_cwd() {
    let dir = TempDir::new().expect("tempdir");
    let config = config_for(dir.path(), dir.path());
    let runner = ScriptedRunner::new(vec![result_with(ExitStatus::Code(0), "", "")]);
    let probe = RpmProbe::new(&runner, &config);

    let result = probe.recover_db().await;
    assert!(result.exit_status.is_success());
}
