// SPDX-License-Identifier: MIT

use std::time::Duration;

use super::*;

fn spec(argv: &[&str], timeout: Duration) -> RunSpec {
    RunSpec::new(argv.iter().map(|s| s.to_string()).collect(), timeout, Duration::from_millis(200))
}

#[tokio::test]
async fn runs_a_successful_command() {
    let supervisor = ProcessSupervisor::new();
    let result = supervisor
        .run(spec(&["/bin/sh", "-c", "echo hello; exit 0"], Duration::from_secs(5)))
        .await;
    assert_eq!(result.exit_status, ExitStatus::Code(0));
    assert!(result.stdout_str().contains("hello"));
    assert!(!result.terminated_by_us);
}

#[tokio::test]
async fn captures_nonzero_exit_code() {
    let supervisor = ProcessSupervisor::new();
    let result = supervisor.run(spec(&["/bin/sh", "-c", "exit 7"], Duration::from_secs(5))).await;
    assert_eq!(result.exit_status, ExitStatus::Code(7));
}

#[tokio::test]
async fn escalates_to_kill_on_timeout() {
    let supervisor = ProcessSupervisor::new();
    let result = supervisor
        .run(spec(&["/bin/sh", "-c", "trap '' TERM; sleep 30"], Duration::from_millis(100)))
        .await;
    assert_eq!(result.exit_status, ExitStatus::TimedOut);
    assert!(result.terminated_by_us);
}

#[tokio::test]
async fn well_behaved_command_exits_on_sigterm_before_grace_expires() {
    let supervisor = ProcessSupervisor::new();
    let result = supervisor
        .run(spec(&["/bin/sh", "-c", "sleep 30"], Duration::from_millis(100)))
        .await;
    assert_eq!(result.exit_status, ExitStatus::TimedOut);
    assert!(result.terminated_by_us);
}

#[tokio::test]
async fn missing_binary_reports_spawn_failed() {
    let supervisor = ProcessSupervisor::new();
    let result = supervisor
        .run(spec(&["/no/such/binary-dcrpm-test"], Duration::from_secs(5)))
        .await;
    assert_eq!(result.exit_status, ExitStatus::SpawnFailed);
}

#[tokio::test]
async fn empty_argv_reports_spawn_failed_without_spawning() {
    let supervisor = ProcessSupervisor::new();
    let result = supervisor.run(spec(&[], Duration::from_secs(5))).await;
    assert_eq!(result.exit_status, ExitStatus::SpawnFailed);
}
