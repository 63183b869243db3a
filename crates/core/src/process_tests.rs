// SPDX-License-Identifier: MIT

use super::*;

fn sample(exit_status: ExitStatus, terminated_by_us: bool) -> CommandResult {
    CommandResult {
        argv: vec!["/usr/bin/rpm".into(), "-qa".into()],
        started_at_epoch_ms: epoch_ms_now(),
        elapsed: Duration::from_millis(42),
        exit_status,
        stdout: b"foo-1.0\nbar-2.0\n".to_vec(),
        stderr: Vec::new(),
        stdout_truncated: false,
        stderr_truncated: false,
        terminated_by_us,
    }
}

#[test]
fn success_exit_status() {
    assert!(ExitStatus::Code(0).is_success());
    assert!(!ExitStatus::Code(1).is_success());
    assert!(!ExitStatus::TimedOut.is_success());
}

#[test]
fn stdout_lines_trims_and_drops_blanks() {
    let result = sample(ExitStatus::Code(0), false);
    assert_eq!(result.stdout_lines(), vec!["foo-1.0", "bar-2.0"]);
}

#[test]
fn display_formats_each_variant() {
    assert_eq!(ExitStatus::Code(1).to_string(), "exit(1)");
    assert_eq!(ExitStatus::Signal(9).to_string(), "signal(9)");
    assert_eq!(ExitStatus::TimedOut.to_string(), "timed_out");
    assert_eq!(ExitStatus::SpawnFailed.to_string(), "spawn_failed");
}

#[test]
fn round_trips_through_json() {
    let result = sample(ExitStatus::TimedOut, true);
    let json = serde_json::to_string(&result).expect("serialize");
    let back: CommandResult = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.exit_status, ExitStatus::TimedOut);
    assert!(back.terminated_by_us);
    assert_eq!(back.stdout_str(), result.stdout_str());
}
