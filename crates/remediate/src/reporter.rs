// SPDX-License-Identifier: MIT

//! Status reporting (C5): renders a finished [`RunTranscript`] as the
//! single-line summary `dcrpm` always prints to stdout, plus the optional
//! JSON rendering behind `--json-summary`.

use dcrpm_core::RunTranscript;

/// `status=REMEDIATED passes=2 actions=[KILL_HOLDERS,REBUILD_DB]`.
pub fn status_line(transcript: &RunTranscript) -> String {
    let actions: Vec<String> = transcript.all_actions().iter().map(|r| r.action.to_string()).collect();
    format!("status={} passes={} actions=[{}]", transcript.status, transcript.passes.len(), actions.join(","))
}

/// Machine-readable mirror of [`status_line`] for `--json-summary`.
pub fn json_summary(transcript: &RunTranscript) -> serde_json::Value {
    serde_json::json!({
        "status": transcript.status,
        "exit_code": transcript.status.exit_code(),
        "passes": transcript.passes,
        "deadline_exceeded": transcript.deadline_exceeded,
        "dry_run": transcript.dry_run,
    })
}

/// Print the run's summary and return the process exit code the binary
/// should terminate with. The status line is always printed; with
/// `--json-summary` a second, machine-readable line follows it.
pub fn report(transcript: &RunTranscript, json_summary_enabled: bool) -> i32 {
    println!("{}", status_line(transcript));
    if json_summary_enabled {
        match serde_json::to_string(&json_summary(transcript)) {
            Ok(rendered) => println!("{rendered}"),
            Err(error) => eprintln!("failed to render JSON summary: {error}"),
        }
    }
    transcript.status.exit_code()
}

#[cfg(test)]
#[path = "reporter_tests.rs"]
mod tests;
