// SPDX-License-Identifier: MIT

//! File-handle inspector (C2): who still has a file descriptor open on the
//! database, and killing them off.

use std::path::PathBuf;
use std::time::Duration;

use dcrpm_core::KillSignal;
use dcrpm_supervisor::{RunSpec, Runner};
use nix::sys::signal::kill;
use nix::unistd::Pid;

use crate::error::ProbeError;

/// One process holding a handle open on a watched path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holder {
    pub pid: i32,
    pub command: String,
}

/// Result of a [`FileHandleInspector::kill_holders`] call.
#[derive(Debug, Clone, Default)]
pub struct KillOutcome {
    pub killed: Vec<i32>,
    pub failed: Vec<i32>,
}

/// Finds and terminates processes holding file handles open under a
/// directory, using `lsof`'s machine-readable `-F pcn` mode.
pub struct FileHandleInspector<'a, R: Runner> {
    runner: &'a R,
    lsof_bin: PathBuf,
    timeout: Duration,
    exclude_pids: Vec<i32>,
}

impl<'a, R: Runner> FileHandleInspector<'a, R> {
    pub fn new(runner: &'a R, lsof_bin: PathBuf, timeout: Duration, exclude_pids: Vec<i32>) -> Self {
        Self { runner, lsof_bin, timeout, exclude_pids }
    }

    /// Enumerate processes holding anything open under `dir`.
    pub async fn holders(&self, dir: &std::path::Path) -> Result<Vec<Holder>, ProbeError> {
        let argv = vec![
            self.lsof_bin.display().to_string(),
            "-F".into(),
            "pcn".into(),
            "+D".into(),
            dir.display().to_string(),
        ];
        let result = self.runner.run(RunSpec::new(argv, self.timeout, Duration::from_secs(2))).await;

        match result.exit_status {
            dcrpm_core::ExitStatus::TimedOut => {
                return Err(ProbeError::InspectorUnavailable("lsof timed out".into()))
            }
            dcrpm_core::ExitStatus::SpawnFailed => {
                return Err(ProbeError::InspectorUnavailable("lsof binary unavailable".into()))
            }
            // lsof exits non-zero when nothing is found; that's a valid "no holders".
            _ => {}
        }

        Ok(parse_holders(&result.stdout_str(), &self.exclude_pids))
    }

    /// Kill every holder of `dir`, then re-poll up to `reap_timeout` to see
    /// who's still alive.
    pub async fn kill_holders(
        &self,
        dir: &std::path::Path,
        signal: KillSignal,
        reap_timeout: Duration,
    ) -> Result<KillOutcome, ProbeError> {
        let holders = self.holders(dir).await?;
        if holders.is_empty() {
            return Ok(KillOutcome::default());
        }

        let nix_signal = signal.as_nix_signal();
        for holder in &holders {
            if let Err(error) = kill(Pid::from_raw(holder.pid), nix_signal) {
                tracing::debug!(pid = holder.pid, %error, "signal delivery failed (already gone?)");
            }
        }

        tokio::time::sleep(reap_timeout).await;
        let remaining = self.holders(dir).await?;
        let remaining_pids: Vec<i32> = remaining.iter().map(|h| h.pid).collect();

        let mut killed = Vec::new();
        let mut failed = Vec::new();
        for holder in holders {
            if remaining_pids.contains(&holder.pid) {
                failed.push(holder.pid);
            } else {
                killed.push(holder.pid);
            }
        }

        Ok(KillOutcome { killed, failed })
    }
}

/// Parse `lsof -F pcn` output into deduplicated holders, excluding our own
/// PID and any configured ignore list.
///
/// Format: a `p<pid>` line starts a new process record, followed by one
/// `c<command>` line and one or more `n<name>` lines (one per open file).
pub fn parse_holders(output: &str, exclude_pids: &[i32]) -> Vec<Holder> {
    let mut current_pid: Option<i32> = None;
    let mut current_comm: Option<String> = None;
    let mut holders = Vec::new();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        let (tag, rest) = line.split_at(1);
        match tag {
            "p" => {
                current_pid = rest.parse::<i32>().ok();
                current_comm = None;
            }
            "c" => current_comm = Some(rest.to_string()),
            "n" => {
                if let (Some(pid), Some(command)) = (current_pid, current_comm.clone()) {
                    if !exclude_pids.contains(&pid) {
                        holders.push(Holder { pid, command });
                    }
                }
            }
            _ => {}
        }
    }

    holders.sort_by_key(|h| h.pid);
    holders.dedup_by_key(|h| h.pid);
    holders
}

#[cfg(test)]
#[path = "holders_tests.rs"]
mod tests;
