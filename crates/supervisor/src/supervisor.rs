// SPDX-License-Identifier: MIT

//! Process supervision (C1): spawn one external invocation, capture its
//! output, and enforce a deadline with SIGTERM-then-SIGKILL escalation.

use std::os::unix::process::CommandExt as _;
use std::os::unix::process::ExitStatusExt as _;
use std::time::Duration;

use async_trait::async_trait;
use dcrpm_core::{CommandResult, ExitStatus};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::process::Command;

use crate::capture::drain_bounded;

/// What to run and how long it's allowed to take.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub argv: Vec<String>,
    /// Hard deadline for the command to finish on its own.
    pub timeout: Duration,
    /// Grace period between SIGTERM and SIGKILL once the deadline passes.
    pub grace: Duration,
    /// Working directory for the child, when it matters (e.g. `db_recover`
    /// is conventionally invoked with `cwd = dbPath`).
    pub cwd: Option<std::path::PathBuf>,
}

impl RunSpec {
    pub fn new(argv: Vec<String>, timeout: Duration, grace: Duration) -> Self {
        Self { argv, timeout, grace, cwd: None }
    }

    pub fn with_cwd(mut self, cwd: impl Into<std::path::PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// Abstraction over "run this command and give me back a
/// [`CommandResult`]" so probes and the state machine can be tested
/// against a fake without spawning real processes.
#[async_trait]
pub trait Runner: Send + Sync {
    async fn run(&self, spec: RunSpec) -> CommandResult;
}

/// The real [`Runner`]: spawns a child in its own process group, drains
/// stdout/stderr concurrently, and escalates SIGTERM -> SIGKILL if the
/// deadline passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSupervisor;

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Runner for ProcessSupervisor {
    async fn run(&self, spec: RunSpec) -> CommandResult {
        let started_at_epoch_ms = dcrpm_core::epoch_ms_now();
        let start = std::time::Instant::now();

        let Some((program, args)) = spec.argv.split_first() else {
            return CommandResult {
                argv: spec.argv,
                started_at_epoch_ms,
                elapsed: start.elapsed(),
                exit_status: ExitStatus::SpawnFailed,
                stdout: Vec::new(),
                stderr: Vec::new(),
                stdout_truncated: false,
                stderr_truncated: false,
                terminated_by_us: false,
            };
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .process_group(0)
            // If the overall run deadline fires, `RemediationMachine::run`'s
            // surrounding `tokio::time::timeout` drops this future (and the
            // `Child` handle) mid-`.await` without ever reaching `escalate`
            // below; `kill_on_drop` is what actually reaps the child then.
            .kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(error) => {
                tracing::warn!(argv = ?spec.argv, %error, "failed to spawn command");
                return CommandResult {
                    argv: spec.argv,
                    started_at_epoch_ms,
                    elapsed: start.elapsed(),
                    exit_status: ExitStatus::SpawnFailed,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                    stdout_truncated: false,
                    stderr_truncated: false,
                    terminated_by_us: false,
                };
            }
        };

        let pid = child.id();
        // `Stdio::piped()` above guarantees these are `Some`; fall back to an
        // empty reader rather than panicking if that invariant is ever broken.
        let stdout: Box<dyn tokio::io::AsyncRead + Send + Unpin> = match child.stdout.take() {
            Some(s) => Box::new(s),
            None => Box::new(tokio::io::empty()),
        };
        let stderr: Box<dyn tokio::io::AsyncRead + Send + Unpin> = match child.stderr.take() {
            Some(s) => Box::new(s),
            None => Box::new(tokio::io::empty()),
        };
        let stdout_task = tokio::spawn(drain_bounded(stdout));
        let stderr_task = tokio::spawn(drain_bounded(stderr));

        let terminated_by_us = tokio::select! {
            biased;
            _ = tokio::time::sleep(spec.timeout) => {
                tracing::warn!(argv = ?spec.argv, timeout = ?spec.timeout, "command exceeded deadline, escalating");
                escalate(pid, spec.grace, &mut child).await;
                true
            }
            _ = child.wait() => false,
        };

        let exit_status = if terminated_by_us {
            ExitStatus::TimedOut
        } else {
            match child.wait().await {
                Ok(status) => status_to_exit_status(status),
                Err(_) => ExitStatus::SpawnFailed,
            }
        };

        let (stdout, stdout_truncated) = stdout_task.await.unwrap_or_else(|_| (Vec::new(), false));
        let (stderr, stderr_truncated) = stderr_task.await.unwrap_or_else(|_| (Vec::new(), false));

        CommandResult {
            argv: spec.argv,
            started_at_epoch_ms,
            elapsed: start.elapsed(),
            exit_status,
            stdout,
            stderr,
            stdout_truncated,
            stderr_truncated,
            terminated_by_us,
        }
    }
}

fn status_to_exit_status(status: std::process::ExitStatus) -> ExitStatus {
    if let Some(signal) = status.signal() {
        return ExitStatus::Signal(signal);
    }
    ExitStatus::Code(status.code().unwrap_or(-1))
}

/// Send SIGTERM to the whole process group, give it `grace` to exit, then
/// SIGKILL if it's still alive.
async fn escalate(pid: Option<u32>, grace: Duration, child: &mut tokio::process::Child) {
    let Some(pid) = pid else { return };
    let pgid = Pid::from_raw(pid as i32);

    if let Err(error) = killpg(pgid, Signal::SIGTERM) {
        tracing::debug!(%error, pid, "SIGTERM to process group failed (already gone?)");
    }

    tokio::select! {
        _ = tokio::time::sleep(grace) => {
            tracing::warn!(pid, "process still alive after grace period, sending SIGKILL");
            if let Err(error) = killpg(pgid, Signal::SIGKILL) {
                tracing::debug!(%error, pid, "SIGKILL to process group failed (already gone?)");
            }
            let _ = child.wait().await;
        }
        _ = child.wait() => {}
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
