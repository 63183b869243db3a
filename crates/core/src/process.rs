// SPDX-License-Identifier: MIT

//! [`CommandResult`] — the one and only output shape for every external
//! invocation (C1's contract). Immutable once produced.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExitStatus {
    /// Normal exit with the given numeric code.
    Code(i32),
    /// Killed by a signal (the signal number).
    Signal(i32),
    /// The supervisor killed the child because its deadline expired.
    TimedOut,
    /// The child never started (missing binary, permission denied, ...).
    SpawnFailed,
}

impl ExitStatus {
    /// Whether this status should be treated as a clean, zero-exit success.
    pub fn is_success(&self) -> bool {
        matches!(self, ExitStatus::Code(0))
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitStatus::Code(c) => write!(f, "exit({c})"),
            ExitStatus::Signal(s) => write!(f, "signal({s})"),
            ExitStatus::TimedOut => write!(f, "timed_out"),
            ExitStatus::SpawnFailed => write!(f, "spawn_failed"),
        }
    }
}

/// Maximum bytes of stdout/stderr retained per stream before truncation.
pub const MAX_CAPTURED_BYTES: usize = 64 * 1024 * 1024;

pub const TRUNCATION_MARKER: &[u8] = b"\n...[truncated]...\n";

/// The immutable result of one external invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub argv: Vec<String>,
    pub started_at_epoch_ms: u64,
    pub elapsed: Duration,
    pub exit_status: ExitStatus,
    #[serde(with = "bytes_as_lossy_string")]
    pub stdout: Vec<u8>,
    #[serde(with = "bytes_as_lossy_string")]
    pub stderr: Vec<u8>,
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
    pub terminated_by_us: bool,
}

impl CommandResult {
    pub fn stdout_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    /// Non-blank stdout lines, used by probes that count NEVRA rows.
    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout_str()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub fn epoch_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

mod bytes_as_lossy_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&String::from_utf8_lossy(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        Ok(s.into_bytes())
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
