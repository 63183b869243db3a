// SPDX-License-Identifier: MIT

//! Error taxonomy (§7 of the design).
//!
//! `dcrpm-supervisor` never raises for a child's exit status — only
//! [`ConfigError`] and the `Internal` variant of [`DcrpmError`] are meant
//! to escape all the way to `main()` as hard failures; everything else is
//! recorded in the run transcript and handled by the state machine.

use thiserror::Error;

/// Configuration-time failures (exit code 64, except `MissingBinary`'s 65).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required external binary not found: {0}")]
    MissingBinary(String),
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
}

impl ConfigError {
    /// Exit code mapping from `spec.md` §6: a missing `rpm`/`db_verify`/etc.
    /// binary is distinguished (65, `EX_NOINPUT`) from every other invalid
    /// configuration value (64, `EX_USAGE`).
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::MissingBinary(_) => 65,
            ConfigError::InvalidValue(_) => 64,
        }
    }
}

/// Top-level error a run can fail with outside the transcript.
#[derive(Debug, Error)]
pub enum DcrpmError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("overall run deadline exceeded")]
    Deadline,
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl DcrpmError {
    /// Exit code mapping from `spec.md` §6.
    pub fn exit_code(&self) -> i32 {
        match self {
            DcrpmError::Config(inner) => inner.exit_code(),
            DcrpmError::Deadline => 2,
            DcrpmError::Internal(_) => 2,
        }
    }
}
