// SPDX-License-Identifier: MIT

//! Custom error type that carries a process exit code.
//!
//! `main()` prints `ExitError::message` to stderr and exits with
//! `ExitError::code` instead of calling `std::process::exit()` from deep
//! inside argument validation.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl From<dcrpm_core::ConfigError> for ExitError {
    /// A missing binary (65) is distinguished from every other invalid
    /// configuration value (64); see `ConfigError::exit_code`.
    fn from(error: dcrpm_core::ConfigError) -> Self {
        Self::new(error.exit_code(), error.to_string())
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
