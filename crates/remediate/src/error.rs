// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Failures that prevent the remediation state machine from starting at
/// all. Failures encountered mid-run are recorded in the transcript
/// instead of surfaced as an error.
#[derive(Debug, Error)]
pub enum RemediateError {
    #[error("invalid configuration: {0}")]
    Config(#[from] dcrpm_core::ConfigError),
}
