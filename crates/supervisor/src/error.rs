// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Supervisor-level failures that never reach [`dcrpm_core::CommandResult`]
/// because they mean we couldn't even try to run the command.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("empty argv")]
    EmptyArgv,
}
