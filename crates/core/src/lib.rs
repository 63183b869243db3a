// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dcrpm-core: shared data model for the RPM/db4 database repair tool.
//!
//! This crate owns the types that flow between every other component:
//! the immutable run [`Config`], the [`CommandResult`] every external
//! invocation produces, the classified [`RpmSymptom`] and [`RepairAction`]
//! tagged enums, and the append-only [`RunTranscript`] that the
//! remediation state machine writes to.

pub mod macros;

pub mod config;
pub mod error;
pub mod process;
pub mod repair;
pub mod symptom;
pub mod transcript;

pub use config::{Config, ConfigBuilder, FeatureSwitches, KillSignal, Timeouts, Verbosity};
pub use error::{ConfigError, DcrpmError};
pub use process::{epoch_ms_now, CommandResult, ExitStatus, MAX_CAPTURED_BYTES, TRUNCATION_MARKER};
pub use repair::{RepairAction, RepairOutcome, RepairRecord};
pub use symptom::RpmSymptom;
pub use transcript::{PassRecord, RunStatus, RunTranscript};
