// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dcrpm-supervisor: process supervision (C1).
//!
//! Owns the one place every external command (`rpm`, `db_verify`,
//! `db_recover`, `yum`, `lsof`) actually gets spawned: a new process
//! group, bounded concurrent stdout/stderr capture, and a
//! SIGTERM-then-SIGKILL deadline escalation. Every other crate talks to
//! this through the [`Runner`] trait, never `tokio::process` directly.

pub mod capture;
pub mod error;
pub mod supervisor;

pub use error::SupervisorError;
pub use supervisor::{ProcessSupervisor, RunSpec, Runner};
