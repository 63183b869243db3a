// SPDX-License-Identifier: MIT

//! [`RunTranscript`] — the append-only record C4 writes to and C5 reads
//! from. Written only by the remediation state machine.

use serde::{Deserialize, Serialize};

use crate::repair::RepairRecord;
use crate::symptom::RpmSymptom;

/// Final classification of a run, per `spec.md` §4.4/§4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// A full pass was healthy and no repair was ever applied.
    Ok,
    /// Corruption was found and fully repaired.
    Remediated,
    /// `maxPasses` exhausted but the symptom set changed across passes.
    Partial,
    /// `maxPasses` exhausted with no progress, or a repair failed fatally.
    Failed,
    /// Invalid configuration; the run never reached a probe.
    ConfigError,
}

impl RunStatus {
    /// Exit code mapping from `spec.md` §4.5.
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Ok | RunStatus::Remediated => 0,
            RunStatus::Partial => 1,
            RunStatus::Failed => 2,
            RunStatus::ConfigError => 64,
        }
    }
}

crate::simple_display! {
    RunStatus {
        Ok => "OK",
        Remediated => "REMEDIATED",
        Partial => "PARTIAL",
        Failed => "FAILED",
        ConfigError => "CONFIG_ERROR",
    }
}

/// One probe→repair iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassRecord {
    pub pass_index: usize,
    pub symptom_observed: RpmSymptom,
    pub repairs_applied: Vec<RepairRecord>,
    pub post_repair_symptom: Option<RpmSymptom>,
}

impl PassRecord {
    pub fn new(pass_index: usize, symptom_observed: RpmSymptom) -> Self {
        Self { pass_index, symptom_observed, repairs_applied: Vec::new(), post_repair_symptom: None }
    }
}

/// The ordered sequence of passes plus the final status, per `spec.md` §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTranscript {
    pub passes: Vec<PassRecord>,
    pub status: RunStatus,
    /// Set when the overall deadline was exceeded mid-run.
    pub deadline_exceeded: bool,
    /// Set when a repair was skipped because `--dry-run` was passed.
    pub dry_run: bool,
}

impl RunTranscript {
    pub fn new(dry_run: bool) -> Self {
        Self { passes: Vec::new(), status: RunStatus::Ok, deadline_exceeded: false, dry_run }
    }

    /// Every repair action ever applied, in run order, flattened across
    /// passes — what the status line's `actions=[...]` lists.
    pub fn all_actions(&self) -> Vec<&RepairRecord> {
        self.passes.iter().flat_map(|p| p.repairs_applied.iter()).collect()
    }

    /// Count of distinct `REBUILD_DB` actions applied (not merely
    /// attempted-and-blocked), used to enforce the "at most one per run"
    /// invariant.
    pub fn rebuild_count(&self) -> usize {
        use crate::repair::{RepairAction, RepairOutcome};
        self.all_actions()
            .into_iter()
            .filter(|r| matches!(r.action, RepairAction::RebuildDb))
            .filter(|r| matches!(r.outcome, RepairOutcome::Succeeded | RepairOutcome::Simulated))
            .count()
    }
}

#[cfg(test)]
#[path = "transcript_tests.rs"]
mod tests;
