// SPDX-License-Identifier: MIT

//! [`RepairAction`] — the tagged set of remediations C4 can apply.

use serde::{Deserialize, Serialize};

use crate::symptom::RpmSymptom;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RepairAction {
    RecoverDb,
    RebuildDb,
    CleanYumTx,
    KillHolders { paths: Vec<String> },
    /// Reserved for the `--allow-package-cleanup` escape hatch (§9 open
    /// question); never selected automatically by the state machine.
    PackageCleanup,
    Noop,
}

crate::simple_display! {
    RepairAction {
        RecoverDb => "RECOVER_DB",
        RebuildDb => "REBUILD_DB",
        CleanYumTx => "CLEAN_YUM_TX",
        KillHolders { .. } => "KILL_HOLDERS",
        PackageCleanup => "PACKAGE_CLEANUP",
        Noop => "NOOP",
    }
}

/// Outcome of applying one [`RepairAction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairOutcome {
    Succeeded,
    Failed { detail: String },
    /// `--dry-run`: the action was logged but never actually run.
    Simulated,
    /// Skipped this pass because a precondition wasn't met (e.g. a lock).
    Blocked { detail: String },
}

impl RepairOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, RepairOutcome::Succeeded | RepairOutcome::Simulated)
    }
}

/// One repair attempt recorded in the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairRecord {
    pub action: RepairAction,
    pub attempt_index: usize,
    pub outcome: RepairOutcome,
    /// Symptom observed immediately after this repair's re-probe, if any
    /// was performed before the pass ended.
    pub became_healthy: Option<bool>,
}

impl RepairRecord {
    pub fn new(action: RepairAction, attempt_index: usize, outcome: RepairOutcome) -> Self {
        Self { action, attempt_index, outcome, became_healthy: None }
    }
}

/// The `dbPath/*` glob used by every `KillHolders` turn issued by the
/// state machine.
pub fn kill_holders_everywhere() -> RepairAction {
    RepairAction::KillHolders { paths: vec!["*".into()] }
}

/// Priority-ordered repair turn for a given symptom, per the table in
/// `spec.md` §4.4. Returned as owned data (not a `match` sprinkled through
/// the state machine) so the ordering invariants are testable in
/// isolation.
///
/// Each call returns the *first-line* turn for a freshly observed
/// symptom — one or two actions applied together within a single pass.
/// `RebuildDb` is always preceded by `KillHolders` here, independent of
/// which symptom triggered it, to satisfy the hard "never rebuild while
/// holders exist" invariant universally (see `DESIGN.md` for why this
/// overrides the literal per-symptom wording for `TABLE_CORRUPT` /
/// `TABLE_MISSING` and `INDEX_INCONSISTENT`). Escalating a persistent
/// `QUERY_EMPTY`/`QUERY_SHORT` from `RecoverDb` to the
/// `KillHolders`+`RebuildDb` turn after a failed re-probe is the state
/// machine's responsibility (`dcrpm-remediate`), not this function's —
/// it only ever returns the non-escalated first attempt.
pub fn select_repairs(symptom: &RpmSymptom) -> Vec<RepairAction> {
    use RepairAction::*;

    match symptom {
        RpmSymptom::QueryHung => vec![kill_holders_everywhere(), RecoverDb],
        RpmSymptom::DbNeedsRecover => vec![RecoverDb, kill_holders_everywhere()],
        RpmSymptom::TableCorrupt { .. } | RpmSymptom::TableMissing { .. } => {
            vec![kill_holders_everywhere(), RebuildDb]
        }
        RpmSymptom::IndexInconsistent { .. } => vec![kill_holders_everywhere(), RebuildDb],
        RpmSymptom::QueryEmpty { .. } | RpmSymptom::QueryShort { .. } => vec![RecoverDb],
        RpmSymptom::StaleYumTransaction { .. } => vec![CleanYumTx],
        RpmSymptom::Healthy
        | RpmSymptom::BlockedByLock
        | RpmSymptom::InspectorUnavailable
        | RpmSymptom::Unknown { .. } => vec![],
    }
}

/// The turn applied when a `QUERY_EMPTY`/`QUERY_SHORT` symptom persists
/// after an initial `RecoverDb` attempt already failed to fix it.
pub fn escalated_rebuild_turn() -> Vec<RepairAction> {
    vec![kill_holders_everywhere(), RepairAction::RebuildDb]
}

#[cfg(test)]
#[path = "repair_tests.rs"]
mod tests;
