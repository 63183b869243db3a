// SPDX-License-Identifier: MIT

//! [`RpmSymptom`] — the classified outcome of a probe (C3's output shape).

use serde::{Deserialize, Serialize};

/// A classified database symptom, produced by `dcrpm-probes` and consumed
/// by the remediation state machine. Deliberately data-only: classifying
/// a probe's raw [`crate::CommandResult`] into one of these is a pure
/// function, independent of any I/O, which keeps it unit-testable against
/// recorded fixtures (§4.3 of the design).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "symptom", rename_all = "snake_case")]
pub enum RpmSymptom {
    Healthy,
    QueryHung,
    QueryEmpty { expected: usize },
    QueryShort { expected: usize, got: usize },
    TableCorrupt { table: String, detail: String },
    TableMissing { table: String },
    IndexInconsistent { package: String },
    StaleYumTransaction { count: usize },
    DbNeedsRecover,
    BlockedByLock,
    InspectorUnavailable,
    Unknown { raw: String },
}

impl RpmSymptom {
    pub fn is_healthy(&self) -> bool {
        matches!(self, RpmSymptom::Healthy)
    }

    /// Short, stable tag used for transcript diffing ("did the symptom set
    /// change between passes") without comparing full detail strings.
    pub fn tag(&self) -> &'static str {
        match self {
            RpmSymptom::Healthy => "healthy",
            RpmSymptom::QueryHung => "query_hung",
            RpmSymptom::QueryEmpty { .. } => "query_empty",
            RpmSymptom::QueryShort { .. } => "query_short",
            RpmSymptom::TableCorrupt { .. } => "table_corrupt",
            RpmSymptom::TableMissing { .. } => "table_missing",
            RpmSymptom::IndexInconsistent { .. } => "index_inconsistent",
            RpmSymptom::StaleYumTransaction { .. } => "stale_yum_transaction",
            RpmSymptom::DbNeedsRecover => "db_needs_recover",
            RpmSymptom::BlockedByLock => "blocked_by_lock",
            RpmSymptom::InspectorUnavailable => "inspector_unavailable",
            RpmSymptom::Unknown { .. } => "unknown",
        }
    }
}

impl std::fmt::Display for RpmSymptom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RpmSymptom::Healthy => write!(f, "healthy"),
            RpmSymptom::QueryHung => write!(f, "query hung"),
            RpmSymptom::QueryEmpty { expected } => {
                write!(f, "query returned no packages (expected >= {expected})")
            }
            RpmSymptom::QueryShort { expected, got } => {
                write!(f, "query returned {got} packages, expected >= {expected}")
            }
            RpmSymptom::TableCorrupt { table, detail } => {
                write!(f, "table {table} corrupt: {detail}")
            }
            RpmSymptom::TableMissing { table } => write!(f, "table {table} missing"),
            RpmSymptom::IndexInconsistent { package } => {
                write!(f, "index inconsistent: lookup failed for {package}")
            }
            RpmSymptom::StaleYumTransaction { count } => {
                write!(f, "{count} stale yum transaction(s)")
            }
            RpmSymptom::DbNeedsRecover => write!(f, "database needs recovery"),
            RpmSymptom::BlockedByLock => write!(f, "blocked by another package manager lock"),
            RpmSymptom::InspectorUnavailable => write!(f, "file-handle inspector unavailable"),
            RpmSymptom::Unknown { raw } => write!(f, "unknown symptom: {raw}"),
        }
    }
}

#[cfg(test)]
#[path = "symptom_tests.rs"]
mod tests;
