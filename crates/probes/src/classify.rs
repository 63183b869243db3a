// SPDX-License-Identifier: MIT

//! Stderr/exit-code classification (C3's pure core), kept as a table of
//! `(pattern) -> symptom` rules rather than scattered string matching, per
//! the documented redesign: new signatures from a new `rpm`/`db_*` build
//! get added here without touching the state machine.
//!
//! The exact signatures below are seeded from commonly observed
//! `rpm`/`db_*` diagnostics; a deployment on a distro whose messages
//! differ should extend this table from its own fixture captures rather
//! than relying on these matching.

use std::sync::LazyLock;

use dcrpm_core::RpmSymptom;
use regex::Regex;

type Classifier = fn(&str) -> RpmSymptom;

/// `rpm`'s "no Packages index" message.
#[allow(clippy::expect_used)]
static TABLE_MISSING_SIGNATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)cannot open.*packages.*index").expect("constant regex pattern is valid"));

/// db4's "run recovery before continuing" family of messages.
#[allow(clippy::expect_used)]
static RUNRECOVERY_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)error\s*\(3\)|DB_RUNRECOVERY|unsafe to continue").expect("constant regex pattern is valid")
});

/// db4's fatal-region-error / thread-died panics, which also demand recovery.
#[allow(clippy::expect_used)]
static PANIC_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)PANIC.*fatal region error|thread died in berkeley db").expect("constant regex pattern is valid")
});

/// `rpm`'s own open-failure / damaged-header diagnostics.
#[allow(clippy::expect_used)]
static OPEN_FAILURE_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)rpmdbopen: failed to open|rpmdb: damaged header").expect("constant regex pattern is valid")
});

fn query_signatures() -> &'static [(&'static LazyLock<Regex>, Classifier)] {
    static RULES: LazyLock<Vec<(&'static LazyLock<Regex>, Classifier)>> = LazyLock::new(|| {
        vec![
            (&TABLE_MISSING_SIGNATURE, (|_: &str| RpmSymptom::TableMissing { table: "Packages".into() }) as Classifier),
            (&RUNRECOVERY_SIGNATURE, (|_: &str| RpmSymptom::DbNeedsRecover) as Classifier),
            (&PANIC_SIGNATURE, (|_: &str| RpmSymptom::DbNeedsRecover) as Classifier),
            (&OPEN_FAILURE_SIGNATURE, (|_: &str| RpmSymptom::DbNeedsRecover) as Classifier),
        ]
    });
    &RULES
}

/// Classify `rpm -qa`'s stderr into a symptom, when a known signature
/// matches. Returns `None` when no rule fires, so the caller can fall
/// back to `Unknown { raw }`.
pub fn classify_query_stderr(stderr: &str) -> Option<RpmSymptom> {
    query_signatures().iter().find_map(|(pattern, build)| pattern.is_match(stderr).then(|| build(stderr)))
}

/// `db_verify <table>` only ever has two outcomes worth classifying: it
/// exits 0 (valid) or non-zero (corrupt), so there's no pattern table —
/// the exit code alone decides.
pub fn classify_verify_failure(table: &str, stderr: &str) -> RpmSymptom {
    RpmSymptom::TableCorrupt { table: table.to_string(), detail: stderr.trim().to_string() }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
