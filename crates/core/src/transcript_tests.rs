// SPDX-License-Identifier: MIT

use super::*;
use crate::repair::{kill_holders_everywhere, RepairAction, RepairOutcome, RepairRecord};

#[test]
fn new_transcript_starts_ok_and_empty() {
    let t = RunTranscript::new(false);
    assert_eq!(t.status, RunStatus::Ok);
    assert!(t.passes.is_empty());
    assert!(t.all_actions().is_empty());
    assert_eq!(t.rebuild_count(), 0);
}

#[test]
fn exit_codes_match_spec_mapping() {
    assert_eq!(RunStatus::Ok.exit_code(), 0);
    assert_eq!(RunStatus::Remediated.exit_code(), 0);
    assert_eq!(RunStatus::Partial.exit_code(), 1);
    assert_eq!(RunStatus::Failed.exit_code(), 2);
    assert_eq!(RunStatus::ConfigError.exit_code(), 64);
}

#[test]
fn all_actions_flattens_across_passes() {
    let mut t = RunTranscript::new(false);
    let mut pass1 = PassRecord::new(0, RpmSymptom::QueryHung);
    pass1.repairs_applied.push(RepairRecord::new(kill_holders_everywhere(), 0, RepairOutcome::Succeeded));
    pass1.repairs_applied.push(RepairRecord::new(RepairAction::RecoverDb, 1, RepairOutcome::Succeeded));
    let mut pass2 = PassRecord::new(1, RpmSymptom::Healthy);
    pass2.repairs_applied.push(RepairRecord::new(RepairAction::Noop, 0, RepairOutcome::Succeeded));
    t.passes.push(pass1);
    t.passes.push(pass2);

    assert_eq!(t.all_actions().len(), 3);
}

#[test]
fn rebuild_count_only_counts_successful_or_simulated_rebuilds() {
    let mut t = RunTranscript::new(false);
    let mut pass = PassRecord::new(0, RpmSymptom::TableMissing { table: "Name".into() });
    pass.repairs_applied.push(RepairRecord::new(kill_holders_everywhere(), 0, RepairOutcome::Succeeded));
    pass.repairs_applied.push(RepairRecord::new(RepairAction::RebuildDb, 1, RepairOutcome::Succeeded));
    t.passes.push(pass);
    assert_eq!(t.rebuild_count(), 1);

    let mut blocked_pass = PassRecord::new(1, RpmSymptom::TableMissing { table: "Name".into() });
    blocked_pass.repairs_applied.push(RepairRecord::new(
        RepairAction::RebuildDb,
        0,
        RepairOutcome::Blocked { detail: "holders still present".into() },
    ));
    t.passes.push(blocked_pass);

    assert_eq!(t.rebuild_count(), 1);
}

#[test]
fn dry_run_rebuilds_still_count_via_simulated() {
    let mut t = RunTranscript::new(true);
    let mut pass = PassRecord::new(0, RpmSymptom::TableMissing { table: "Name".into() });
    pass.repairs_applied.push(RepairRecord::new(RepairAction::RebuildDb, 0, RepairOutcome::Simulated));
    t.passes.push(pass);
    assert_eq!(t.rebuild_count(), 1);
    assert!(t.dry_run);
}
