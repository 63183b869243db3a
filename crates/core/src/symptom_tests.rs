// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn only_healthy_is_healthy() {
    assert!(RpmSymptom::Healthy.is_healthy());
    assert!(!RpmSymptom::QueryHung.is_healthy());
    assert!(!RpmSymptom::DbNeedsRecover.is_healthy());
}

#[test]
fn tag_is_stable_across_detail_changes() {
    let a = RpmSymptom::TableCorrupt { table: "Packages".into(), detail: "btree error".into() };
    let b = RpmSymptom::TableCorrupt { table: "Packages".into(), detail: "different detail".into() };
    assert_eq!(a.tag(), b.tag());
    assert_eq!(a.tag(), "table_corrupt");
}

#[test]
fn tag_distinguishes_variants() {
    assert_ne!(RpmSymptom::QueryEmpty { expected: 30 }.tag(), RpmSymptom::QueryShort { expected: 30, got: 5 }.tag());
}

#[test]
fn display_mentions_key_details() {
    let symptom = RpmSymptom::QueryShort { expected: 30, got: 2 };
    let text = symptom.to_string();
    assert!(text.contains("30"));
    assert!(text.contains('2'));
}

#[test]
fn serde_round_trip_preserves_tag() {
    let symptom = RpmSymptom::StaleYumTransaction { count: 4 };
    let json = serde_json::to_string(&symptom).expect("serialize");
    assert!(json.contains("\"symptom\":\"stale_yum_transaction\""));
    let back: RpmSymptom = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, symptom);
}

#[test]
fn unknown_carries_raw_text_for_diagnosis() {
    let symptom = RpmSymptom::Unknown { raw: "weird stderr output".into() };
    assert_eq!(symptom.tag(), "unknown");
    assert!(symptom.to_string().contains("weird stderr output"));
}
