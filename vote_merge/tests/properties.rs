use proptest::prelude::*;
use std::collections::HashSet;

use vote_merge::codec::{parse, serialize};
use vote_merge::{aggregate, reconcile, Group, Record, RecordKey};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn arb_group() -> impl Strategy<Value = Group> {
    prop_oneof![Just(Group::Baseline), Just(Group::Treatment)]
}

// Few distinct values so that collisions actually happen.
fn arb_record() -> impl Strategy<Value = Record> {
    (
        arb_group(),
        prop::sample::select(vec!["mental-health", "politics", "a,b", "say \"hi\""]),
        prop::sample::select(vec![
            "2024-03-01T10:00:00.000Z",
            "2024-03-01T10:00:00.001Z",
            "2024-03-01T10:00:01.000Z",
        ]),
        "[ -~]{0,12}",
    )
        .prop_map(|(g, c, ts, origin)| Record::new(g, c, ts).with_origin(&origin))
}

fn arb_records(max: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(arb_record(), 0..max)
}

// Any printable text in every field, for the table format.
fn arb_free_record() -> impl Strategy<Value = Record> {
    (
        arb_group(),
        "[^\\p{Cc}]{0,12}",
        "[^\\p{Cc}]{0,24}",
        "[^\\p{Cc}]{0,12}",
    )
        .prop_map(|(g, c, ts, origin)| Record::new(g, &c, &ts).with_origin(&origin))
}

fn keys(rs: &[Record]) -> HashSet<RecordKey> {
    rs.iter().map(|r| r.key()).collect()
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn serialize_then_parse_is_lossless(records in prop::collection::vec(arb_free_record(), 0..20)) {
        let back = parse(&serialize(&records));
        prop_assert_eq!(back, records);
    }

    #[test]
    fn merge_with_itself_is_idempotent(records in arb_records(30)) {
        let s = reconcile(&[records]);
        let twice = reconcile(&[s.clone(), s.clone()]);
        prop_assert_eq!(twice.len(), s.len());
        prop_assert_eq!(keys(twice.records()), keys(s.records()));
    }

    #[test]
    fn result_is_unique_and_covers_every_input(a in arb_records(20), b in arb_records(20)) {
        let merged = reconcile(&[a.clone(), b.clone()]);
        let merged_keys = keys(merged.records());
        prop_assert_eq!(merged_keys.len(), merged.len());
        let mut all = a.clone();
        all.extend(b);
        prop_assert_eq!(merged_keys, keys(&all));
        // The survivor of each identity is its first occurrence.
        for r in merged.iter() {
            let first = all.iter().find(|x| x.key() == r.key());
            prop_assert_eq!(Some(r), first);
        }
    }

    #[test]
    fn reimporting_an_export_changes_nothing(records in arb_records(20)) {
        let s = reconcile(&[records]);
        let imported = parse(&serialize(s.records()));
        let again = reconcile(&[s.records().to_vec(), imported]);
        prop_assert_eq!(again, s);
    }

    #[test]
    fn tally_matches_counting_by_hand(records in arb_records(30)) {
        let s = reconcile(&[records]);
        let t = aggregate(&s);
        for g in Group::ALL {
            prop_assert_eq!(t.total(g) as usize, s.iter().filter(|r| r.group() == g).count());
            for (category, count) in t.group(g).iter() {
                let expected = s
                    .iter()
                    .filter(|r| r.group() == g && r.category() == category)
                    .count();
                prop_assert_eq!(*count as usize, expected);
            }
        }
        prop_assert!(t.max_count() >= 1);
    }
}

#[test]
fn origin_collision_keeps_the_first_source() {
    let a = vec![
        Record::new(Group::Baseline, "x", "t1").with_origin("browser A"),
        Record::new(Group::Treatment, "y", "t2"),
    ];
    let b = vec![
        Record::new(Group::Baseline, "x", "t1").with_origin("browser B"),
        Record::new(Group::Baseline, "z", "t3"),
        Record::new(Group::Treatment, "z", "t3"),
    ];
    let merged = reconcile(&[a.clone(), b.clone()]);
    assert_eq!(merged.len(), a.len() + b.len() - 1);
    let survivor = merged
        .iter()
        .find(|r| r.timestamp() == "t1")
        .unwrap();
    assert_eq!(survivor.origin(), Some("browser A"));
}

#[test]
fn unknown_group_rows_do_not_spoil_the_file() {
    let text = "\"variant\",\"choice\",\"timestamp\",\"userAgent\"\n\
                \"unknown\",\"politics\",\"t1\",\"\"\n\
                \"nudged\",\"politics\",\"t2\",\"\"";
    let rs = parse(text);
    assert_eq!(rs, vec![Record::new(Group::Treatment, "politics", "t2")]);
}

#[test]
fn nothing_in_nothing_out() {
    let none: [Vec<Record>; 0] = [];
    let t = aggregate(&reconcile(&none));
    assert!(t.group(Group::Baseline).is_empty());
    assert!(t.group(Group::Treatment).is_empty());
    assert_eq!(t.max_count(), 1);
}
