//! Properties of the shuffle-sequence table, checked against the
//! independent oracles in `sortgen::verify`.

use std::sync::OnceLock;

use proptest::prelude::*;
use sortgen::verify::{count_members, membership_difference, reachable_closure, shortest_length};
use sortgen::{LaneKey, LaneVector, SequenceTable, KEY_SPACE};

fn table() -> &'static SequenceTable {
    static TABLE: OnceLock<SequenceTable> = OnceLock::new();
    TABLE.get_or_init(SequenceTable::build)
}

fn table_membership() -> Vec<bool> {
    LaneKey::all()
        .map(|k| table().is_reachable(k.decode()))
        .collect()
}

// =============================================================================
// Completeness and minimality
// =============================================================================

#[test]
fn test_table_matches_closure() {
    let closure = reachable_closure();
    let sealed = table_membership();
    assert_eq!(count_members(&closure), KEY_SPACE);
    assert!(
        membership_difference(&closure, &sealed).is_empty(),
        "table and closure disagree"
    );
}

#[test]
fn test_no_entry_has_a_shorter_sequence() {
    for (key, seq) in table().iter() {
        let target = key.decode();
        assert_eq!(
            shortest_length(target, seq.len() - 1),
            None,
            "{target} has a sequence shorter than {}",
            seq.len()
        );
    }
}

#[test]
fn test_two_builds_are_identical() {
    let again = SequenceTable::build();
    assert_eq!(&again, table());
    assert_eq!(again.snapshot(), table().snapshot());
}

// =============================================================================
// Per-key properties
// =============================================================================

fn lane_vector() -> impl Strategy<Value = LaneVector> {
    prop::array::uniform4(0u8..8).prop_map(|lanes| LaneVector::new(lanes).unwrap())
}

proptest! {
    /// encode/decode agree for every in-range vector.
    #[test]
    fn prop_key_decodes_to_vector(v in lane_vector()) {
        prop_assert_eq!(v.key().decode(), v);
        prop_assert!(v.key().index() < KEY_SPACE);
    }

    /// Every non-seed vector has a sequence that replays to it.
    #[test]
    fn prop_lookup_replays(v in lane_vector()) {
        prop_assume!(v.seed_slot().is_none());
        let seq = table().lookup(v).unwrap();
        prop_assert_eq!(seq.evaluate(LaneVector::SEEDS).unwrap(), v);
    }

    /// Running a sequence on real values gathers them by provenance.
    #[test]
    fn prop_sequence_gathers_values(
        v in lane_vector(),
        values in prop::array::uniform8(any::<i32>()),
    ) {
        prop_assume!(v.seed_slot().is_none());
        let seq = table().lookup(v).unwrap();
        let low = [values[0], values[1], values[2], values[3]];
        let high = [values[4], values[5], values[6], values[7]];
        let frame = seq.run([low, high]).unwrap();
        let result = frame.last().copied().unwrap();
        let expected = v.lanes().map(|lane| values[usize::from(lane)]);
        prop_assert_eq!(result, expected);
    }

    /// Lookups never change the table.
    #[test]
    fn prop_lookup_is_idempotent(v in lane_vector()) {
        let first = table().gather(v).unwrap();
        let second = table().gather(v).unwrap();
        prop_assert_eq!(first, second);
    }
}
