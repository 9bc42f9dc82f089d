// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use proptest::prelude::*;

/// A record `[start, end)` cached under the object id `obj-{index}`.
#[derive(Clone, Debug)]
struct Interval {
    start: i64,
    end: i64,
}

impl Interval {
    fn mid(&self) -> i64 {
        self.start + (self.end - self.start) / 2
    }

    fn last(&self) -> i64 {
        self.start.max(self.end - 1)
    }
}

fn object(index: usize) -> String {
    format!("obj-{index}")
}

fn domain_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![Just(1024_i64), Just(1 << 20), Just(MAX_VALUE)]
}

/// Intervals biased towards short spans, the domain edges, and instants.
fn interval_strategy(max_value: i64) -> impl Strategy<Value = Interval> {
    let start = prop_oneof![
        6 => 0..max_value,
        1 => Just(0_i64),
        1 => Just(max_value - 1),
        1 => Just(max_value / 2),
    ];
    let span = prop_oneof![
        5 => 1..1_000_i64,
        2 => 1..=max_value,
        1 => Just(0_i64),
    ];
    (start, span).prop_map(move |(start, span)| Interval {
        start,
        end: (start + span).min(max_value),
    })
}

fn scenario_strategy() -> impl Strategy<Value = (usize, i64, Vec<Interval>)> {
    (1..=8_usize, domain_strategy()).prop_flat_map(|(block_size, max_value)| {
        (
            Just(block_size),
            Just(max_value),
            prop::collection::vec(interval_strategy(max_value), 1..=120),
        )
    })
}

fn build(block_size: usize, max_value: i64, intervals: &[Interval]) -> TdTree<usize> {
    let config = TdTreeConfig::default()
        .with_block_size(block_size)
        .with_max_value(max_value);
    let mut tree = TdTree::with_config(config).unwrap();
    for (index, interval) in intervals.iter().enumerate() {
        tree.insert_value(&object(index), interval.start, interval.end, index)
            .unwrap();
    }
    tree
}

/// Position in `records` of the smallest key of `object` valid at `at`.
fn smallest_valid(records: &[(RecordKey, usize)], object: i64, at: i64) -> Option<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, (key, _))| key.is_valid_at(object, at))
        .min_by_key(|(_, (key, _))| *key)
        .map(|(position, _)| position)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_values_resolve_over_their_interval(
        (block_size, max_value, intervals) in scenario_strategy(),
    ) {
        let tree = build(block_size, max_value, &intervals);
        prop_assert_eq!(tree.index_size(), intervals.len() as i64);
        for (index, interval) in intervals.iter().enumerate() {
            let id = object(index);
            for at in [interval.start, interval.mid(), interval.last()] {
                prop_assert_eq!(tree.get_value(&id, at), Some(&index), "{} at {}", id, at);
            }
            if interval.start < interval.end {
                prop_assert_eq!(tree.get_value(&id, interval.end), None);
            }
        }
    }

    #[test]
    fn prop_duplicate_inserts_are_ignored(
        (block_size, max_value, intervals) in scenario_strategy(),
    ) {
        let mut tree = build(block_size, max_value, &intervals);
        let leaves = tree.leaf_count();
        for (index, interval) in intervals.iter().enumerate() {
            tree.insert_value(&object(index), interval.start, interval.end, usize::MAX)
                .unwrap();
        }
        prop_assert_eq!(tree.index_size(), intervals.len() as i64);
        prop_assert_eq!(tree.leaf_count(), leaves);
        for (index, interval) in intervals.iter().enumerate() {
            prop_assert_eq!(tree.get_value(&object(index), interval.start), Some(&index));
        }
    }

    #[test]
    fn prop_delete_removes_exactly_one(
        (block_size, max_value, intervals) in scenario_strategy(),
    ) {
        let mut tree = build(block_size, max_value, &intervals);
        for (index, interval) in intervals.iter().enumerate().step_by(2) {
            let before = tree.index_size();
            prop_assert!(tree.delete_value(&object(index), interval.start));
            prop_assert_eq!(tree.index_size(), before - 1);
            prop_assert_eq!(tree.get_value(&object(index), interval.start), None);
            prop_assert!(!tree.delete_value(&object(index), interval.start));
        }
        for (index, interval) in intervals.iter().enumerate().skip(1).step_by(2) {
            prop_assert_eq!(tree.get_value(&object(index), interval.mid()), Some(&index));
        }
    }

    #[test]
    fn prop_bulk_delete_by_value(
        (block_size, max_value, intervals) in scenario_strategy(),
    ) {
        let config = TdTreeConfig::default()
            .with_block_size(block_size)
            .with_max_value(max_value);
        let mut tree: TdTree<usize> = TdTree::with_config(config).unwrap();
        for (index, interval) in intervals.iter().enumerate() {
            tree.insert_value(&object(index), interval.start, interval.end, index % 3)
                .unwrap();
        }
        let doomed = intervals.iter().step_by(3).count();
        prop_assert_eq!(tree.delete_keys_with_value(&0), doomed);
        prop_assert_eq!(tree.index_size(), (intervals.len() - doomed) as i64);
        for (index, interval) in intervals.iter().enumerate() {
            let expected = (index % 3 != 0).then_some(index % 3);
            prop_assert_eq!(tree.get_value(&object(index), interval.start), expected.as_ref());
        }
    }

    #[test]
    fn prop_rebuild_preserves_lookups(
        (block_size, max_value, intervals) in scenario_strategy(),
    ) {
        let mut tree = build(block_size, max_value, &intervals);
        for (index, interval) in intervals.iter().enumerate().step_by(3) {
            prop_assert!(tree.delete_value(&object(index), interval.start));
        }
        let before: Vec<_> = intervals
            .iter()
            .enumerate()
            .map(|(index, interval)| tree.get_value(&object(index), interval.mid()).copied())
            .collect();

        tree.rebuild_index();
        prop_assert_eq!(tree.calculate_fragmentation(), 0.0);
        let after: Vec<_> = intervals
            .iter()
            .enumerate()
            .map(|(index, interval)| tree.get_value(&object(index), interval.mid()).copied())
            .collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_overlapping_records_match_a_model(
        (block_size, max_value, intervals) in scenario_strategy(),
        objects in 1..=4_usize,
    ) {
        let config = TdTreeConfig::default()
            .with_block_size(block_size)
            .with_max_value(max_value);
        let mut tree: TdTree<usize> = TdTree::with_config(config).unwrap();
        let mut model: Vec<(RecordKey, usize)> = Vec::new();
        for (index, interval) in intervals.iter().enumerate() {
            let key = RecordKey::new(
                object_id_hash(&object(index % objects)),
                interval.start,
                interval.end,
            );
            if tree.insert_record(key, index).unwrap() {
                model.push((key, index));
            }
        }
        for (index, interval) in intervals.iter().enumerate().step_by(4) {
            let id = object(index % objects);
            let expected = smallest_valid(&model, object_id_hash(&id), interval.mid());
            prop_assert_eq!(tree.delete_value(&id, interval.mid()), expected.is_some());
            if let Some(position) = expected {
                model.remove(position);
            }
        }
        prop_assert_eq!(tree.index_size(), model.len() as i64);

        let lookups = |tree: &TdTree<usize>| -> Vec<Option<usize>> {
            intervals
                .iter()
                .enumerate()
                .map(|(index, interval)| {
                    tree.get_value(&object(index % objects), interval.mid()).copied()
                })
                .collect()
        };
        let expected: Vec<_> = intervals
            .iter()
            .enumerate()
            .map(|(index, interval)| {
                let hash = object_id_hash(&object(index % objects));
                smallest_valid(&model, hash, interval.mid()).map(|position| model[position].1)
            })
            .collect();
        prop_assert_eq!(lookups(&tree), expected.clone());
        tree.rebuild_index();
        prop_assert_eq!(lookups(&tree), expected);
    }

    #[test]
    fn prop_out_of_bounds_inserts_change_nothing(
        (block_size, max_value, intervals) in scenario_strategy(),
        below in 1..1_000_i64,
        above in 1..1_000_i64,
    ) {
        let mut tree = build(block_size, max_value, &intervals);
        let (size, leaves) = (tree.index_size(), tree.leaf_count());
        prop_assert_eq!(
            tree.insert_value("late", 0, max_value + above, 0),
            Err(TdTreeError::EndOutOfRange { end: max_value + above, max_value })
        );
        prop_assert_eq!(
            tree.insert_value("early", -below, 10, 0),
            Err(TdTreeError::NegativeStart { start: -below })
        );
        prop_assert_eq!(tree.index_size(), size);
        prop_assert_eq!(tree.leaf_count(), leaves);
        prop_assert_eq!(tree.get_value("late", 0), None);
    }
}

#[test]
fn fifth_record_splits_a_block_of_four() {
    let config = TdTreeConfig::default().with_block_size(4);
    let mut tree: TdTree<&str> = TdTree::with_config(config).unwrap();
    let records = [
        ("alpha", 10, 20, "a"),
        ("beta", 1_000, 5_000, "b"),
        ("gamma", 1_700_000_000_000, 1_800_000_000_000, "c"),
        ("delta", 40, 40, "d"),
        ("epsilon", 90_000_000_000_000, MAX_VALUE, "e"),
    ];
    for (id, start, end, value) in &records[..4] {
        tree.insert_value(id, *start, *end, *value).unwrap();
    }
    assert_eq!(tree.leaf_count(), 1, "four records fit one block");

    let (id, start, end, value) = records[4];
    tree.insert_value(id, start, end, value).unwrap();
    assert!(tree.leaf_count() >= 2, "the fifth record divides the root");
    assert_eq!(tree.max_depth(), 1);
    assert_eq!(tree.index_size(), 5);
    let stored: usize = tree
        .leaf_statistics()
        .iter()
        .map(|leaf| leaf.record_count)
        .sum();
    assert_eq!(stored, 5);
    for (id, start, end, value) in records {
        let mid = start + (end - start) / 2;
        assert_eq!(tree.get_value(id, mid), Some(&value), "{id} at {mid}");
    }
}
