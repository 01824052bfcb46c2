use super::*;

use crate::node::NodeId;
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

/// Walks the whole arena: every node at `max_depth` must be terminal, and the
/// number of reachable terminals must match `len()`.
fn validate_index(t: &Index) {
    let width = t.segment_width();
    let depth = width.max_depth();

    let mut stack: Vec<(NodeId, usize)> = vec![(NodeId::ROOT, 0)];
    let mut reachable = 0usize;
    let mut leaves = 0usize;
    while let Some((node, level)) = stack.pop() {
        reachable += 1;
        if level == depth {
            assert!(t.nodes.is_terminal(node), "leaf-level node must be terminal");
            leaves += 1;
            continue;
        }
        assert!(
            !t.nodes.is_terminal(node),
            "interior node marked terminal at level {level}"
        );
        for slot in 0..width.fanout() {
            let child = t.nodes.child(node, slot);
            if !child.is_null() {
                stack.push((child, level + 1));
            }
        }
    }

    assert_eq!(leaves, t.len(), "reachable leaf count must match Index::len");
    assert_eq!(reachable, t.node_count(), "every node must be reachable");
}

/// Keys drawn from a narrow space so operations collide.
#[derive(Clone, Copy, Debug, Arbitrary)]
struct Key(#[proptest(strategy = "key_strategy()")] u64);

fn key_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        0u64..64,
        (0u64..16, 0u32..60).prop_map(|(k, shift)| k << shift),
        any::<u64>(),
    ]
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(Key, i8),
    #[proptest(weight = 2)]
    Update(Key, i8),
    #[proptest(weight = 2)]
    Read(Key),
    #[proptest(weight = 1)]
    Scan(Key, #[proptest(strategy = "-2i64..40")] i64),
}

fn check_equivalence(bits: u32, ops: Vec<Op>) -> std::result::Result<(), TestCaseError> {
    let mut t = Index::with_segment_width(bits).unwrap();
    let mut m: BTreeMap<u64, i8> = BTreeMap::new();

    for op in ops {
        match op {
            Op::Insert(Key(key), value) => {
                prop_assert_eq!(t.insert(key, value), Ok(m.insert(key, value)));
            }
            Op::Update(Key(key), value) => match m.get_mut(&key) {
                Some(v) => {
                    prop_assert_eq!(t.update(key, value), Ok(*v));
                    *v = value;
                }
                None => {
                    prop_assert_eq!(t.update(key, value), Err(IndexError::KeyNotFound(key)));
                }
            },
            Op::Read(Key(key)) => {
                let expected = m.get(&key).copied().ok_or(IndexError::KeyNotFound(key));
                prop_assert_eq!(t.read(key), expected);
            }
            Op::Scan(Key(key), count) => {
                let entries = t.scan(key, count);
                prop_assert!(entries.len() as i64 <= count.max(0));
                for (k, v) in entries {
                    prop_assert_eq!(m.get(&k), Some(&v));
                }
            }
        }

        prop_assert_eq!(t.len(), m.len());
    }

    validate_index(&t);

    // From key 0 every level starts at slot 0, so an unbounded scan sees
    // every key exactly once.
    let mut all = t.scan(0, i64::MAX);
    all.sort_unstable();
    let expected: Vec<(u64, i8)> = m.into_iter().collect();
    prop_assert_eq!(all, expected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_nibble(ops in prop::collection::vec(any::<Op>(), 0..=500)) {
        check_equivalence(4, ops)?;
    }

    #[test]
    fn prop_equivalence_byte(ops in prop::collection::vec(any::<Op>(), 0..=500)) {
        check_equivalence(8, ops)?;
    }

    #[test]
    fn prop_equivalence_two_bit(ops in prop::collection::vec(any::<Op>(), 0..=200)) {
        check_equivalence(2, ops)?;
    }

    #[test]
    fn prop_scan_matches_reference_walk(
        keys in prop::collection::btree_set(key_strategy(), 0..200),
        start in key_strategy(),
        count in 0i64..64,
    ) {
        let mut t = Index::new();
        for &k in &keys {
            t.insert(k, 1).unwrap();
        }

        // Reference: a key is visited iff each of its segments is at or above
        // the start key's segment on that level, and visit order compares
        // segments from the least significant up.
        let width = t.segment_width();
        let mut expected: Vec<u64> = keys
            .iter()
            .copied()
            .filter(|&k| {
                (0..width.max_depth())
                    .all(|l| width.segment_of(k, l) >= width.segment_of(start, l))
            })
            .collect();
        expected.sort_by_key(|&k| {
            (0..width.max_depth())
                .map(|l| width.segment_of(k, l))
                .collect::<Vec<_>>()
        });
        expected.truncate(count as usize);

        let got: Vec<u64> = t.scan(start, count).into_iter().map(|(k, _)| k).collect();
        prop_assert_eq!(got, expected);
    }
}

#[test]
fn exhaustive_small_key_space() {
    // Every subset of a 4-bit key space at width 1 (depth 64).
    let mut t = Index::with_segment_width(1).unwrap();
    for mask in 0u32..(1 << 4) {
        let mut local = Index::with_segment_width(1).unwrap();
        for k in 0..4u64 {
            if mask & (1 << k) != 0 {
                local.insert(k, k as i8).unwrap();
                t.insert(k, k as i8).unwrap();
            }
        }
        validate_index(&local);
        for k in 0..4u64 {
            let present = mask & (1 << k) != 0;
            assert_eq!(local.contains_key(k), present);
        }
    }
    validate_index(&t);
    assert_eq!(t.len(), 4);
}
