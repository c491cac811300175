#![cfg(test)]

// Property tests for HashedMultiKeyMap kept inside the crate so they can
// check table-level invariants (chain reachability, threshold) directly.

use crate::config::MapConfig;
use crate::error::MapError;
use crate::multi_key_map::HashedMultiKeyMap;
use core::hash::BuildHasher;
use hashbrown::HashMap;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::hash::Hasher;

type Key = (String, u8);

// Pool-indexed operations: indices shrink toward earlier components, and
// the two pools shrink independently.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, usize, i32),
    Remove(usize, usize),
    Get(usize, usize),
    Contains(usize, usize),
    Mutate(usize, usize, i32),
    // Remove every entry whose value is divisible by the divisor through a cursor.
    CursorRemove(i32),
    Retain(i32),
    Clear,
    Iterate,
}

fn key_from(names: &[String], tags: &[u8], i: usize, j: usize) -> Key {
    (names[i].clone(), tags[j])
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<u8>, Vec<Op>)> {
    (
        proptest::collection::vec("[a-z]{0,4}", 1..=6),
        proptest::collection::vec(any::<u8>(), 1..=4),
    )
        .prop_flat_map(|(names, tags)| {
            let i = 0..names.len();
            let j = 0..tags.len();
            let op = prop_oneof![
                4 => (i.clone(), j.clone(), any::<i32>()).prop_map(|(i, j, v)| Op::Put(i, j, v)),
                2 => (i.clone(), j.clone()).prop_map(|(i, j)| Op::Remove(i, j)),
                2 => (i.clone(), j.clone()).prop_map(|(i, j)| Op::Get(i, j)),
                1 => (i.clone(), j.clone()).prop_map(|(i, j)| Op::Contains(i, j)),
                1 => (i.clone(), j.clone(), any::<i32>()).prop_map(|(i, j, d)| Op::Mutate(i, j, d)),
                1 => (2..5i32).prop_map(Op::CursorRemove),
                1 => (2..5i32).prop_map(Op::Retain),
                1 => Just(Op::Clear),
                1 => Just(Op::Iterate),
            ];
            proptest::collection::vec(op, 1..80)
                .prop_map(move |ops| (names.clone(), tags.clone(), ops))
        })
}

fn run_scenario<S: BuildHasher>(
    mut sut: HashedMultiKeyMap<Key, i32, S>,
    names: &[String],
    tags: &[u8],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut generation = sut.modification_count();
    let lf = sut.load_factor();

    for op in ops {
        match op {
            Op::Put(i, j, v) => {
                let k = key_from(names, tags, i, j);
                let prev = sut.put(k.clone(), v);
                let model_prev = model.insert(k, v);
                prop_assert_eq!(prev, model_prev);
                if model_prev.is_none() {
                    generation += 1;
                }
            }
            Op::Remove(i, j) => {
                let k = key_from(names, tags, i, j);
                let removed = sut.remove_entry(&(&k.0, &k.1));
                let model_removed = model.remove(&k);
                prop_assert_eq!(removed.as_ref().map(|(_, v)| *v), model_removed);
                if let Some((kk, _)) = removed {
                    prop_assert!(kk == k);
                    generation += 1;
                }
            }
            Op::Get(i, j) => {
                let k = key_from(names, tags, i, j);
                prop_assert_eq!(sut.get(&(&k.0, &k.1)), model.get(&k));
            }
            Op::Contains(i, j) => {
                let k = key_from(names, tags, i, j);
                prop_assert_eq!(sut.contains_key(&(&k.0, &k.1)), model.contains_key(&k));
            }
            Op::Mutate(i, j, d) => {
                let k = key_from(names, tags, i, j);
                match (sut.get_mut(&(&k.0, &k.1)), model.get_mut(&k)) {
                    (Some(s), Some(m)) => {
                        *s = s.wrapping_add(d);
                        *m = m.wrapping_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "get_mut presence differs from model"),
                }
            }
            Op::CursorRemove(div) => {
                let before = model.len();
                let mut c = sut.cursor();
                let mut visited = 0;
                while c.next(&sut).map_err(|e| TestCaseError::fail(e.to_string()))? {
                    visited += 1;
                    if c.value(&sut).map_err(|e| TestCaseError::fail(e.to_string()))? % div == 0 {
                        let (k, v) = c
                            .remove_current(&mut sut)
                            .map_err(|e| TestCaseError::fail(e.to_string()))?;
                        prop_assert_eq!(model.remove(&k), Some(v));
                        prop_assert_eq!(c.value(&sut), Err(MapError::InvalidIteratorState));
                        generation += 1;
                    }
                }
                prop_assert_eq!(visited, before);
                prop_assert!(model.values().all(|v| v % div != 0));
            }
            Op::Retain(div) => {
                let before = model.len();
                sut.retain(|_, v| *v % div != 0);
                model.retain(|_, v| *v % div != 0);
                if model.len() != before {
                    generation += 1;
                }
            }
            Op::Clear => {
                let cap = sut.capacity();
                sut.clear();
                prop_assert_eq!(sut.capacity(), cap);
                if !model.is_empty() {
                    generation += 1;
                }
                model.clear();
            }
            Op::Iterate => {
                let s: BTreeSet<_> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m: BTreeSet<_> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s.len(), sut.len());
                prop_assert_eq!(s, m);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.modification_count(), generation);
        prop_assert!(sut.capacity().is_power_of_two());
        prop_assert!(sut.len() <= (sut.capacity() as f64 * lf) as usize);
    }
    Ok(())
}

// Property: state-machine equivalence against a HashMap model.
// Invariants exercised across random operation sequences:
// - put returns the replaced value; get/contains_key/get_mut parity.
// - remove_entry returns the owned key and value; absent keys are no-ops.
// - Cursor removal visits and removes exactly the matching entries.
// - The modification count advances exactly on structural changes.
// - Capacity stays a power of two and len never exceeds the threshold.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((names, tags, ops) in arb_scenario()) {
        let sut: HashedMultiKeyMap<Key, i32> =
            HashedMultiKeyMap::with_capacity(1).map_err(|e| TestCaseError::fail(e.to_string()))?;
        run_scenario(sut, &names, &tags, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: same invariants under worst-case collisions, with a small
// load factor so growth interleaves with chain edits.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((names, tags, ops) in arb_scenario()) {
        let config = MapConfig::new().with_initial_capacity(2).with_load_factor(0.5);
        let sut: HashedMultiKeyMap<Key, i32, ConstBuildHasher> =
            HashedMultiKeyMap::with_config_and_hasher(config, ConstBuildHasher)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
        run_scenario(sut, &names, &tags, ops)?;
    }
}
