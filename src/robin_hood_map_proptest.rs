#![cfg(test)]

// Property tests for RobinHoodMap kept inside the crate so they can call
// the internal probe-layout checks after every operation.

use crate::{KeyNotFound, RecordRef, RobinHoodMap};
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::rc::Rc;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    GetOrInsert(usize, i32),
    Remove(usize),
    Find(usize),
    GetAt(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::GetOrInsert(i, v)),
            4 => idx.clone().prop_map(OpI::Remove),
            4 => idx.clone().prop_map(OpI::Find),
            4 => idx.clone().prop_map(OpI::GetAt),
            4 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            4 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine driver shared by the hasher variants. The model is a std
// HashMap plus a front-first key list mirroring the expected iteration
// order, a map of live refs keyed by key, and the refs gone stale.
//
// Invariants exercised across random operation sequences:
// - Duplicate inserts leave value, order, and refs untouched.
// - `find`/`get`/`at`/`contains_key` parity with the model; `find` keeps
//   returning the ref minted when the key was inserted.
// - `get_or_insert_with` runs its closure exactly on misses.
// - Iteration yields exactly the model's pairs, newest insertion first.
// - Stale refs never resolve again, through removal and clear.
// - After each op: `len`/`is_empty` parity, capacity is zero or a
//   non-shrinking power of two, and the table layout obeys the Robin
//   Hood placement and load rules.
fn run_state_machine<S>(
    pool: &[String],
    ops: Vec<OpI>,
    sut: &mut RobinHoodMap<Key, i32, S>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut order: Vec<Key> = Vec::new();
    let mut live: HashMap<Key, RecordRef> = HashMap::new();
    let mut stale: Vec<RecordRef> = Vec::new();
    let mut prev_cap = sut.capacity();

    let default_calls = Rc::new(Cell::new(0));
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                sut.insert(k.clone(), v);
                if already {
                    prop_assert_eq!(sut.get(&k), model.get(&k), "duplicate must not overwrite");
                } else {
                    model.insert(k.clone(), v);
                    order.insert(0, k.clone());
                    let r = sut.find(&k).expect("inserted key must be findable");
                    let prev = live.insert(k, r);
                    prop_assert!(prev.is_none());
                }
            }
            OpI::GetOrInsert(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                let counter = default_calls.clone();
                let before = counter.get();
                let got = *sut.get_or_insert_with(k.clone(), move || {
                    counter.set(counter.get() + 1);
                    v
                });
                if already {
                    prop_assert_eq!(default_calls.get(), before, "closure must not run on a hit");
                    prop_assert_eq!(Some(&got), model.get(&k));
                } else {
                    prop_assert_eq!(default_calls.get(), before + 1, "closure runs once on a miss");
                    prop_assert_eq!(got, v);
                    model.insert(k.clone(), v);
                    order.insert(0, k.clone());
                    let r = sut.find(&k).expect("inserted key must be findable");
                    let prev = live.insert(k, r);
                    prop_assert!(prev.is_none());
                }
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                sut.remove(&k);
                prop_assert!(sut.find(&k).is_none());
                if model.remove(&k).is_some() {
                    order.retain(|x| x != &k);
                    let r = live.remove(&k).expect("tracked ref for live key");
                    stale.push(r);
                }
            }
            OpI::Find(i) => {
                let k = key_from(pool, i);
                let found = sut.find(&k);
                prop_assert_eq!(found.is_some(), model.contains_key(&k));
                if let Some(r) = found {
                    let &tracked = live.get(&k).expect("tracked live ref present");
                    prop_assert_eq!(r, tracked, "find must return the insert-time ref");
                    prop_assert_eq!(r.key(sut), Some(&k));
                    prop_assert_eq!(r.value(sut), model.get(&k));
                }
            }
            OpI::GetAt(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
                match model.get(&k) {
                    Some(v) => {
                        prop_assert_eq!(sut.at(&k), Ok(v));
                        prop_assert_eq!(sut.get_key_value(&k), Some((&k, v)));
                    }
                    None => {
                        prop_assert_eq!(sut.at(&k), Err(KeyNotFound));
                        prop_assert_eq!(sut.get_key_value(&k), None);
                    }
                }
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                match sut.get_mut(&k) {
                    Some(vr) => {
                        *vr = vr.saturating_add(d);
                        let mv = model.get_mut(&k).expect("present in model");
                        *mv = mv.saturating_add(d);
                    }
                    None => prop_assert!(!model.contains_key(&k)),
                }
            }
            OpI::Iterate => {
                let got: Vec<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let want: Vec<(Key, i32)> = order.iter().map(|k| (k.clone(), model[k])).collect();
                prop_assert_eq!(got, want, "iteration must follow recency order");
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                order.clear();
                stale.extend(live.drain().map(|(_, r)| r));
                prop_assert!(sut.is_empty());
            }
        }

        // Post-conditions after each op
        for &r in &stale {
            prop_assert!(r.value(sut).is_none(), "stale ref must never resolve");
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        let cap = sut.capacity();
        prop_assert!(cap == 0 || cap.is_power_of_two());
        prop_assert!(cap >= prev_cap, "capacity never shrinks");
        prev_cap = cap;
        sut.assert_probe_layout();
    }
    Ok(())
}

// Collision variant hasher: every key shares one ideal slot, so the
// whole scenario runs on a single displaced probe chain.
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

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: RobinHoodMap<Key, i32> = RobinHoodMap::new();
        run_state_machine(&pool, ops, &mut sut)?;
    }

    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: RobinHoodMap<Key, i32, ConstBuildHasher> =
            RobinHoodMap::with_hasher(ConstBuildHasher);
        run_state_machine(&pool, ops, &mut sut)?;
    }
}
