// RobinHoodMap property tests (consolidated).
//
// Property 1: public-API state machine against a std HashMap model plus
// an explicit recency list.
//  - Model: HashMap<String, i64> and Vec<String> with the newest key at
//    the front.
//  - Operations: insert, remove, get, get_or_insert_default + bump,
//    contains (sometimes with keys outside the pool), find with ref
//    accessors, full iteration.
//  - Invariants after each op: len/is_empty parity; capacity is zero or
//    a power of two and never shrinks; iteration equals the recency
//    list with the model's values.
//  - End: erase every remaining key; the map must drain to empty with
//    its capacity intact.
//
// Property 2: collecting pairs keeps the first value per duplicate key
// and orders records by first insertion, newest first.
use proptest::prelude::*;
use robinhood_hashmap::RobinHoodMap;
use std::collections::HashMap;

proptest! {
    #[test]
    fn prop_matches_model_with_order(
        keys in 1usize..=6,
        ops in proptest::collection::vec((0u8..=6u8, 0usize..100usize, -100i64..100i64), 1..120),
    ) {
        let mut m: RobinHoodMap<String, i64> = RobinHoodMap::new();
        let mut model: HashMap<String, i64> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut max_cap = 0usize;

        for (op, raw_k, x) in ops {
            let key = format!("k{}", raw_k % keys);
            match op {
                // Insert: the first value stored under a key wins.
                0 => {
                    m.insert(key.clone(), x);
                    if !model.contains_key(&key) {
                        model.insert(key.clone(), x);
                        order.insert(0, key.clone());
                    }
                }
                // Remove, present or not.
                1 => {
                    m.remove(key.as_str());
                    if model.remove(&key).is_some() {
                        order.retain(|q| q != &key);
                    }
                    prop_assert!(!m.contains_key(key.as_str()));
                }
                // Lookup parity.
                2 => {
                    prop_assert_eq!(m.get(key.as_str()), model.get(&key));
                }
                // Indexing semantics: default on miss, then bump in place.
                3 => {
                    let was_present = model.contains_key(&key);
                    let v = m.get_or_insert_default(key.clone());
                    *v = v.wrapping_add(x);
                    let mv = model.entry(key.clone()).or_insert(0);
                    *mv = mv.wrapping_add(x);
                    if !was_present {
                        order.insert(0, key.clone());
                    }
                }
                // Contains parity, sometimes probing outside the pool.
                4 => {
                    let probe = if x < 0 { format!("zz{raw_k}") } else { key.clone() };
                    prop_assert_eq!(m.contains_key(probe.as_str()), model.contains_key(&probe));
                }
                // Find plus ref accessors.
                5 => {
                    match m.find(key.as_str()) {
                        Some(r) => {
                            prop_assert_eq!(r.key(&m), Some(&key));
                            prop_assert_eq!(r.value(&m), model.get(&key));
                        }
                        None => prop_assert!(!model.contains_key(&key)),
                    }
                }
                // Full iteration equals the recency list.
                6 => {
                    let got: Vec<(String, i64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    let want: Vec<(String, i64)> =
                        order.iter().map(|k| (k.clone(), model[k])).collect();
                    prop_assert_eq!(got, want);
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(m.len(), model.len());
            prop_assert_eq!(m.is_empty(), model.is_empty());
            let cap = m.capacity();
            prop_assert!(cap == 0 || cap.is_power_of_two());
            prop_assert!(cap >= max_cap, "capacity must never shrink");
            max_cap = cap;
        }

        for key in model.keys() {
            m.remove(key.as_str());
        }
        prop_assert!(m.is_empty());
        prop_assert_eq!(m.iter().count(), 0);
        prop_assert_eq!(m.capacity(), max_cap, "draining keeps capacity");
    }

    #[test]
    fn prop_from_iter_first_wins(
        pairs in proptest::collection::vec(("[a-d]{1,2}", any::<i32>()), 0..40),
    ) {
        let m: RobinHoodMap<String, i32> = pairs.clone().into_iter().collect();

        let mut first: HashMap<String, i32> = HashMap::new();
        let mut newest_first: Vec<String> = Vec::new();
        for (k, v) in &pairs {
            if !first.contains_key(k) {
                first.insert(k.clone(), *v);
                newest_first.insert(0, k.clone());
            }
        }

        prop_assert_eq!(m.len(), first.len());
        let got: Vec<(String, i32)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        let want: Vec<(String, i32)> =
            newest_first.iter().map(|k| (k.clone(), first[k])).collect();
        prop_assert_eq!(got, want);
    }
}
