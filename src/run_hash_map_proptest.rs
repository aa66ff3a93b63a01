#![cfg(test)]

// Property tests for RunHashMap kept inside the crate so they can check the
// bucket-run structure directly via `assert_invariants`.

use crate::config::MapConfig;
use crate::cursor::Cursor;
use crate::error::MapError;
use crate::run_hash_map::RunHashMap;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};

const ELEMENT_SIZE: usize = 2;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize),
    Erase(usize),
    Remove(usize),
    Find(usize),
    Contains(String),
    Mutate(usize, u8),
    Iterate,
    Rehash(usize),
    Reserve(usize),
    SetLoadFactor(f32),
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-zA-Z]{0,4}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let load_factors = proptest::sample::select(vec![0.1f32, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 4.0]);
        let op = prop_oneof![
            6 => idx.clone().prop_map(OpI::Insert),
            2 => idx.clone().prop_map(OpI::Erase),
            1 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Find),
            1 => prop_oneof![contains_pool, "[a-zA-Z]{0,4}"].prop_map(OpI::Contains),
            2 => (idx.clone(), any::<u8>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => prop_oneof![
                (0usize..120).prop_map(OpI::Rehash),
                (0usize..120).prop_map(OpI::Reserve),
            ],
            1 => load_factors.prop_map(OpI::SetLoadFactor),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against std::collections::HashMap.
// Invariants exercised after every operation:
// - Runs are contiguous, heads start their runs, keys are unique
//   (`assert_invariants`).
// - `len`/`is_empty` parity with the model; `find`/`contains_key` parity.
// - Cursors of live entries keep resolving to the same key and payload
//   across inserts and rehashes; cursors of erased or cleared entries never
//   resolve and are rejected by `erase`.
// - `load_factor() <= max_load_factor()`; bucket count never shrinks.
fn run_scenario(mut sut: RunHashMap, pool: &[String], ops: Vec<OpI>) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, [u8; ELEMENT_SIZE]> = HashMap::new();
    let mut live: HashMap<String, Cursor> = HashMap::new();
    let mut stale: Vec<Cursor> = Vec::new();

    for op in ops {
        let buckets_before = sut.bucket_count();
        match op {
            OpI::Insert(i) => {
                let k = &pool[i];
                let already = model.contains_key(k);
                let r = sut.insert(k).expect("insert within limits");
                prop_assert_eq!(r.inserted, !already);
                if already {
                    prop_assert_eq!(Some(&r.cursor), live.get(k));
                    prop_assert_eq!(&*r.payload, &model[k][..]);
                } else {
                    prop_assert_eq!(&*r.payload, &[0u8; ELEMENT_SIZE][..]);
                    live.insert(k.clone(), r.cursor);
                    model.insert(k.clone(), [0; ELEMENT_SIZE]);
                }
            }
            OpI::Erase(i) => {
                let k = &pool[i];
                match live.remove(k) {
                    Some(c) => {
                        prop_assert_eq!(sut.erase(c), Ok(()));
                        model.remove(k);
                        stale.push(c);
                        prop_assert_eq!(sut.find(k), sut.end());
                    }
                    None => {
                        prop_assert_eq!(sut.erase(sut.find(k)), Err(MapError::InvalidArgument));
                    }
                }
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let had = model.remove(k).is_some();
                prop_assert_eq!(sut.remove(k), had);
                if let Some(c) = live.remove(k) {
                    stale.push(c);
                }
            }
            OpI::Find(i) => {
                let k = &pool[i];
                let c = sut.find(k);
                prop_assert_eq!(c != sut.end(), model.contains_key(k));
                if let Some(&lc) = live.get(k) {
                    prop_assert_eq!(c, lc);
                }
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(&c) = live.get(k) {
                    match c.payload_mut(&mut sut) {
                        Some(p) => {
                            p[0] = p[0].wrapping_add(d);
                            p[1] = d;
                            let m = model.get_mut(k).expect("tracked in model");
                            m[0] = m[0].wrapping_add(d);
                            m[1] = d;
                        }
                        None => prop_assert!(false, "live cursor should resolve"),
                    }
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<String> = sut.iter().map(|(k, _)| k.to_string()).collect();
                let m_keys: BTreeSet<String> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
                // Cursor walk and iterator agree on order.
                let mut c = sut.begin();
                for (k, p) in sut.iter() {
                    let pair = sut.at(c).expect("cursor before end resolves");
                    prop_assert_eq!(pair.key, k);
                    prop_assert_eq!(pair.payload, p);
                    c = sut.advance(c, 1).expect("advance within bounds");
                }
                prop_assert_eq!(c, sut.end());
            }
            OpI::Rehash(n) => {
                prop_assert_eq!(sut.rehash(n), Ok(()));
                prop_assert!(sut.bucket_count() >= n);
                if n <= buckets_before {
                    prop_assert_eq!(sut.bucket_count(), buckets_before);
                }
            }
            OpI::Reserve(n) => {
                prop_assert_eq!(sut.reserve(n), Ok(()));
            }
            OpI::SetLoadFactor(z) => {
                prop_assert_eq!(sut.set_max_load_factor(z), Ok(()));
                prop_assert_eq!(sut.max_load_factor(), z.max(0.25));
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                stale.extend(live.drain().map(|(_, c)| c));
                prop_assert_eq!(sut.bucket_count(), buckets_before);
            }
        }

        sut.assert_invariants();
        prop_assert!(sut.bucket_count() >= buckets_before);
        prop_assert!(sut.load_factor() <= sut.max_load_factor());
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        for &c in &stale {
            prop_assert!(sut.at(c).is_none());
            prop_assert_eq!(sut.erase(c), Err(MapError::InvalidArgument));
        }
        for (k, &c) in &live {
            let pair = sut.at(c).expect("live cursor resolves");
            prop_assert_eq!(pair.key, k.as_str());
            prop_assert_eq!(pair.payload, &model[k][..]);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut = RunHashMap::new(ELEMENT_SIZE).unwrap();
        run_scenario(sut, &pool, ops)?;
    }
}

// Same state machine with every entry packed into a handful of long runs:
// a generous load factor keeps growth from spreading keys out, which
// stresses run boundaries in find and erase.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_long_runs((pool, ops) in arb_scenario()) {
        let config = MapConfig::default().with_max_load_factor(64.0);
        let sut = RunHashMap::with_config(ELEMENT_SIZE, config).unwrap();
        let ops = ops
            .into_iter()
            .filter(|op| !matches!(op, OpI::SetLoadFactor(_) | OpI::Rehash(_) | OpI::Reserve(_)))
            .collect();
        run_scenario(sut, &pool, ops)?;
    }
}
