// RunHashMap unit test suite (public surface).
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Uniqueness: inserting a present key changes nothing and returns the
//   existing payload.
// - Determinism: bucket assignment follows the djb2 digest and the prime
//   capacity tiers.
// - Growth: the load factor never exceeds its maximum after a mutation;
//   bucket count never shrinks.
// - Cursor stability: rehash keeps cursors and payloads valid; erase and
//   clear invalidate exactly the destroyed entries.
// - Failure atomicity: Overflow leaves size, buckets, and entries as they
//   were.
use run_hashmap::{hash_of, MapConfig, MapError, RunHashMap};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-6
}

// Test: the precious-metals scenario.
// Assumes: fresh map with 5 buckets and max load factor 1.0.
// Verifies: deterministic buckets, load factor, and growth to 11 buckets when
// the maximum load factor is halved.
#[test]
fn metals_scenario_buckets_and_growth() {
    init_tracing();
    let mut m = RunHashMap::new(std::mem::size_of::<i32>()).unwrap();
    for k in ["Au", "Ag", "Cu", "Pt"] {
        assert!(m.insert(k).unwrap().inserted);
    }

    assert_eq!(m.bucket("Au"), 1);
    assert_eq!(m.bucket("Ag"), 2);
    assert_eq!(m.bucket("Cu"), 2);
    assert_eq!(m.bucket("Pt"), 0);
    assert_eq!(m.len(), 4);
    assert_eq!(m.bucket_count(), 5);
    assert!(approx_eq(m.load_factor(), 0.8));

    let halved = m.max_load_factor() / 2.0;
    m.set_max_load_factor(halved).unwrap();
    assert!(approx_eq(m.max_load_factor(), 0.5));

    assert_eq!(m.bucket("Au"), 7);
    assert_eq!(m.bucket("Ag"), 4);
    assert_eq!(m.bucket("Cu"), 7);
    assert_eq!(m.bucket("Pt"), 6);
    assert_eq!(m.len(), 4);
    assert_eq!(m.bucket_count(), 11);
    assert!(approx_eq(m.load_factor(), 0.363636));
    assert!(m.load_factor() <= m.max_load_factor());
    for k in ["Au", "Ag", "Cu", "Pt"] {
        assert_ne!(m.find(k), m.end());
    }
    assert_eq!(m.bucket_size(7), 2);
}

// Test: bucket_size of a lone entry and of out-of-range buckets.
#[test]
fn bucket_size_counts_run() {
    let mut m = RunHashMap::new(4).unwrap();
    for n in [0, 1, 5, 6, usize::MAX] {
        assert_eq!(m.bucket_size(n), 0);
    }
    m.insert("Au").unwrap();
    m.insert("Ag").unwrap();
    assert_eq!(m.bucket_size(m.bucket("Au")), 1);
    assert_eq!(m.bucket_size(m.bucket("Ag")), 1);
}

// Test: distinct inserts are all findable with their own payloads.
// Verifies: size equals the number of distinct keys; payload writes are
// isolated per entry.
#[test]
fn distinct_inserts_are_findable() {
    let mut m = RunHashMap::new(8).unwrap();
    for i in 0u64..1_000 {
        let r = m.insert(&format!("word{i}")).unwrap();
        assert!(r.inserted);
        r.payload.copy_from_slice(&i.to_le_bytes());
    }
    assert_eq!(m.len(), 1_000);
    for i in 0u64..1_000 {
        let c = m.find(&format!("word{i}"));
        let p = c.payload(&m).expect("present");
        assert_eq!(u64::from_le_bytes(p.try_into().unwrap()), i);
    }
    assert!(m.load_factor() <= m.max_load_factor());
}

// Test: duplicate insert is idempotent.
// Verifies: inserted=false, same payload address, unchanged size.
#[test]
fn duplicate_insert_is_noop() {
    let mut m = RunHashMap::new(4).unwrap();
    let first = m.insert("e").unwrap().payload.as_ptr();
    let again = m.insert("e").unwrap();
    assert!(!again.inserted);
    assert_eq!(again.payload.as_ptr(), first);
    assert_eq!(m.len(), 1);
}

// Test: find misses.
// Verifies: absent keys and same-bucket absent keys yield end().
#[test]
fn find_misses_return_end() {
    let mut m = RunHashMap::new(4).unwrap();
    assert_eq!(m.find("e"), m.end());
    m.insert("e").unwrap();
    assert_ne!(m.find("e"), m.end());
    // "j" shares "e"'s bucket but is not present.
    assert_eq!(m.find("j"), m.end());
}

// Test: keys with identical djb2 digests.
// Assumes: "Ab" and "BA" collide ('A' * 33 + 'b' == 'B' * 33 + 'A').
// Verifies: a colliding absent key is not found; both keys coexist with
// their own payloads; erasing one leaves the other findable.
#[test]
fn digest_collision_keeps_keys_distinct() {
    assert_eq!(hash_of("Ab"), hash_of("BA"));
    let mut m = RunHashMap::new(1).unwrap();
    m.insert("Ab").unwrap().payload[0] = 7;
    assert_eq!(m.find("BA"), m.end());

    let r = m.insert("BA").unwrap();
    assert!(r.inserted);
    r.payload[0] = 9;
    assert_eq!(m.bucket("Ab"), m.bucket("BA"));
    assert_eq!(m.bucket_size(m.bucket("Ab")), 2);
    assert_eq!(m.find("Ab").payload(&m), Some(&[7u8][..]));
    assert_eq!(m.find("BA").payload(&m), Some(&[9u8][..]));

    assert!(m.remove("BA"));
    assert_eq!(m.find("BA"), m.end());
    assert_eq!(m.get("Ab"), Some(&[7u8][..]));
}

// Test: erase semantics.
// Verifies: end/empty-map cursors are rejected; erased keys are no longer
// found; erasing twice is rejected.
#[test]
fn erase_behaviour() {
    let mut m = RunHashMap::new(4).unwrap();
    assert_eq!(m.erase(m.begin()), Err(MapError::InvalidArgument));
    assert_eq!(m.erase(m.end()), Err(MapError::InvalidArgument));

    m.insert("a").unwrap();
    assert_eq!(m.erase(m.begin()), Ok(()));
    assert_eq!(m.erase(m.begin()), Err(MapError::InvalidArgument));
    assert_eq!(m.find("a"), m.end());

    m.insert("a").unwrap();
    m.insert("f").unwrap();
    let c = m.begin();
    let key = c.key(&m).unwrap().to_string();
    assert_eq!(m.erase(c), Ok(()));
    assert_eq!(m.find(&key), m.end());
    assert_eq!(m.len(), 1);
    assert_eq!(m.erase(c), Err(MapError::InvalidArgument));
}

// Test: erasing one entry of a crowded bucket.
// Assumes: a generous load factor cap keeps the map at 5 buckets.
// Verifies: the remaining entries of the bucket stay findable.
#[test]
fn erase_inside_crowded_bucket() {
    let config = MapConfig::default().with_max_load_factor(100.0);
    let mut m = RunHashMap::with_config(1, config).unwrap();
    let keys: Vec<String> = (0..40).map(|i| format!("k{i}")).collect();
    for k in &keys {
        m.insert(k).unwrap();
    }
    assert_eq!(m.bucket_count(), 5);
    for k in keys.iter().step_by(3) {
        m.erase(m.find(k)).unwrap();
    }
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(m.contains_key(k), i % 3 != 0, "key {k}");
    }
    let total: usize = (0..m.bucket_count()).map(|b| m.bucket_size(b)).sum();
    assert_eq!(total, m.len());
}

// Test: rehash growth and cursor stability.
// Verifies: rehash(n <= buckets) is a no-op; rehash(n > buckets) reaches the
// smallest tier >= n, keeps size, keeps every key findable, and keeps earlier
// cursors pointing at the same key/payload.
#[test]
fn rehash_keeps_cursors_valid() {
    init_tracing();
    let mut m = RunHashMap::new(1).unwrap();
    let mut cursors = Vec::new();
    for (i, k) in ["a", "b", "c", "d"].into_iter().enumerate() {
        let r = m.insert(k).unwrap();
        r.payload[0] = i as u8;
        cursors.push((k, r.cursor, r.payload.as_ptr()));
    }

    m.rehash(3).unwrap();
    assert_eq!(m.bucket_count(), 5);

    m.rehash(42).unwrap();
    assert_eq!(m.bucket_count(), 47);
    assert_eq!(m.len(), 4);
    for (i, (k, c, ptr)) in cursors.iter().enumerate() {
        assert_eq!(c.key(&m), Some(*k));
        let p = c.payload(&m).unwrap();
        assert_eq!(p, &[i as u8]);
        assert_eq!(p.as_ptr(), *ptr);
        assert_eq!(m.find(k), *c);
    }
}

// Test: rehash past what the bucket index can address.
// Verifies: Overflow, with bucket count and entries unchanged.
#[test]
fn rehash_overflow_leaves_map_unchanged() {
    let mut m = RunHashMap::new(usize::MAX).unwrap();
    assert_eq!(m.insert("a").unwrap_err(), MapError::Overflow);
    assert_eq!(m.rehash(usize::MAX / 3), Err(MapError::Overflow));
    assert_eq!(m.rehash(usize::MAX), Err(MapError::Overflow));
    assert_eq!(m.bucket_count(), 5);
    assert_eq!(m.len(), 0);
}

// Test: maximum payload size.
// Verifies: every insert fails with Overflow; size stays 0.
#[test]
fn max_payload_size_rejects_every_insert() {
    let mut m = RunHashMap::new(usize::MAX).unwrap();
    for k in ["a", "b", "c"] {
        assert_eq!(m.insert(k).unwrap_err(), MapError::Overflow);
    }
    assert_eq!(m.len(), 0);
    assert!(m.is_empty());
}

// Test: reserve.
// Verifies: unrepresentable requests fail with Overflow; small requests are
// no-ops; larger ones grow to the matching tier.
#[test]
fn reserve_semantics() {
    let mut m = RunHashMap::new(4).unwrap();
    assert_eq!(m.reserve(usize::MAX), Err(MapError::Overflow));
    assert_eq!(m.reserve(m.max_bucket_count()), Err(MapError::Overflow));
    assert_eq!(m.bucket_count(), 5);
    assert_eq!(m.max_load_factor(), 1.0);

    m.reserve(42).unwrap();
    assert_eq!(m.bucket_count(), 47);
    m.reserve(5).unwrap();
    assert_eq!(m.bucket_count(), 47);
    m.reserve(47).unwrap();
    assert_eq!(m.bucket_count(), 47);
}

// Test: max load factor setter.
// Verifies: values are stored, clamped to 0.25 from below.
#[test]
fn max_load_factor_set_and_clamp() {
    let mut m = RunHashMap::new(4).unwrap();
    assert_eq!(m.max_load_factor(), 1.0);
    m.set_max_load_factor(4.0).unwrap();
    assert_eq!(m.max_load_factor(), 4.0);
    m.set_max_load_factor(0.0).unwrap();
    assert_eq!(m.max_load_factor(), 0.25);
    m.set_max_load_factor(-3.0).unwrap();
    assert_eq!(m.max_load_factor(), 0.25);
}

// Test: clear.
// Verifies: size 0, unchanged bucket count, cleared cursors invalid.
#[test]
fn clear_invalidates_cursors() {
    let mut m = RunHashMap::new(4).unwrap();
    m.insert("key").unwrap();
    let c = m.find("key");
    m.rehash(20).unwrap();
    let buckets = m.bucket_count();

    m.clear();
    assert!(m.is_empty());
    assert_eq!(m.len(), 0);
    assert_eq!(m.bucket_count(), buckets);
    assert!(m.at(c).is_none());
    assert_eq!(m.erase(c), Err(MapError::InvalidArgument));
    assert_eq!(m.advance(c, 1), Err(MapError::InvalidArgument));
}

// Test: cursor iteration in both access modes.
// Assumes: "a", "b", "c" land in distinct empty buckets, so list order is
// insertion order.
// Verifies: begin..end walks every entry once; read-only walk observes the
// payloads written through the mutable one.
#[test]
fn cursor_iteration() {
    let mut m = RunHashMap::new(1).unwrap();
    for (i, k) in ["a", "b", "c"].into_iter().enumerate() {
        m.insert(k).unwrap().payload[0] = i as u8;
    }

    let mut calls = 0u8;
    let mut c = m.begin();
    while c != m.end() {
        let pair = m.at_mut(c).unwrap();
        assert_eq!(pair.payload[0], calls);
        pair.payload[0] += 10;
        calls += 1;
        c = m.advance(c, 1).unwrap();
    }
    assert_eq!(calls, 3);

    let seen: Vec<(String, u8)> = {
        let mut out = Vec::new();
        let mut c = m.begin();
        while !c.is_end() {
            let pair = m.at(c).unwrap();
            out.push((pair.key.to_string(), pair.payload[0]));
            c = c.advance(&m, 1).unwrap();
        }
        out
    };
    assert_eq!(
        seen,
        vec![("a".to_string(), 10), ("b".to_string(), 11), ("c".to_string(), 12)]
    );
    assert_eq!(m.at(m.end()), None);
    assert!(m.at_mut(m.end()).is_none());
}

// Test: foreign cursors.
// Verifies: cursors are bound to the map that minted them.
#[test]
fn foreign_cursor_rejected() {
    let mut m1 = RunHashMap::new(1).unwrap();
    let mut m2 = RunHashMap::new(1).unwrap();
    let c1 = m1.insert("x").unwrap().cursor;
    m2.insert("x").unwrap();

    assert!(m2.at(c1).is_none());
    assert_eq!(m2.erase(c1), Err(MapError::InvalidArgument));
    assert_eq!(m2.advance(c1, 0), Err(MapError::InvalidArgument));
    assert_eq!(m2.len(), 1);
    assert_eq!(m1.at(c1).unwrap().key, "x");
}

// Test: element-count cap from configuration.
// Verifies: insert beyond max_size fails with Overflow after the cap.
#[test]
fn configured_size_cap() {
    let mut m = RunHashMap::with_config(4, MapConfig::default().with_max_size(8)).unwrap();
    for k in ["a", "b", "c", "d"] {
        m.insert(k).unwrap();
    }
    assert!(m.insert("e").unwrap().inserted);
    assert!(!m.insert("e").unwrap().inserted);
    for k in ["f", "g", "h"] {
        assert!(m.insert(k).unwrap().inserted);
    }
    assert_eq!(m.insert("i").unwrap_err(), MapError::Overflow);
    assert_eq!(m.len(), 8);
    assert_eq!(m.max_size(), 8);
}

// Test: empty map queries.
#[test]
fn empty_map_queries() {
    let m = RunHashMap::new(4).unwrap();
    assert!(m.is_empty());
    assert_eq!(m.len(), 0);
    assert_eq!(m.load_factor(), 0.0);
    assert_eq!(m.begin(), m.end());
    assert_eq!(m.iter().count(), 0);
    assert_eq!(m.get("missing"), None);
}
