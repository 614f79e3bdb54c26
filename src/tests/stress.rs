use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::HamtMap;

/// 1000 entries: insert all, verify all, remove all.
#[test]
fn thousand_entries() {
    let mut map = HamtMap::new();
    for i in 0_i64..1000 {
        map = map.insert(i, i * 3);
    }
    assert_eq!(map.len(), 1000);

    for i in 0_i64..1000 {
        assert_eq!(map.get(i), Some(&(i * 3)), "missing key {i}");
    }

    for i in 0_i64..1000 {
        map = map.remove(i);
    }
    assert!(map.is_empty());
}

/// Insert + overwrite + remove interleaved.
#[test]
fn interleaved_operations() {
    let mut map = HamtMap::new();
    for i in 0_i64..200 {
        map = map.insert(i, i);
    }
    // Overwrite even keys.
    for i in (0_i64..200).step_by(2) {
        map = map.insert(i, i + 1000);
    }
    // Remove odd keys.
    for i in (1_i64..200).step_by(2) {
        map = map.remove(i);
    }
    assert_eq!(map.len(), 100);
    for i in (0_i64..200).step_by(2) {
        assert_eq!(map.get(i), Some(&(i + 1000)));
    }
}

/// Random insert/remove mix checked against a mutable model map.
#[test]
fn randomized_against_model() {
    let mut rng = StdRng::seed_from_u64(0x00C0_FFEE);
    let mut map = HamtMap::new();
    let mut model: HashMap<i64, i64> = HashMap::new();

    for step in 0..5000 {
        let key = rng.random_range(0_i64..500);
        if rng.random_bool(0.6) {
            let value = rng.random_range(0_i64..1_000_000);
            map = map.insert(key, value);
            model.insert(key, value);
        } else {
            map = map.remove(key);
            model.remove(&key);
        }
        assert_eq!(map.len(), model.len(), "size drift at step {step}");
    }

    for key in 0_i64..500 {
        assert_eq!(map.get(key), model.get(&key), "key {key}");
    }
}

#[test]
fn string_keys_at_scale() {
    let mut map = HamtMap::new();
    for i in 0_u32..500 {
        map = map.insert(format!("key-{i}"), i);
    }
    assert_eq!(map.len(), 500);
    for i in 0_u32..500 {
        assert_eq!(map.get(format!("key-{i}")), Some(&i));
    }
}

#[test]
fn iteration_covers_all_entries() {
    let mut map = HamtMap::new();
    for i in 0_i64..100 {
        map = map.insert(i, i);
    }
    assert_eq!(map.iter().len(), 100);
    let total: i64 = map.iter().map(|(_, v)| *v).sum();
    assert_eq!(total, (0_i64..100).sum());
}

/// Snapshots taken mid-build stay intact while the tip is demolished.
#[test]
fn snapshots_survive_later_churn() {
    let mut map = HamtMap::new();
    let mut snapshots = Vec::new();
    for i in 0_i64..500 {
        if i % 100 == 0 {
            snapshots.push((i, map.clone()));
        }
        map = map.insert(i, i);
    }
    for i in 0_i64..500 {
        map = map.remove(i);
    }
    assert!(map.is_empty());

    for (upto, snapshot) in &snapshots {
        assert_eq!(snapshot.len(), usize::try_from(*upto).expect("small count"));
        for i in 0..*upto {
            assert_eq!(snapshot.get(i), Some(&i), "snapshot {upto}, key {i}");
        }
    }
}
