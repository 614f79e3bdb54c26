use std::ptr;

use crate::HamtMap;

/// Inserting into a derived map leaves the original observationally intact.
#[test]
fn original_unchanged_after_insert() {
    let mut original = HamtMap::new();
    for i in 0_i64..50 {
        original = original.insert(i, i * 10);
    }

    let derived = original.insert(1000, 1);

    assert_eq!(original.len(), 50);
    assert_eq!(original.get(1000), None);
    for i in 0_i64..50 {
        assert_eq!(original.get(i), Some(&(i * 10)));
    }
    assert_eq!(derived.len(), 51);
    assert_eq!(derived.get(1000), Some(&1));
}

#[test]
fn original_unchanged_after_remove() {
    let original = HamtMap::new().insert("a", 1).insert("b", 2);
    let derived = original.remove("a");

    assert_eq!(original.len(), 2);
    assert_eq!(original.get("a"), Some(&1));
    assert_eq!(derived.len(), 1);
    assert_eq!(derived.get("a"), None);
}

#[test]
fn original_unchanged_after_overwrite() {
    let original = HamtMap::new().insert("k", "old");
    let derived = original.insert("k", "new");

    assert_eq!(original.get("k"), Some(&"old"));
    assert_eq!(derived.get("k"), Some(&"new"));
}

/// Removing an absent key shares the entire trie with the input.
#[test]
fn remove_absent_shares_root() {
    let map = HamtMap::new().insert(1, "a").insert(2, "b");
    let same = map.remove(999);
    assert!(ptr::eq(map.root(), same.root()));
}

#[test]
fn clone_shares_root() {
    let map = HamtMap::new().insert(1, "a");
    let cloned = map.clone();
    assert!(ptr::eq(map.root(), cloned.root()));
    assert_eq!(cloned.get(1), Some(&"a"));
}

/// Sibling maps derived from a common ancestor are independent.
#[test]
fn derived_maps_diverge() {
    let base = HamtMap::new().insert(1, "base");
    let left = base.insert(2, "left");
    let right = base.insert(3, "right");

    assert_eq!(base.len(), 1);
    assert_eq!(left.get(2), Some(&"left"));
    assert_eq!(left.get(3), None);
    assert_eq!(right.get(3), Some(&"right"));
    assert_eq!(right.get(2), None);
}

/// Every intermediate version of a long insert chain stays readable.
#[test]
fn version_chain_stays_valid() {
    let mut versions = vec![HamtMap::new()];
    for i in 0_i64..100 {
        let next = versions.last().expect("non-empty").insert(i, i);
        versions.push(next);
    }

    for (n, version) in versions.iter().enumerate() {
        assert_eq!(version.len(), n);
        for i in 0..n {
            let key = i64::try_from(i).expect("small index");
            assert_eq!(version.get(key), Some(&key));
        }
        let next_key = i64::try_from(n).expect("small index");
        assert_eq!(version.get(next_key), None);
    }
}
