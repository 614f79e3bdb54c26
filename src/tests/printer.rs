use std::fmt;
use std::sync::Arc;

use crate::{HamtMap, OpaqueValue, Value};

struct Pinned(i32);

impl fmt::Debug for Pinned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pinned({})", self.0)
    }
}

impl OpaqueValue for Pinned {
    fn hash_code(&self) -> Option<i32> {
        Some(self.0)
    }
}

#[test]
fn empty_prints_nothing() {
    let map: HamtMap<i32> = HamtMap::new();
    assert_eq!(map.to_string(), "");
}

#[test]
fn single_leaf() {
    let map = HamtMap::new().insert(1, 10);
    assert_eq!(map.to_string(), "-leaf(k: 1, v: 10)\n");
}

#[test]
fn collision_prints_pair_count() {
    // Collision blocks keep the historical "leaf" label.
    let map = HamtMap::new()
        .insert(Value::opaque(Arc::new(Pinned(7))), 1)
        .insert(Value::opaque(Arc::new(Pinned(7))), 2);
    assert_eq!(map.to_string(), "-leaf(2)\n");
}

#[test]
fn packed_children_in_fragment_order() {
    // Key 2's first hash fragment is below key 1's, so it prints first.
    let map = HamtMap::new().insert(1, "one").insert(2, "two");
    assert_eq!(
        map.to_string(),
        "-packed(2)\n  -leaf(k: 2, v: two)\n  -leaf(k: 1, v: one)\n"
    );
}

#[test]
fn spine_indents_two_spaces_per_level() {
    // Keys 3 and 12 share a root fragment, so the pair sits one level down.
    let map = HamtMap::new().insert(3, "a").insert(12, "b");
    assert_eq!(
        map.to_string(),
        "-packed(1)\n  -packed(2)\n    -leaf(k: 12, v: b)\n    -leaf(k: 3, v: a)\n"
    );
}

#[test]
fn array_root_header() {
    let mut map = HamtMap::new();
    for i in 0_i64..33 {
        map = map.insert(i, i);
    }
    assert_eq!(map.to_string().lines().next(), Some("-array(24)"));
}

#[test]
fn string_keys_print_quoted() {
    let map = HamtMap::new().insert("k", 1);
    assert_eq!(map.to_string(), "-leaf(k: \"k\", v: 1)\n");
}
