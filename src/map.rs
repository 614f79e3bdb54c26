//! Persistent HAMT map façade.

use std::fmt;
use std::ops;
use std::sync::Arc;

use crate::hash::hash_value;
use crate::iter::Iter;
use crate::node::Node;
use crate::ops::alter::{AlterOp, Existing, alter};
use crate::ops::get::find;
use crate::value::Value;

/// Persistent hash map keyed by [`Value`], based on a HAMT.
///
/// Every write returns a new map that shares structure with its
/// predecessor; the predecessor stays valid and unchanged. Any number of
/// maps derived from a common ancestor can be read — or extended into
/// further maps — concurrently, because no reachable node is ever mutated.
pub struct HamtMap<V> {
    root: Arc<Node<V>>,
    size: usize,
}

// ---------------------------------------------------------------------------
// Construction & accessors — no trait bounds
// ---------------------------------------------------------------------------

impl<V> HamtMap<V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Arc::new(Node::Empty),
            size: 0,
        }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &Node<V> {
        &self.root
    }
}

// ---------------------------------------------------------------------------
// Read operations
// ---------------------------------------------------------------------------

impl<V> HamtMap<V> {
    /// Returns a reference to the value associated with `key`.
    ///
    /// An absent key is a normal outcome, reported as `None`.
    #[must_use]
    pub fn get(&self, key: impl Into<Value>) -> Option<&V> {
        let key = key.into();
        find(&self.root, &key, hash_value(&key))
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: impl Into<Value>) -> bool {
        self.get(key).is_some()
    }

    /// Returns an iterator over `(&Value, &V)` pairs in unspecified order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.root)
    }
}

// ---------------------------------------------------------------------------
// Write operations — V: Clone for spine rebuilds
// ---------------------------------------------------------------------------

impl<V: Clone> HamtMap<V> {
    /// Returns a new map with `key` bound to `value`.
    ///
    /// Overwrites any existing binding; the size grows only when the key
    /// was new. `self` is unchanged.
    #[must_use = "insert returns a new map; the original is unchanged"]
    pub fn insert(&self, key: impl Into<Value>, value: V) -> Self {
        let key = key.into();
        let key_hash = hash_value(&key);
        let mut added = true;
        let root = alter(&self.root, &key, key_hash, 0, |existing| {
            if matches!(existing, Existing::Present(_)) {
                added = false;
            }
            AlterOp::Insert(value)
        });
        Self {
            root,
            size: self.size + usize::from(added),
        }
    }

    /// Returns a new map without a binding for `key`.
    ///
    /// When the key is absent the result shares its entire trie with
    /// `self`. `self` is unchanged either way.
    #[must_use = "remove returns a new map; the original is unchanged"]
    pub fn remove(&self, key: impl Into<Value>) -> Self {
        let key = key.into();
        let key_hash = hash_value(&key);
        let mut removed = false;
        let root = alter(&self.root, &key, key_hash, 0, |existing| {
            if matches!(existing, Existing::Present(_)) {
                removed = true;
            }
            AlterOp::Remove
        });
        Self {
            root,
            size: self.size - usize::from(removed),
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostic pretty-printer
// ---------------------------------------------------------------------------

impl<V: fmt::Display> fmt::Display for HamtMap<V> {
    /// One indented line per non-empty node, two spaces per depth level.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, &self.root, 0)
    }
}

fn write_node<V: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    node: &Node<V>,
    depth: usize,
) -> fmt::Result {
    let indent = depth * 2;
    match node {
        Node::Empty => Ok(()),
        Node::Leaf { key, value, .. } => {
            writeln!(f, "{:indent$}-leaf(k: {key}, v: {value})", "")
        }
        // Collision blocks keep the historical "leaf" label, with the
        // pair count in place of the entry.
        Node::Collision { pairs, .. } => {
            writeln!(f, "{:indent$}-leaf({})", "", pairs.len())
        }
        Node::Packed { children, .. } => {
            writeln!(f, "{:indent$}-packed({})", "", children.len())?;
            children
                .iter()
                .try_for_each(|child| write_node(f, child, depth + 1))
        }
        Node::Array { size, children } => {
            writeln!(f, "{:indent$}-array({size})", "")?;
            children
                .iter()
                .flatten()
                .try_for_each(|child| write_node(f, child, depth + 1))
        }
    }
}

// ---------------------------------------------------------------------------
// Trait impls — Clone and Debug avoid false `V: Trait` bounds
// ---------------------------------------------------------------------------

impl<V> Clone for HamtMap<V> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            size: self.size,
        }
    }
}

impl<V> Default for HamtMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for HamtMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HamtMap")
            .field("len", &self.size)
            .field("root", &self.root)
            .finish()
    }
}

impl<V: PartialEq> PartialEq for HamtMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<V: Eq> Eq for HamtMap<V> {}

impl<V: Clone> Extend<(Value, V)> for HamtMap<V> {
    fn extend<I: IntoIterator<Item = (Value, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            *self = self.insert(key, value);
        }
    }
}

impl<V: Clone> FromIterator<(Value, V)> for HamtMap<V> {
    fn from_iter<I: IntoIterator<Item = (Value, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<V> ops::Index<&Value> for HamtMap<V> {
    type Output = V;

    fn index(&self, key: &Value) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, V> IntoIterator for &'a HamtMap<V> {
    type Item = (&'a Value, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}
