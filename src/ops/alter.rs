//! The unified write kernel.
//!
//! [`alter`] is the single primitive behind insert, update, and remove. It
//! walks the spine selected by the key's hash, asks a caller-supplied
//! decision callback what to do at the terminal position, and rebuilds only
//! the nodes along that spine — everything off the spine is shared with the
//! input trie. A subtree the decision leaves untouched is returned as the
//! identical `Arc`, which parents detect with [`Arc::ptr_eq`] to
//! short-circuit their own rebuild.

use std::sync::Arc;

use crate::node::{self, BITS_PER_LEVEL, MAX_PACKED_CHILDREN, Node, SLOT_COUNT};
use crate::value::Value;

/// What the decision callback sees at the key's position.
pub enum Existing<'a, V> {
    /// No entry is bound to the key.
    Absent,
    /// The key is bound to this value.
    Present(&'a V),
}

/// What the decision callback wants done at the key's position.
pub enum AlterOp<V> {
    /// Bind the key to this value, inserting or overwriting.
    Insert(V),
    /// Unbind the key; a no-op when the key is absent.
    Remove,
}

/// Applies `decide` to the position of `key` in the subtree at `node`.
///
/// The callback runs exactly once per call, which is what lets the map
/// façade maintain its size counter through it.
pub fn alter<V, F>(
    node: &Arc<Node<V>>,
    key: &Value,
    key_hash: u32,
    shift: u32,
    decide: F,
) -> Arc<Node<V>>
where
    V: Clone,
    F: FnOnce(Existing<'_, V>) -> AlterOp<V>,
{
    match node.as_ref() {
        Node::Empty => match decide(Existing::Absent) {
            AlterOp::Remove => Arc::clone(node),
            AlterOp::Insert(value) => new_leaf(key_hash, key.clone(), value),
        },
        Node::Leaf {
            hash,
            key: leaf_key,
            value,
        } => alter_leaf(node, *hash, leaf_key, value, key, key_hash, shift, decide),
        Node::Collision { hash, pairs } => {
            alter_collision(node, *hash, pairs, key, key_hash, shift, decide)
        }
        Node::Packed { bitmap, children } => {
            alter_packed(node, *bitmap, children, key, key_hash, shift, decide)
        }
        Node::Array { size, children } => {
            alter_array(node, *size, children, key, key_hash, shift, decide)
        }
    }
}

// ---------------------------------------------------------------------------
// Leaf
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn alter_leaf<V, F>(
    node: &Arc<Node<V>>,
    leaf_hash: u32,
    leaf_key: &Value,
    leaf_value: &V,
    key: &Value,
    key_hash: u32,
    shift: u32,
    decide: F,
) -> Arc<Node<V>>
where
    V: Clone,
    F: FnOnce(Existing<'_, V>) -> AlterOp<V>,
{
    if leaf_key == key {
        match decide(Existing::Present(leaf_value)) {
            AlterOp::Remove => Arc::new(Node::Empty),
            AlterOp::Insert(value) => Arc::new(Node::Leaf {
                hash: leaf_hash,
                key: leaf_key.clone(),
                value,
            }),
        }
    } else {
        match decide(Existing::Absent) {
            AlterOp::Remove => Arc::clone(node),
            AlterOp::Insert(value) => merge_leaves(
                shift,
                leaf_hash,
                Arc::clone(node),
                key_hash,
                new_leaf(key_hash, key.clone(), value),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Collision
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn alter_collision<V, F>(
    node: &Arc<Node<V>>,
    node_hash: u32,
    pairs: &[(Value, V)],
    key: &Value,
    key_hash: u32,
    shift: u32,
    decide: F,
) -> Arc<Node<V>>
where
    V: Clone,
    F: FnOnce(Existing<'_, V>) -> AlterOp<V>,
{
    if key_hash != node_hash {
        // The key does not share this node's hash: the whole collision
        // block moves as a unit under a new interior spine.
        return match decide(Existing::Absent) {
            AlterOp::Remove => Arc::clone(node),
            AlterOp::Insert(value) => merge_leaves(
                shift,
                node_hash,
                Arc::clone(node),
                key_hash,
                new_leaf(key_hash, key.clone(), value),
            ),
        };
    }

    match pairs.iter().position(|(k, _)| k == key) {
        Some(at) => match decide(Existing::Present(&pairs[at].1)) {
            AlterOp::Insert(value) => {
                let mut replaced = pairs.to_vec();
                replaced[at].1 = value;
                Arc::new(Node::Collision {
                    hash: node_hash,
                    pairs: replaced,
                })
            }
            AlterOp::Remove => {
                if pairs.len() == 2 {
                    // A length-1 collision is degenerate: collapse to a leaf.
                    let (remaining_key, remaining_value) = pairs[1 - at].clone();
                    Arc::new(Node::Leaf {
                        hash: node_hash,
                        key: remaining_key,
                        value: remaining_value,
                    })
                } else {
                    let mut shrunk = pairs.to_vec();
                    shrunk.remove(at);
                    Arc::new(Node::Collision {
                        hash: node_hash,
                        pairs: shrunk,
                    })
                }
            }
        },
        None => match decide(Existing::Absent) {
            AlterOp::Remove => Arc::clone(node),
            AlterOp::Insert(value) => merge_leaves(
                shift,
                node_hash,
                Arc::clone(node),
                key_hash,
                new_leaf(key_hash, key.clone(), value),
            ),
        },
    }
}

// ---------------------------------------------------------------------------
// Packed (sparse bitmap)
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn alter_packed<V, F>(
    node: &Arc<Node<V>>,
    bitmap: u32,
    children: &[Arc<Node<V>>],
    key: &Value,
    key_hash: u32,
    shift: u32,
    decide: F,
) -> Arc<Node<V>>
where
    V: Clone,
    F: FnOnce(Existing<'_, V>) -> AlterOp<V>,
{
    let frag = node::fragment(key_hash, shift);
    let bit = node::mask(frag);

    if bitmap & bit != 0 {
        let at = node::index(bitmap, bit);
        let child = &children[at];
        let new_child = alter(child, key, key_hash, shift + BITS_PER_LEVEL, decide);

        if Arc::ptr_eq(&new_child, child) {
            return Arc::clone(node);
        }
        if new_child.is_empty() {
            if bitmap == bit {
                // That was the only child.
                return Arc::new(Node::Empty);
            }
            let mut shrunk = children.to_vec();
            shrunk.remove(at);
            return Arc::new(Node::Packed {
                bitmap: bitmap & !bit,
                children: shrunk,
            });
        }
        let mut replaced = children.to_vec();
        replaced[at] = new_child;
        Arc::new(Node::Packed {
            bitmap,
            children: replaced,
        })
    } else {
        match decide(Existing::Absent) {
            AlterOp::Remove => Arc::clone(node),
            AlterOp::Insert(value) => {
                let leaf = new_leaf(key_hash, key.clone(), value);
                if children.len() >= MAX_PACKED_CHILDREN {
                    promote(bitmap, children, frag, leaf)
                } else {
                    let mut grown = children.to_vec();
                    grown.insert(node::index(bitmap, bit), leaf);
                    Arc::new(Node::Packed {
                        bitmap: bitmap | bit,
                        children: grown,
                    })
                }
            }
        }
    }
}

/// Converts a full packed node into a dense array node, adding `leaf` at
/// its fragment slot.
fn promote<V>(
    bitmap: u32,
    children: &[Arc<Node<V>>],
    frag: u32,
    leaf: Arc<Node<V>>,
) -> Arc<Node<V>> {
    let mut slots: [Option<Arc<Node<V>>>; SLOT_COUNT] = std::array::from_fn(|_| None);
    slots[frag as usize] = Some(leaf);

    let mut next = 0;
    for (f, slot) in slots.iter_mut().enumerate() {
        if bitmap & (1_u32 << f) != 0 {
            *slot = Some(Arc::clone(&children[next]));
            next += 1;
        }
    }

    Arc::new(Node::Array {
        size: children.len() + 1,
        children: Box::new(slots),
    })
}

// ---------------------------------------------------------------------------
// Array (dense)
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments, clippy::option_if_let_else)]
fn alter_array<V, F>(
    node: &Arc<Node<V>>,
    size: usize,
    children: &[Option<Arc<Node<V>>>; SLOT_COUNT],
    key: &Value,
    key_hash: u32,
    shift: u32,
    decide: F,
) -> Arc<Node<V>>
where
    V: Clone,
    F: FnOnce(Existing<'_, V>) -> AlterOp<V>,
{
    let frag = node::fragment(key_hash, shift) as usize;

    match &children[frag] {
        None => match decide(Existing::Absent) {
            AlterOp::Remove => Arc::clone(node),
            AlterOp::Insert(value) => {
                let mut slots = Box::new(children.clone());
                slots[frag] = Some(new_leaf(key_hash, key.clone(), value));
                Arc::new(Node::Array {
                    size: size + 1,
                    children: slots,
                })
            }
        },
        Some(child) => {
            let new_child = alter(child, key, key_hash, shift + BITS_PER_LEVEL, decide);

            if Arc::ptr_eq(&new_child, child) {
                return Arc::clone(node);
            }
            if new_child.is_empty() {
                if size == 1 {
                    return Arc::new(Node::Empty);
                }
                // TODO: demote to a packed node when size drops below 8 to
                // reclaim the slack slots.
                let mut slots = Box::new(children.clone());
                slots[frag] = None;
                return Arc::new(Node::Array {
                    size: size - 1,
                    children: slots,
                });
            }
            let mut slots = Box::new(children.clone());
            slots[frag] = Some(new_child);
            Arc::new(Node::Array {
                size,
                children: slots,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Leaf merging
// ---------------------------------------------------------------------------

/// Combines two terminal nodes into a subtree rooted at `shift`.
///
/// Equal hashes produce a collision node; otherwise packed nodes grow
/// downward until the two hash fragments diverge. The fragment walk covers
/// all 32 hash bits within seven levels, so equal fragments the whole way
/// down would mean equal hashes — already handled above the recursion.
pub fn merge_leaves<V: Clone>(
    shift: u32,
    hash_a: u32,
    a: Arc<Node<V>>,
    hash_b: u32,
    b: Arc<Node<V>>,
) -> Arc<Node<V>> {
    if hash_a == hash_b {
        return Arc::new(Node::Collision {
            hash: hash_a,
            pairs: merged_pairs(&a, &b),
        });
    }

    let frag_a = node::fragment(hash_a, shift);
    let frag_b = node::fragment(hash_b, shift);
    let bitmap = node::mask(frag_a) | node::mask(frag_b);

    let children = if frag_a == frag_b {
        vec![merge_leaves(shift + BITS_PER_LEVEL, hash_a, a, hash_b, b)]
    } else if frag_a < frag_b {
        vec![a, b]
    } else {
        vec![b, a]
    };

    Arc::new(Node::Packed { bitmap, children })
}

/// Concatenates the pair lists of two equal-hash terminals.
///
/// Collision pairs keep their position ahead of a lone leaf pair; for two
/// leaves the second argument's pair sorts first. The order is observable
/// only through the pretty-printer, but it must be deterministic.
fn merged_pairs<V: Clone>(a: &Node<V>, b: &Node<V>) -> Vec<(Value, V)> {
    match (a, b) {
        (Node::Collision { pairs: left, .. }, Node::Collision { pairs: right, .. }) => {
            let mut merged = left.clone();
            merged.extend(right.iter().cloned());
            merged
        }
        (Node::Collision { pairs, .. }, Node::Leaf { key, value, .. })
        | (Node::Leaf { key, value, .. }, Node::Collision { pairs, .. }) => {
            let mut merged = pairs.clone();
            merged.push((key.clone(), value.clone()));
            merged
        }
        (
            Node::Leaf {
                key: key_a,
                value: value_a,
                ..
            },
            Node::Leaf {
                key: key_b,
                value: value_b,
                ..
            },
        ) => vec![
            (key_b.clone(), value_b.clone()),
            (key_a.clone(), value_a.clone()),
        ],
        _ => unreachable!("merge_leaves called on a non-terminal node"),
    }
}

fn new_leaf<V>(hash: u32, key: Value, value: V) -> Arc<Node<V>> {
    Arc::new(Node::Leaf { hash, key, value })
}
