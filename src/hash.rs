//! Universal 32-bit hashing over the [`Value`] universe.
//!
//! The hash is total and deterministic within one process lifetime: scalars
//! hash through fixed rules, compound values fold over their elements, and
//! opaque values fall back to a process-wide identity registry. All
//! arithmetic wraps modulo 2³², matching the trie's 32-bit fragment walk.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, PoisonError, Weak};

use crate::value::{OpaqueValue, Value};

/// Hash of [`Value::Nil`].
pub const NIL_HASH: u32 = 0x4210_8422;

/// Hash of [`Value::Undefined`].
pub const UNDEFINED_HASH: u32 = 0x4210_8423;

/// Hash of `Value::Bool(true)`.
pub const TRUE_HASH: u32 = 0x4210_8421;

/// Hash of `Value::Bool(false)`.
pub const FALSE_HASH: u32 = 0x4210_8420;

/// Identity ids wrap back to zero once this bound is reached.
const UID_WRAP: u32 = 0x7fff_ffff;

/// Combines two hashes, order-sensitively.
#[inline]
#[must_use]
pub const fn merge(a: u32, b: u32) -> u32 {
    a ^ b
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(a << 6)
        .wrapping_add(a >> 2)
}

/// Hashes a string by the 31-multiplier fold over its code points.
#[must_use]
pub fn hash_string(s: &str) -> u32 {
    s.chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(u32::from(c)))
}

/// Hashes a number through its IEEE-754 double bit pattern.
///
/// The two 32-bit halves are extracted in fixed byte order, so the result
/// is identical across platforms.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub const fn hash_number(n: f64) -> u32 {
    let bits = n.to_bits();
    let hi = (bits >> 32) as u32;
    let lo = bits as u32;
    0x045d_9f3b_u32.wrapping_mul((hi >> 16) ^ hi) ^ lo
}

/// Computes the total hash of a value.
#[must_use]
pub fn hash_value(value: &Value) -> u32 {
    match value {
        Value::Nil => NIL_HASH,
        Value::Undefined => UNDEFINED_HASH,
        Value::Bool(true) => TRUE_HASH,
        Value::Bool(false) => FALSE_HASH,
        Value::Int(n) | Value::Date(n) => int_hash(*n),
        Value::Float(x) => hash_number(*x),
        Value::BigInt(n) => hash_string(&n.to_string()),
        Value::String(s) => hash_string(s),
        Value::Bytes(bytes) => bytes
            .iter()
            .fold(0u32, |h, &b| {
                h.wrapping_mul(31).wrapping_add(hash_number(f64::from(b)))
            }),
        Value::List(items) => items
            .iter()
            .fold(0u32, |h, item| {
                h.wrapping_mul(31).wrapping_add(hash_value(item))
            }),
        // Commutative fold: element order must not matter.
        Value::Set(items) => items
            .iter()
            .fold(0u32, |h, item| h.wrapping_add(hash_value(item))),
        Value::Map(pairs) => pairs.iter().fold(0u32, |h, (k, v)| {
            h.wrapping_add(merge(hash_value(v), hash_value(k)))
        }),
        Value::Record(fields) => fields.iter().fold(0u32, |h, (name, v)| {
            h.wrapping_add(merge(hash_value(v), hash_string(name)))
        }),
        Value::Opaque(o) => o
            .hash_code()
            .map_or_else(|| reference_hash(o), i32::cast_unsigned),
    }
}

/// Integers (and epoch timestamps) hash through their double form, like
/// every other number.
#[allow(clippy::cast_precision_loss)]
const fn int_hash(n: i64) -> u32 {
    hash_number(n as f64)
}

// ---------------------------------------------------------------------------
// Identity registry for opaque values
// ---------------------------------------------------------------------------

/// Process-wide `allocation → id` table.
///
/// Entries hold [`Weak`] references keyed on the allocation address, so a
/// dropped value never pins its id and a reused address is detected by the
/// identity check on lookup. The table is pruned of dead entries whenever
/// it crosses its growth watermark.
struct ReferenceRegistry {
    next_uid: u32,
    prune_at: usize,
    table: HashMap<usize, (Weak<dyn OpaqueValue>, u32)>,
}

impl ReferenceRegistry {
    fn id_for(&mut self, value: &Arc<dyn OpaqueValue>) -> u32 {
        let addr = Arc::as_ptr(value).cast::<()>().addr();

        if let Some((weak, id)) = self.table.get(&addr) {
            let live = weak.upgrade().is_some_and(|held| Arc::ptr_eq(&held, value));
            if live {
                return *id;
            }
            // Dead entry whose address was reused: fall through and reassign.
        }

        let id = self.next_uid;
        self.next_uid += 1;
        if self.next_uid == UID_WRAP {
            self.next_uid = 0;
        }

        if self.table.len() >= self.prune_at {
            self.table.retain(|_, (weak, _)| weak.strong_count() > 0);
            self.prune_at = (self.table.len() * 2).max(64);
        }
        self.table.insert(addr, (Arc::downgrade(value), id));
        id
    }
}

static REGISTRY: LazyLock<Mutex<ReferenceRegistry>> = LazyLock::new(|| {
    Mutex::new(ReferenceRegistry {
        next_uid: 0,
        prune_at: 64,
        table: HashMap::new(),
    })
});

/// Returns the stable identity hash of an opaque value.
fn reference_hash(value: &Arc<dyn OpaqueValue>) -> u32 {
    let mut registry = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
    registry.id_for(value)
}
