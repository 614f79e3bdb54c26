//! The dynamic key universe and its equality contract.
//!
//! [`Value`] covers every key shape the hashing layer knows how to hash:
//! scalars, strings, byte buffers, compound containers, dates, and opaque
//! by-reference values. Compound payloads are `Arc`-backed so cloning a key
//! into the trie is a pointer bump, never a deep copy.

use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;

/// A value that is only meaningful by identity: a task handle, a callable,
/// a symbol — anything the structural hash cannot look inside.
///
/// The default hash for such a value is a process-wide sequential id keyed
/// weakly on the allocation (see [`crate::hash`]). A type can override that
/// by returning `Some` from [`hash_code`](Self::hash_code); returning `None`
/// falls back to the identity hash.
pub trait OpaqueValue: fmt::Debug + Send + Sync {
    /// Custom hash override. `None` means "no usable override" and selects
    /// the identity hash.
    fn hash_code(&self) -> Option<i32> {
        None
    }
}

/// A map key.
///
/// Equality is structural and agrees with [`crate::hash::hash_value`]:
/// equal values always hash equally. Floats compare by bit pattern (so
/// `Eq` is lawful and `NaN` keys behave), [`Set`](Self::Set) and
/// [`Map`](Self::Map) compare without regard to element order, and
/// [`Opaque`](Self::Opaque) values compare by allocation identity.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value (`null` in dynamic hosts).
    Nil,
    /// The explicitly-undefined value, distinct from [`Nil`](Self::Nil).
    Undefined,
    /// A boolean.
    Bool(bool),
    /// A machine integer, hashed through its IEEE-754 double form.
    Int(i64),
    /// A double-precision float.
    Float(f64),
    /// An arbitrary-precision integer, hashed via its decimal rendering.
    BigInt(Arc<BigInt>),
    /// A Unicode string.
    String(Arc<str>),
    /// A byte buffer.
    Bytes(Arc<[u8]>),
    /// An ordered sequence.
    List(Arc<[Value]>),
    /// An unordered collection of values.
    Set(Arc<[Value]>),
    /// An unordered collection of key-value associations.
    Map(Arc<[(Value, Value)]>),
    /// A named-field container; field order is significant.
    Record(Arc<[(Arc<str>, Value)]>),
    /// A point in time as milliseconds since the Unix epoch.
    Date(i64),
    /// An identity-compared opaque value.
    Opaque(Arc<dyn OpaqueValue>),
}

impl Value {
    /// Builds a [`List`](Self::List) from an iterator of elements.
    #[must_use]
    pub fn list<I: IntoIterator<Item = Self>>(items: I) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Builds a [`Set`](Self::Set) from an iterator of elements.
    #[must_use]
    pub fn set<I: IntoIterator<Item = Self>>(items: I) -> Self {
        Self::Set(items.into_iter().collect())
    }

    /// Builds a [`Map`](Self::Map) from an iterator of pairs.
    #[must_use]
    pub fn map<I: IntoIterator<Item = (Self, Self)>>(pairs: I) -> Self {
        Self::Map(pairs.into_iter().collect())
    }

    /// Builds a [`Record`](Self::Record) from `(name, value)` fields.
    #[must_use]
    pub fn record<'a, I: IntoIterator<Item = (&'a str, Self)>>(fields: I) -> Self {
        Self::Record(
            fields
                .into_iter()
                .map(|(name, value)| (Arc::from(name), value))
                .collect(),
        )
    }

    /// Builds a [`Date`](Self::Date) from epoch milliseconds.
    #[must_use]
    pub const fn date(epoch_millis: i64) -> Self {
        Self::Date(epoch_millis)
    }

    /// Wraps an opaque value for identity-based keying.
    #[must_use]
    pub const fn opaque(value: Arc<dyn OpaqueValue>) -> Self {
        Self::Opaque(value)
    }
}

// ---------------------------------------------------------------------------
// Equality
// ---------------------------------------------------------------------------

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) | (Self::Undefined, Self::Undefined) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) | (Self::Date(a), Self::Date(b)) => a == b,
            // Bit-pattern comparison keeps Eq reflexive for NaN and agrees
            // with the bit-pattern hash (so -0.0 and 0.0 are distinct keys).
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => unordered_eq(a, b),
            (Self::Map(a), Self::Map(b)) => unordered_pairs_eq(a, b),
            (Self::Record(a), Self::Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((na, va), (nb, vb))| na == nb && va == vb)
            }
            (Self::Opaque(a), Self::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Order-insensitive element equality with multiplicity.
fn unordered_eq(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut claimed = vec![false; b.len()];
    a.iter().all(|x| {
        b.iter().enumerate().any(|(i, y)| {
            if !claimed[i] && x == y {
                claimed[i] = true;
                true
            } else {
                false
            }
        })
    })
}

/// Order-insensitive pair equality with multiplicity.
fn unordered_pairs_eq(a: &[(Value, Value)], b: &[(Value, Value)]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut claimed = vec![false; b.len()];
    a.iter().all(|(xk, xv)| {
        b.iter().enumerate().any(|(i, (yk, yv))| {
            if !claimed[i] && xk == yk && xv == yv {
                claimed[i] = true;
                true
            } else {
                false
            }
        })
    })
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<&Self> for Value {
    fn from(v: &Self) -> Self {
        v.clone()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Arc::from(bytes))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(Arc::from(items))
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Self::BigInt(Arc::new(n))
    }
}

// ---------------------------------------------------------------------------
// Display — used by the map pretty-printer
// ---------------------------------------------------------------------------

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Undefined => f.write_str("undefined"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::BigInt(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "bytes({})", b.len()),
            Self::List(items) => write_joined(f, "[", items.iter(), "]"),
            Self::Set(items) => write_joined(f, "#{", items.iter(), "}"),
            Self::Map(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Self::Record(fields) => {
                f.write_str("(")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str(")")
            }
            Self::Date(ms) => write!(f, "date({ms})"),
            Self::Opaque(o) => write!(f, "{o:?}"),
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: impl Iterator<Item = &'a Value>,
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(close)
}
