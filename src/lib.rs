//! Persistent hash map based on a HAMT.
//!
//! A HAMT (Hash Array Mapped Trie) routes each key by consecutive 5-bit
//! fragments of its 32-bit hash. Every write returns a **new** map sharing
//! all untouched structure with its predecessor — the old map stays valid,
//! which is the essential contract.
//!
//! # Key properties
//!
//! - **Persistent**: every prior version remains readable after updates
//! - **Structural sharing**: writes rebuild only the spine they touch
//! - **Adaptive interior nodes**: sparse bitmap nodes promote to dense
//!   32-slot arrays past 16 children
//! - **Universal keys**: any [`Value`] is hashable, including compound and
//!   identity-only opaque values
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # References
//!
//! - Bagwell, 2001 — "Ideal Hash Trees"

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod hash;
pub mod iter;
pub mod node;
pub mod value;

mod map;
mod ops;

#[cfg(test)]
mod tests;

pub use map::HamtMap;
pub use value::{OpaqueValue, Value};
