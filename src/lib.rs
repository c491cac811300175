//! multikey-hashmap: hash maps whose keys are fixed-arity tuples of
//! independently typed components, with chained buckets and fail-fast
//! cursors.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one chained-bucket engine, shared by every key width, with thin
//!   positional wrappers on top so callers never build tuples by hand.
//! - Layers:
//!   - BucketTable<K, V>: power-of-two array of chain heads over a
//!     `SlotMap` arena. Entries cache their `u64` hash and link to their
//!     chain successor by arena key.
//!   - HashedMultiKeyMap<K, V, S>: keyed by a `CompositeKey<K>` where `K`
//!     is a 2-, 3- or 4-tuple. Owns the hasher, the load-factor threshold
//!     and the modification generation.
//!   - BinaryKeyMap / TernaryKeyMap / QuaternaryKeyMap: positional API
//!     (`put(a, b, v)`, `get(&a, &b)`), `Option`-taking `try_*` variants
//!     and typed cursors with one accessor per component.
//!
//! Constraints
//! - Key equality is component-wise; hashing feeds each component in order
//!   into the map's `BuildHasher`, so borrowed queries `(&a, &b)` hash like
//!   the owned key `(a, b)`. Each query component may be any `Q` the stored
//!   component borrows as (`&str` for `String`), so lookups never allocate.
//! - Absent components are only representable at the `try_*` boundary,
//!   where they are rejected with `InvalidKey` before any hashing.
//! - The table doubles once when an insert leaves `len` above
//!   `floor(capacity * load_factor)` and stops growing at `MAX_CAPACITY`.
//!   It never shrinks.
//! - Rehashing relinks entries using their cached hash; `K: Hash` is never
//!   invoked after insertion.
//!
//! Cursors and fail-fast
//! - A map carries a generation that advances on every structural change:
//!   inserting a new key, removing an entry, a `clear` or `retain` that
//!   removed something. Replacing the value of an existing key is not
//!   structural.
//! - `Cursor` is detached: it holds no borrow and takes the map on every
//!   call, so the map may be mutated between calls. It snapshots the
//!   generation and reports `ConcurrentModification` on the next advance
//!   after an outside structural change. Removal through the cursor itself
//!   resynchronizes the snapshot.
//! - Accessors with no current entry (before the first `next`, after
//!   exhaustion, right after a removal) fail with `InvalidIteratorState`.
//! - `CursorMut` exclusively borrows the map instead.
//!
//! Notes and non-goals
//! - Single-threaded; maps are `Send`/`Sync` exactly when their contents are.
//! - Traversal order is table order (bucket ascending, then chain order)
//!   and is not otherwise specified.
//! - No partial-key lookups (all entries whose first component is `a`).
//! - No persistence or serialization.

mod bucket_table;
pub mod composite_key;
pub mod config;
pub mod cursor;
pub mod error;
mod fixed_arity;
mod generation;
pub mod multi_key_map;
mod multi_key_map_proptest;

// Public surface
pub use composite_key::{CompositeKey, KeyQuery, KeyTuple};
pub use config::{MapConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR, MAX_CAPACITY};
pub use cursor::{Cursor, CursorMut};
pub use error::{MapError, Result};
pub use fixed_arity::{
    BinaryCursor, BinaryIter, BinaryKeyMap, QuaternaryCursor, QuaternaryIter, QuaternaryKeyMap,
    TernaryCursor, TernaryIter, TernaryKeyMap,
};
pub use multi_key_map::{HashedMultiKeyMap, Iter, IterMut};
