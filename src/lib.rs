//! chain-hashmap: a single-threaded, separate-chaining map with one
//! optional null key and cursor-style traversal views.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small chained hash table whose node graph is expressed without
//!   raw pointers or `Rc<RefCell<_>>`, so each piece can be reasoned about
//!   independently.
//! - Layers:
//!   - `node`: chain nodes living in a `SlotMap` arena; links are arena keys.
//!   - `buckets`: the power-of-two array of chain heads, index masking, and
//!     the doubling resize that relinks nodes by their cached hash.
//!   - `ChainHashMap<K, V, S>`: lookup, insert/update, delete and the
//!     growth check, on top of the two layers above.
//!   - `views`: `Keys`, `Values`, `Entries` cursors over the live buckets.
//!
//! Constraints
//! - Single-threaded; no locks, no atomics. Sharing across threads needs
//!   external synchronization.
//! - Bucket count is a power of two >= 16 and only ever doubles; deletes
//!   never shrink it.
//! - After every insertion of a new key, `len <= capacity * 0.75`. Updates of
//!   existing keys skip the check entirely.
//! - Any insertion may pay an O(len) resize inline.
//!
//! Null key
//! - Keys are stored as `Option<K>`; `None` is the null key. It hashes to 0
//!   and is only equal to itself, so at most one node holds it.
//!
//! Hashing and rehashing invariants
//! - Each node stores a 32-bit hash, folded from the `BuildHasher` output.
//!   Rehoming during resize always uses the stored hash; `K: Hash` is never
//!   invoked after insertion. Keys are immutable post-insert.
//! - The default hasher is deterministic. No defence against adversarial
//!   collisions is attempted.
//!
//! Ordering
//! - Views walk buckets in ascending index order, then each chain front to
//!   back. New keys append to a chain's tail, so a chain is in insertion
//!   order until the next resize; resize prepends relocated nodes, which
//!   reverses the relative order of nodes that stay together. Callers must
//!   not rely on any global order.
//!
//! Failure conventions
//! - `get`/`put`/`delete` report a missing key as `None`; that is a normal
//!   outcome.
//! - View cursors report a request past the last element as
//!   `Err(Exhausted)` from `try_next`. The `Iterator` impls map that to
//!   `None` as usual.
//!
//! Notes and non-goals
//! - No shrinking, no seeded hashing, no ordering guarantees, no
//!   concurrent access.
//! - Mutation during traversal is rejected by the borrow checker, since
//!   every view borrows the map.

mod buckets;
mod chain_hash_map;
mod chain_hash_map_proptest;
pub mod error;
mod node;
mod views;

// Public surface
pub use buckets::{DEFAULT_CAPACITY, LOAD_FACTOR};
pub use chain_hash_map::{ChainHashMap, DefaultHashBuilder};
pub use error::Exhausted;
pub use node::Entry;
pub use views::{Entries, Keys, Values};
