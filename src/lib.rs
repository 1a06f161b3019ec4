//! robinhood-hashmap: a single-threaded map built on Robin Hood open
//! addressing, with stable refs to records and recency-ordered iteration.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the probing structure and the record storage separate so
//!   each piece has a small contract that can be tested on its own.
//! - Layers:
//!   - SlotTable: power-of-two vector of slots, each Free or holding a
//!     `RecordRef` plus its probe sequence length (PSL). Implements the
//!     Robin Hood discipline: placement displaces occupants closer to
//!     their ideal slot, probes stop once the searched distance exceeds
//!     an occupant's PSL, and removal backward-shifts the chain behind
//!     the freed slot.
//!   - RecordList: SlotMap arena of records threaded onto a doubly-linked
//!     list, most recently inserted first. Records never move; arena keys
//!     wrapped as `RecordRef` are the stable references handed to users.
//!   - RobinHoodMap<K, V, S>: public API coupling the two. Insert hashes
//!     once, links a record, places its ref; remove frees the slot first
//!     and then drops the record.
//!
//! Constraints
//! - Unique keys: inserting a present key is a no-op; the stored value
//!   wins and the incoming pair is dropped.
//! - Capacity: 0 until the first insert, then 2, doubling whenever an
//!   insert would push occupancy over 4/5; never shrinks, `clear`
//!   included.
//! - Average O(1) insert/lookup/remove; growth is a synchronous full
//!   re-placement of every slot.
//! - Single-threaded use; no interior mutability, so `&mut` methods are
//!   the only writers and shared references never observe a half-updated
//!   structure.
//!
//! Hasher and rehashing invariants
//! - Each record stores the `u64` hash computed when it was inserted and
//!   the table is always probed and regrown with stored hashes; `K: Hash`
//!   runs once per insert and once per lookup argument, never during
//!   growth.
//! - Iteration order is a property of the record list alone, so it is
//!   identical for any two hashers given the same insert/remove history.
//!
//! Ref validity
//! - A `RecordRef` stays valid across growth, displacement, and removal
//!   of other keys; it goes stale when its own record is removed (or the
//!   map is cleared) and then resolves to `None` forever. Generational
//!   arena keys make reuse of a physical slot observable as a different
//!   ref.
//!
//! Notes and non-goals
//! - No `Index`/`IndexMut`: the indexing operation inserts a default on a
//!   miss, which `&self` indexing cannot express. It is spelled
//!   `get_or_insert_default` / `get_or_insert_with`.
//! - No shrinking, no reserve, no entry API.
//! - Keys are immutable post-insert; there is no `key_mut`.
//! - Public API surface is `RobinHoodMap`, its `RecordRef`, the
//!   iterators, and `KeyNotFound`; the slot table and record list are
//!   implementation details.

mod record_list;
mod robin_hood_map;
mod robin_hood_map_proptest;
mod slot_table;

// Public surface
pub use record_list::{Iter, IterMut, RecordRef};
pub use robin_hood_map::{KeyNotFound, RobinHoodMap};
