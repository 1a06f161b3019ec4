//! RecordList: ordered record storage with stable, generational refs.
//!
//! Records live in a `SlotMap` arena and are threaded onto a doubly-linked
//! list anchored at a head pointer. The arena key doubles as the stable
//! reference to a record: nothing moves a live record, and a key stops
//! resolving the moment its record is removed.

use core::borrow::Borrow;
use slotmap::{DefaultKey, SlotMap};

/// Stable reference to one record of a map.
///
/// A ref stays valid while its record is live, across growth of the slot
/// table and across removal of any other record. Once its own record is
/// removed the ref goes stale and resolves to `None` forever; generational
/// keys guarantee it never aliases a record inserted later, even when the
/// physical slot is reused. A ref is only meaningful with the map that
/// produced it (or that map's clones); used elsewhere it resolves to an
/// unrelated record or nothing, never to unsoundness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RecordRef(DefaultKey);

impl RecordRef {
    pub(crate) fn new(k: DefaultKey) -> Self {
        RecordRef(k)
    }
    pub(crate) fn raw(&self) -> DefaultKey {
        self.0
    }
}

#[derive(Clone, Debug)]
struct Record<K, V> {
    key: K,
    value: V,
    hash: u64,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

/// Storage for the live `(key, value)` pairs of a map.
///
/// New records are linked at the front, so traversal starts at the most
/// recently inserted record. Each record also carries the `u64` hash of its
/// key, computed once at insert; rehashing reads it back instead of calling
/// `K: Hash` again.
#[derive(Clone)]
pub(crate) struct RecordList<K, V> {
    arena: SlotMap<DefaultKey, Record<K, V>>, // storage using generational keys
    head: Option<DefaultKey>,
}

impl<K, V> RecordList<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            arena: SlotMap::with_key(),
            head: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Links a new record at the front of the list.
    pub(crate) fn push_front(&mut self, key: K, value: V, hash: u64) -> RecordRef {
        let old_head = self.head;
        let k = self.arena.insert(Record {
            key,
            value,
            hash,
            prev: None,
            next: old_head,
        });
        if let Some(h) = old_head {
            self.arena[h].prev = Some(k);
        }
        self.head = Some(k);
        RecordRef::new(k)
    }

    /// Unlinks and removes the referenced record, returning its pair.
    /// A stale ref returns `None` and leaves the list untouched.
    pub(crate) fn remove(&mut self, r: RecordRef) -> Option<(K, V)> {
        let rec = self.arena.remove(r.raw())?;
        match rec.prev {
            Some(p) => self.arena[p].next = rec.next,
            None => self.head = rec.next,
        }
        if let Some(n) = rec.next {
            self.arena[n].prev = rec.prev;
        }
        Some((rec.key, rec.value))
    }

    pub(crate) fn key(&self, r: RecordRef) -> Option<&K> {
        self.arena.get(r.raw()).map(|rec| &rec.key)
    }

    pub(crate) fn value(&self, r: RecordRef) -> Option<&V> {
        self.arena.get(r.raw()).map(|rec| &rec.value)
    }

    pub(crate) fn value_mut(&mut self, r: RecordRef) -> Option<&mut V> {
        self.arena.get_mut(r.raw()).map(|rec| &mut rec.value)
    }

    pub(crate) fn pair(&self, r: RecordRef) -> Option<(&K, &V)> {
        self.arena.get(r.raw()).map(|rec| (&rec.key, &rec.value))
    }

    /// Stored hash of the record's key.
    pub(crate) fn hash(&self, r: RecordRef) -> Option<u64> {
        self.arena.get(r.raw()).map(|rec| rec.hash)
    }

    /// Whether the record matches a probed hash and borrowed key, in that
    /// comparison order. A stale ref matches nothing.
    pub(crate) fn matches<Q>(&self, r: RecordRef, hash: u64, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        match self.arena.get(r.raw()) {
            Some(rec) => rec.hash == hash && rec.key.borrow() == q,
            None => false,
        }
    }

    /// Drops every record. Refs handed out before stop resolving; the
    /// arena keeps its allocation.
    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            cursor: self.head,
            arena: &self.arena,
        }
    }

    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            cursor: self.head,
            arena: &mut self.arena,
        }
    }
}

/// Iterator over `(&K, &V)` pairs, most recently inserted record first.
pub struct Iter<'a, K, V> {
    cursor: Option<DefaultKey>,
    arena: &'a SlotMap<DefaultKey, Record<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cursor?;
        let rec = &self.arena[k];
        self.cursor = rec.next;
        Some((&rec.key, &rec.value))
    }
}

/// Iterator over `(&K, &mut V)` pairs in the same order as [`Iter`]. Keys
/// stay immutable; mutating one would strand its slot-table position.
pub struct IterMut<'a, K, V> {
    cursor: Option<DefaultKey>,
    arena: &'a mut SlotMap<DefaultKey, Record<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cursor?;
        let rec = self.arena.get_mut(k)? as *mut Record<K, V>;
        // SAFETY: the cursor follows next-links through an acyclic chain,
        // so each record is visited at most once and no two yielded
        // references overlap; the arena stays exclusively borrowed for 'a.
        unsafe {
            self.cursor = (*rec).next;
            Some((&(*rec).key, &mut (*rec).value))
        }
    }
}
