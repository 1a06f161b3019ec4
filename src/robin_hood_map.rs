//! RobinHoodMap: the public map tying the slot table to the record list.

use crate::record_list::{Iter, IterMut, RecordList, RecordRef};
use crate::slot_table::SlotTable;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Absent-key error returned by [`RobinHoodMap::at`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeyNotFound;

impl fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no such key in the map")
    }
}

impl std::error::Error for KeyNotFound {}

/// Hash map with unique keys, Robin Hood open addressing, and records
/// that never move.
///
/// The slot table holds [`RecordRef`]s plus probe distances; keys and
/// values live in a record list ordered most-recently-inserted first.
/// Splitting the two keeps every ref stable across growth and across
/// removal of other keys, and makes iteration order independent of the
/// hash function.
///
/// Capacity starts at 0, jumps to 2 on the first insert, and doubles
/// whenever an insert would push occupancy over 4/5. Each record stores
/// the `u64` hash computed at insert; rehashing reads stored hashes and
/// never re-invokes `K: Hash`.
#[derive(Clone)]
pub struct RobinHoodMap<K, V, S = RandomState> {
    hasher: S,
    table: SlotTable,
    records: RecordList<K, V>,
}

impl<K, V> RobinHoodMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for RobinHoodMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl RecordRef {
    /// Borrows the key of the record this ref points at, while it lives.
    pub fn key<'a, K, V, S>(&self, map: &'a RobinHoodMap<K, V, S>) -> Option<&'a K> {
        map.records.key(*self)
    }

    pub fn value<'a, K, V, S>(&self, map: &'a RobinHoodMap<K, V, S>) -> Option<&'a V> {
        map.records.value(*self)
    }

    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut RobinHoodMap<K, V, S>) -> Option<&'a mut V> {
        map.records.value_mut(*self)
    }
}

impl<K, V, S> RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            table: SlotTable::new(),
            records: RecordList::new(),
        }
    }

    /// Builds a map over `pairs` with the given hasher. Pairs are
    /// inserted in order; a pair whose key is already present is dropped.
    pub fn from_iter_with_hasher<I>(pairs: I, hasher: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_hasher(hasher);
        map.extend(pairs);
        map
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Slot-table capacity: 0 before the first insert, afterwards a
    /// power of two that never shrinks.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    fn probe<Q>(&self, hash: u64, q: &Q) -> Option<(usize, RecordRef)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let records = &self.records;
        self.table.locate(hash, |r| records.matches(r, hash, q))
    }

    fn grow_if_needed(&mut self) {
        if self.table.must_grow(self.records.len()) {
            let records = &self.records;
            self.table
                .grow(|r| records.hash(r).expect("slot table refers to a live record"));
        }
    }

    /// Inserts `key → value`. A key that is already present keeps its
    /// stored value and the incoming pair is dropped; nothing reports
    /// which of the two happened.
    pub fn insert(&mut self, key: K, value: V) {
        let hash = self.make_hash(&key);
        if self.probe(hash, &key).is_some() {
            return;
        }
        self.grow_if_needed();
        let record = self.records.push_front(key, value, hash);
        self.table.place(hash, record);
    }

    /// Removes `key` if present; absent keys are ignored. The slot is
    /// freed and its probe chain shifted back before the record is
    /// dropped, so drop code for `K`/`V` observes a consistent map.
    pub fn remove<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let Some((pos, _)) = self.probe(hash, key) else {
            return;
        };
        let record = self.table.remove_at(pos);
        self.records.remove(record);
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        self.probe(hash, key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let (_, record) = self.probe(hash, key)?;
        self.records.value(record)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let (_, record) = self.probe(hash, key)?;
        self.records.value_mut(record)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let (_, record) = self.probe(hash, key)?;
        self.records.pair(record)
    }

    /// Stable ref to the record holding `key`, or `None` when absent.
    /// The ref survives growth and mutation of any other record and
    /// resolves through [`RecordRef::key`], [`RecordRef::value`] and
    /// [`RecordRef::value_mut`].
    pub fn find<Q>(&self, key: &Q) -> Option<RecordRef>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        self.probe(hash, key).map(|(_, record)| record)
    }

    /// Checked access: the value for `key`, or [`KeyNotFound`].
    pub fn at<Q>(&self, key: &Q) -> Result<&V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).ok_or(KeyNotFound)
    }

    /// Index-operator semantics: a mutable reference to `key`'s value,
    /// inserting `default()` first when the key is absent. The closure
    /// runs only on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let hash = self.make_hash(&key);
        if let Some((_, record)) = self.probe(hash, &key) {
            return self
                .records
                .value_mut(record)
                .expect("probe returned a live record");
        }
        self.grow_if_needed();
        let record = self.records.push_front(key, default(), hash);
        self.table.place(hash, record);
        self.records
            .value_mut(record)
            .expect("record exists immediately after insert")
    }

    /// [`get_or_insert_with`](Self::get_or_insert_with) over `V::default()`.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Removes every record. Capacity is preserved, so a cleared map
    /// refills without growing; refs handed out before go stale.
    pub fn clear(&mut self) {
        self.records.clear();
        self.table.clear();
    }

    /// Iterates `(&K, &V)`, most recently inserted first. Order is
    /// unaffected by growth and by removal of other keys.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.records.iter()
    }

    /// Like [`iter`](Self::iter) with mutable values; keys stay immutable.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.records.iter_mut()
    }

    /// Test check: every table entry resolves to a live record whose
    /// stored hash places it where it sits, within load bounds.
    #[cfg(test)]
    pub(crate) fn assert_probe_layout(&self) {
        let cap = self.table.capacity();
        if cap == 0 {
            assert_eq!(self.records.len(), 0);
            return;
        }
        assert!(
            Self::load_ok(self.records.len(), cap),
            "load invariant violated: {} records in {} slots",
            self.records.len(),
            cap
        );
        let records = &self.records;
        self.table
            .assert_layout(|r| records.hash(r).expect("slot table refers to a live record"));
    }

    #[cfg(test)]
    pub(crate) fn load_ok(len: usize, cap: usize) -> bool {
        cap.is_power_of_two() && len * SlotTable::MAX_LOAD_DEN <= cap * SlotTable::MAX_LOAD_NUM
    }
}

impl<K, V, S> fmt::Debug for RobinHoodMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, pairs: I) {
        for (k, v) in pairs {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        Self::from_iter_with_hasher(pairs, S::default())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for RobinHoodMap<K, V>
where
    K: Eq + Hash,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_iter(pairs)
    }
}

impl<'a, K, V, S> IntoIterator for &'a RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
