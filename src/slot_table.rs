//! SlotTable: the open-addressing core. Robin Hood placement, early-exit
//! probing, backward-shift deletion, and doubling growth.
//!
//! Each occupied slot carries a probe sequence length (PSL): the circular
//! distance from the ideal index of the record's hash to the slot that
//! actually holds it. The Robin Hood discipline keeps PSLs balanced by
//! displacing occupants that sit closer to their ideal slot than the entry
//! being placed, which in turn lets probes stop early: once the distance
//! searched exceeds an occupant's PSL, the key cannot be further on.
//!
//! The table stores [`RecordRef`]s only; keys, values, and their hashes
//! live in the record list. Callers pass a match closure to probe and a
//! hash closure to grow, so `K: Hash` is never re-invoked here.

use crate::record_list::RecordRef;
use core::mem;

/// Occupied-slot payload. A `None` slot in the table is free.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct SlotEntry {
    pub(crate) psl: usize,
    pub(crate) record: RecordRef,
}

/// Power-of-two open-addressing table. Capacity is 0 until the first
/// placement, then doubles under load and never shrinks.
#[derive(Clone)]
pub(crate) struct SlotTable {
    slots: Vec<Option<SlotEntry>>,
}

impl SlotTable {
    /// Capacity allocated by the first growth.
    pub(crate) const INITIAL_CAPACITY: usize = 2;
    /// Growth triggers when occupancy would exceed `MAX_LOAD_NUM /
    /// MAX_LOAD_DEN` of capacity.
    pub(crate) const MAX_LOAD_NUM: usize = 4;
    pub(crate) const MAX_LOAD_DEN: usize = 5;

    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    /// Ideal index for a hash. Capacity must be non-zero.
    #[inline]
    fn ideal_index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask()
    }

    /// Next probe position, wrapping past the last slot.
    #[inline]
    fn probe_next(&self, index: usize) -> usize {
        (index + 1) & self.mask()
    }

    /// Whether placing one more entry on top of `occupied` would push the
    /// table past its load threshold. A zero-capacity table always must.
    pub(crate) fn must_grow(&self, occupied: usize) -> bool {
        let cap = self.slots.len();
        cap == 0 || (occupied + 1) * Self::MAX_LOAD_DEN > cap * Self::MAX_LOAD_NUM
    }

    /// Probes for a record accepted by `matches`, starting at the hash's
    /// ideal index. Returns the slot position and the record, or `None`
    /// once a free slot or an occupant with a smaller PSL than the
    /// distance searched proves the key absent.
    pub(crate) fn locate<F>(&self, hash: u64, matches: F) -> Option<(usize, RecordRef)>
    where
        F: Fn(RecordRef) -> bool,
    {
        if self.slots.is_empty() {
            return None;
        }
        let mut index = self.ideal_index(hash);
        let mut psl = 0;
        loop {
            let entry = self.slots[index]?;
            if psl > entry.psl {
                // The occupant sits closer to home than the searched key
                // would here; Robin Hood placement forbids a match beyond.
                return None;
            }
            if matches(entry.record) {
                return Some((index, entry.record));
            }
            psl += 1;
            index = self.probe_next(index);
        }
    }

    /// Places a record whose key hashes to `hash`. The caller guarantees
    /// the key is absent and the table has a free slot (see `must_grow`).
    ///
    /// Robin Hood rule: when the incoming entry has probed farther than
    /// the occupant it collides with, the two swap and the displaced
    /// occupant keeps probing with the distance it already accumulated.
    pub(crate) fn place(&mut self, hash: u64, record: RecordRef) {
        let mut index = self.ideal_index(hash);
        let mut candidate = SlotEntry { psl: 0, record };
        loop {
            match &mut self.slots[index] {
                free @ None => {
                    *free = Some(candidate);
                    return;
                }
                Some(occupant) => {
                    if candidate.psl > occupant.psl {
                        mem::swap(occupant, &mut candidate);
                    }
                }
            }
            candidate.psl += 1;
            index = self.probe_next(index);
        }
    }

    /// Frees the slot at `pos` and backward-shifts the chain behind it:
    /// each follower that is not already in its ideal slot moves one slot
    /// back with its PSL reduced by one, stopping at a free slot or a
    /// PSL-0 occupant. Returns the record the freed slot held.
    pub(crate) fn remove_at(&mut self, pos: usize) -> RecordRef {
        let entry = self.slots[pos]
            .take()
            .expect("remove_at requires an occupied slot");
        let mut pos = pos;
        loop {
            let next = self.probe_next(pos);
            match self.slots[next] {
                Some(follower) if follower.psl > 0 => {
                    self.slots[pos] = Some(SlotEntry {
                        psl: follower.psl - 1,
                        record: follower.record,
                    });
                    self.slots[next] = None;
                    pos = next;
                }
                _ => break,
            }
        }
        entry.record
    }

    /// Doubles the table (or allocates the initial capacity) and re-places
    /// every entry. `hash_of` reads a record's stored hash; the rehash is
    /// synchronous and complete before this returns.
    pub(crate) fn grow<F>(&mut self, hash_of: F)
    where
        F: Fn(RecordRef) -> u64,
    {
        let new_cap = if self.slots.is_empty() {
            Self::INITIAL_CAPACITY
        } else {
            self.slots.len() * 2
        };
        let old = mem::replace(&mut self.slots, vec![None; new_cap]);
        for entry in old.into_iter().flatten() {
            self.place(hash_of(entry.record), entry.record);
        }
    }

    /// Frees every slot. Capacity is left as-is.
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    #[cfg(test)]
    pub(crate) fn slots(&self) -> &[Option<SlotEntry>] {
        &self.slots
    }

    /// Test check for the Robin Hood layout: every occupied slot's PSL
    /// equals its circular distance from the ideal index of its hash, and
    /// PSL climbs by at most one between adjacent occupied slots.
    #[cfg(test)]
    pub(crate) fn assert_layout<F>(&self, hash_of: F)
    where
        F: Fn(RecordRef) -> u64,
    {
        let cap = self.slots.len();
        for (i, slot) in self.slots.iter().enumerate() {
            let entry = match slot {
                Some(e) => e,
                None => continue,
            };
            let ideal = (hash_of(entry.record) as usize) & (cap - 1);
            let distance = (i + cap - ideal) & (cap - 1);
            assert_eq!(
                entry.psl, distance,
                "slot {i}: psl must equal distance from ideal index {ideal}"
            );
            if let Some(next) = self.slots[(i + 1) & (cap - 1)] {
                assert!(
                    next.psl <= entry.psl + 1,
                    "slot {}: psl may climb by at most one (saw {} after {})",
                    (i + 1) & (cap - 1),
                    next.psl,
                    entry.psl
                );
            }
        }
    }
}
