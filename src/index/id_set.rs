//! Open-addressed hash set of byte keys, each owning a postings list.
//!
//! The set keeps three parallel tables:
//!
//! - `keys`: slot -> key bytes
//! - `postings`: slot -> ordered postings appended for that key
//! - `buckets`: open-addressed probe table, hash -> slot
//!
//! Slots are dense and start at 1; slot `0` is the "not found" sentinel and is
//! never handed out, which is why [`Slot`] wraps a `NonZeroU32`. Growth
//! (rehash) reallocates the probe table and reserves the slot tables in
//! lockstep. Postings are only reachable through `&self` borrows, so the
//! borrow checker rules out holding a postings view across an insertion that
//! might grow the set.
//!
//! # Examples
//!
//! ```
//! use glaive::index::id_set::IdSet;
//!
//! let mut set: IdSet<u64> = IdSet::new();
//! let first = set.insert(b"a", 1).unwrap();
//! assert!(first.is_new());
//! set.insert(b"b", 2).unwrap();
//! set.insert(b"a", 3).unwrap();
//!
//! let slot = set.lookup(b"a").unwrap();
//! assert_eq!(set.postings(slot), &[1, 3]);
//! assert!(set.lookup(b"c").is_none());
//! ```

use std::hash::BuildHasher;
use std::num::NonZeroU32;

use ahash::RandomState;
use log::trace;

use crate::error::{GlaiveError, Result};

/// Default number of probe buckets of a fresh set.
pub const DEFAULT_CAPACITY: usize = 8;

/// Default ratio of live keys to buckets that triggers a rehash.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Probe table marker for an unused bucket.
const EMPTY: u32 = 0;

/// Opaque handle of a key inside an [`IdSet`].
///
/// Handles are never zero. They stay valid for the lifetime of the set, but a
/// postings view obtained through a handle borrows the set and therefore
/// cannot outlive the next insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(NonZeroU32);

impl Slot {
    fn new(index: usize) -> Option<Self> {
        u32::try_from(index).ok().and_then(NonZeroU32::new).map(Slot)
    }

    /// Numeric value of this handle (always >= 1).
    pub fn get(self) -> u32 {
        self.0.get()
    }

    fn index(self) -> usize {
        self.0.get() as usize
    }
}

/// Outcome of [`IdSet::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    /// The key was new; a slot with a single-element postings list was created.
    New(Slot),
    /// The key existed; the posting was appended to its list.
    Existing(Slot),
}

impl Inserted {
    /// Slot of the key, whether new or existing.
    pub fn slot(self) -> Slot {
        match self {
            Inserted::New(slot) | Inserted::Existing(slot) => slot,
        }
    }

    /// Whether the insertion created the key.
    pub fn is_new(self) -> bool {
        matches!(self, Inserted::New(_))
    }
}

/// Hash set of byte keys with an ordered postings list per key.
///
/// `P` is the posting type: plain node ids for value indexes, `(id, position)`
/// pairs for the full-text index.
#[derive(Debug, Clone)]
pub struct IdSet<P = u64> {
    /// Slot -> key. Index 0 is the sentinel and stays empty.
    keys: Vec<Box<[u8]>>,
    /// Slot -> postings, appended in insertion order.
    postings: Vec<Vec<P>>,
    /// Probe table; each entry is a slot number or [`EMPTY`].
    buckets: Vec<u32>,
    /// Fixed seeds keep bucket placement reproducible across runs.
    hasher: RandomState,
    max_load_factor: f64,
    rehashes: usize,
}

impl<P: Copy> Default for IdSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Copy> IdSet<P> {
    /// Create an empty set with the default capacity and load factor.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR)
    }

    /// Create an empty set with `capacity` buckets (rounded up to a power of
    /// two) that grows once the load factor exceeds `max_load_factor`.
    pub fn with_capacity(capacity: usize, max_load_factor: f64) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        let max_load_factor = if max_load_factor > 0.0 && max_load_factor < 1.0 {
            max_load_factor
        } else {
            DEFAULT_LOAD_FACTOR
        };

        let mut keys = Vec::with_capacity(capacity);
        keys.push(Box::default());
        let mut postings = Vec::with_capacity(capacity);
        postings.push(Vec::new());

        IdSet {
            keys,
            postings,
            buckets: vec![EMPTY; capacity],
            hasher: RandomState::with_seeds(
                0x243f_6a88_85a3_08d3,
                0x1319_8a2e_0370_7344,
                0xa409_3822_299f_31d0,
                0x082e_fa98_ec4e_6c89,
            ),
            max_load_factor,
            rehashes: 0,
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.keys.len() - 1
    }

    /// Whether the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of probe buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// How many times the probe table has grown.
    pub fn rehashes(&self) -> usize {
        self.rehashes
    }

    /// Total number of postings across all keys.
    pub fn total_postings(&self) -> usize {
        self.postings.iter().map(Vec::len).sum()
    }

    /// Add `posting` under `key`.
    ///
    /// A new key gets a fresh slot holding a single-element postings list; an
    /// existing key has the posting appended. Single writer only: the `&mut`
    /// receiver keeps readers out while the set may grow. Fails only when the
    /// slot space (`u32`) is exhausted.
    pub fn insert(&mut self, key: &[u8], posting: P) -> Result<Inserted> {
        if let Some(slot) = self.lookup(key) {
            self.postings[slot.index()].push(posting);
            return Ok(Inserted::Existing(slot));
        }

        if (self.len() + 1) as f64 > self.buckets.len() as f64 * self.max_load_factor {
            self.rehash();
        }

        let index = self.keys.len();
        let slot = Slot::new(index).ok_or_else(|| {
            GlaiveError::internal(format!("id set slot space exhausted at {index} keys"))
        })?;
        self.keys.push(key.into());
        self.postings.push(vec![posting]);
        let bucket = self.free_bucket(key);
        self.buckets[bucket] = slot.get();
        Ok(Inserted::New(slot))
    }

    /// Find the slot of `key`. Never mutates.
    pub fn lookup(&self, key: &[u8]) -> Option<Slot> {
        let mask = self.buckets.len() - 1;
        let mut bucket = self.bucket_of(key);
        loop {
            match self.buckets[bucket] {
                EMPTY => return None,
                slot if *self.keys[slot as usize] == *key => return Slot::new(slot as usize),
                _ => bucket = (bucket + 1) & mask,
            }
        }
    }

    /// Postings of `slot`, in insertion order.
    pub fn postings(&self, slot: Slot) -> &[P] {
        self.postings.get(slot.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of postings of `slot`.
    pub fn count(&self, slot: Slot) -> usize {
        self.postings(slot).len()
    }

    /// Key bytes of `slot`.
    pub fn key(&self, slot: Slot) -> Option<&[u8]> {
        self.keys.get(slot.index()).map(|key| &key[..])
    }

    /// All live slots with their keys, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &[u8])> + '_ {
        self.keys
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(index, key)| Slot::new(index).map(|slot| (slot, &key[..])))
    }

    /// Check the structural invariants of the set.
    ///
    /// A failure means the set is corrupt and is reported as
    /// [`GlaiveError::Internal`].
    pub fn verify(&self) -> Result<()> {
        if self.keys.len() != self.postings.len() {
            return Err(GlaiveError::internal(format!(
                "key table has {} slots but postings table has {}",
                self.keys.len(),
                self.postings.len()
            )));
        }
        if !self.buckets.len().is_power_of_two() {
            return Err(GlaiveError::internal(format!(
                "probe table size {} is not a power of two",
                self.buckets.len()
            )));
        }
        let occupied = self.buckets.iter().filter(|&&b| b != EMPTY).count();
        if occupied != self.len() {
            return Err(GlaiveError::internal(format!(
                "probe table references {occupied} slots for {} keys",
                self.len()
            )));
        }
        for (slot, key) in self.iter() {
            if self.lookup(key) != Some(slot) {
                return Err(GlaiveError::internal(format!(
                    "slot {} is not reachable through its key",
                    slot.get()
                )));
            }
            if self.postings[slot.index()].is_empty() {
                return Err(GlaiveError::internal(format!(
                    "slot {} has an empty postings list",
                    slot.get()
                )));
            }
        }
        Ok(())
    }

    /// Double the probe table and re-place every live slot.
    ///
    /// Slot numbers and postings are untouched; only bucket placement
    /// changes, so no posting can be lost or duplicated.
    fn rehash(&mut self) {
        let capacity = self.buckets.len() * 2;
        trace!(
            "rehashing id set: {} keys, {} -> {} buckets",
            self.len(),
            self.buckets.len(),
            capacity
        );

        self.buckets = vec![EMPTY; capacity];
        let additional = capacity.saturating_sub(self.keys.len());
        self.keys.reserve(additional);
        self.postings.reserve(additional);

        for index in 1..self.keys.len() {
            let bucket = self.free_bucket(&self.keys[index]);
            self.buckets[bucket] = index as u32;
        }
        self.rehashes += 1;
    }

    fn bucket_of(&self, key: &[u8]) -> usize {
        (self.hasher.hash_one(key) as usize) & (self.buckets.len() - 1)
    }

    fn free_bucket(&self, key: &[u8]) -> usize {
        let mask = self.buckets.len() - 1;
        let mut bucket = self.bucket_of(key);
        while self.buckets[bucket] != EMPTY {
            bucket = (bucket + 1) & mask;
        }
        bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut set: IdSet<u64> = IdSet::new();

        let a = set.insert(b"a", 1).unwrap();
        let b = set.insert(b"b", 2).unwrap();
        let again = set.insert(b"a", 3).unwrap();

        assert!(a.is_new());
        assert!(b.is_new());
        assert_eq!(again, Inserted::Existing(a.slot()));
        assert_eq!(set.len(), 2);
        assert_eq!(set.postings(a.slot()), &[1, 3]);
        assert_eq!(set.count(b.slot()), 1);
        assert_eq!(set.key(b.slot()), Some(&b"b"[..]));
        assert_eq!(set.lookup(b"c"), None);
    }

    #[test]
    fn test_slots_are_never_zero() {
        let mut set: IdSet<u64> = IdSet::new();
        let slot = set.insert(b"", 0).unwrap().slot();
        assert_eq!(slot.get(), 1);
        assert_eq!(set.lookup(b""), Some(slot));
    }

    #[test]
    fn test_rehash_preserves_postings() {
        let mut set: IdSet<u64> = IdSet::with_capacity(4, 0.75);
        for i in 0..200u64 {
            set.insert(format!("key{}", i % 50).as_bytes(), i).unwrap();
        }

        assert!(set.rehashes() >= 2);
        assert_eq!(set.len(), 50);
        assert_eq!(set.total_postings(), 200);
        for k in 0..50u64 {
            let slot = set.lookup(format!("key{k}").as_bytes()).unwrap();
            assert_eq!(set.postings(slot), &[k, k + 50, k + 100, k + 150]);
        }
        set.verify().unwrap();
    }

    #[test]
    fn test_slots_stable_across_rehash() {
        let mut set: IdSet<u64> = IdSet::with_capacity(2, 0.5);
        let first = set.insert(b"first", 7).unwrap().slot();
        for i in 0..64u64 {
            set.insert(&i.to_le_bytes(), i).unwrap();
        }
        assert_eq!(set.lookup(b"first"), Some(first));
        assert_eq!(set.postings(first), &[7]);
    }

    #[test]
    fn test_capacity_rounding_and_bad_load_factor() {
        let set: IdSet<u64> = IdSet::with_capacity(5, 3.0);
        assert_eq!(set.capacity(), 8);
        assert!(set.is_empty());
        set.verify().unwrap();
    }

    #[test]
    fn test_iter_lists_all_keys() {
        let mut set: IdSet<u64> = IdSet::new();
        set.insert(b"x", 1).unwrap();
        set.insert(b"y", 2).unwrap();
        let keys: Vec<_> = set.iter().map(|(_, key)| key.to_vec()).collect();
        assert_eq!(keys, vec![b"x".to_vec(), b"y".to_vec()]);
    }
}
