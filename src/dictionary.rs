//! Dictionary: separately chained hash table over an index arena.
//!
//! Entries live in one contiguous `Vec` of slots addressed by index. Each
//! bucket holds the index of the head of its collision chain, chains are
//! threaded through the slots' `next` links, and removed slots are threaded
//! onto a free list through the same field so they are reused before the
//! table grows.

use alloc::vec;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::mem;
use core::num::NonZeroU32;
use core::ops::Index;

use crate::comparer::{DefaultComparer, KeyComparer};
use crate::cursor::{Cursor, Pairs};
use crate::error::{DictError, Result};
use crate::iter::{Drain, IntoIter, Iter, IterMut, ValuesMut};
use crate::primes;
use crate::views::{copy_into, KeyView, ValueView};

const HASH_MASK: u64 = 0x7FFF_FFFF;

#[cold]
#[inline(never)]
fn corrupt_chain() -> ! {
    panic!("free slot linked into a bucket chain");
}

/// Index of a slot, or none. Stored as `index + 1` so that `None` fits
/// the niche and a link stays four bytes wide.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Link(Option<NonZeroU32>);

impl Link {
    pub(crate) const NONE: Link = Link(None);

    fn to(index: usize) -> Self {
        debug_assert!(index < primes::MAX_PRIME_ARRAY_LENGTH);
        Link(NonZeroU32::new(index as u32 + 1))
    }

    fn get(self) -> Option<usize> {
        self.0.map(|n| n.get() as usize - 1)
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Slot<K, V> {
    Live {
        hash: u32,
        next: Link,
        key: K,
        value: V,
    },
    Free {
        next: Link,
    },
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub(crate) fn live(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Live { key, value, .. } => Some((key, value)),
            Slot::Free { .. } => None,
        }
    }

    #[inline]
    pub(crate) fn live_mut(&mut self) -> Option<(&K, &mut V)> {
        match self {
            Slot::Live { key, value, .. } => Some((key, value)),
            Slot::Free { .. } => None,
        }
    }

    #[inline]
    pub(crate) fn into_live(self) -> Option<(K, V)> {
        match self {
            Slot::Live { key, value, .. } => Some((key, value)),
            Slot::Free { .. } => None,
        }
    }

    fn next(&self) -> Link {
        match self {
            Slot::Live { next, .. } | Slot::Free { next } => *next,
        }
    }

    fn set_next(&mut self, link: Link) {
        match self {
            Slot::Live { next, .. } | Slot::Free { next } => *next = link,
        }
    }
}

/// A hash map with prime-sized buckets, separate chaining and slot-order
/// enumeration.
///
/// Iteration visits entries in the order of the slots they occupy. That is
/// insertion order until the first removal; afterwards new entries reuse
/// freed slots and appear where the removed entries were.
///
/// # Examples
///
/// ```
/// use prime_dict::Dictionary;
///
/// let mut d = Dictionary::new();
/// d.try_insert("a", 1).unwrap();
/// d.try_insert("b", 2).unwrap();
/// d.insert("a", 3);
///
/// assert_eq!(d.get("a"), Some(&3));
/// assert_eq!(d.len(), 2);
/// assert!(d.contains_key("b"));
/// ```
#[derive(Clone)]
pub struct Dictionary<K, V, S = DefaultComparer> {
    buckets: Vec<Link>,
    entries: Vec<Slot<K, V>>,
    free_list: Link,
    free_count: usize,
    version: u64,
    comparer: S,
}

impl<K, V> Dictionary<K, V, DefaultComparer> {
    /// Creates an empty dictionary. Nothing is allocated until the first
    /// insertion.
    pub fn new() -> Self {
        Self::with_comparer(DefaultComparer::default())
    }

    /// Creates a dictionary able to hold at least `capacity` entries before
    /// growing.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`primes::MAX_PRIME_ARRAY_LENGTH`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparer(capacity, DefaultComparer::default())
    }

    /// Fallible form of [`with_capacity`](Self::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Self::try_with_capacity_and_comparer(capacity, DefaultComparer::default())
    }
}

impl<K, V> Default for Dictionary<K, V, DefaultComparer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Dictionary<K, V, S> {
    /// Creates an empty dictionary that hashes and compares keys with
    /// `comparer`.
    pub const fn with_comparer(comparer: S) -> Self {
        Self {
            buckets: Vec::new(),
            entries: Vec::new(),
            free_list: Link::NONE,
            free_count: 0,
            version: 0,
            comparer,
        }
    }

    /// Creates a dictionary with room for `capacity` entries that uses
    /// `comparer`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`primes::MAX_PRIME_ARRAY_LENGTH`].
    pub fn with_capacity_and_comparer(capacity: usize, comparer: S) -> Self {
        Self::try_with_capacity_and_comparer(capacity, comparer).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible form of
    /// [`with_capacity_and_comparer`](Self::with_capacity_and_comparer).
    pub fn try_with_capacity_and_comparer(capacity: usize, comparer: S) -> Result<Self> {
        if capacity > primes::MAX_PRIME_ARRAY_LENGTH {
            return Err(DictError::invalid_argument(alloc::format!(
                "capacity {capacity} exceeds the maximum table size {}",
                primes::MAX_PRIME_ARRAY_LENGTH
            )));
        }
        let mut d = Self::with_comparer(comparer);
        if capacity > 0 {
            d.initialize(capacity);
        }
        Ok(d)
    }

    fn initialize(&mut self, capacity: usize) {
        let size = primes::next_size(capacity);
        log::debug!("allocating dictionary with {} buckets", size);
        self.buckets = vec![Link::NONE; size];
        self.entries = Vec::with_capacity(size);
        self.free_list = Link::NONE;
        self.free_count = 0;
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len() - self.free_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current table size: the number of buckets, zero before the first
    /// allocation. The table grows when this many slots have been handed out
    /// and none is free.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Mutation counter. Changes on every insert, overwrite, removal and
    /// clear, and whenever mutable access to values is handed out; never on
    /// reads.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn comparer(&self) -> &S {
        &self.comparer
    }

    pub(crate) fn slots(&self) -> &[Slot<K, V>] {
        &self.entries
    }

    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Removes every entry. The allocations are kept, so refilling to the
    /// same size does not reallocate.
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        log::trace!("clearing dictionary of {} entries", self.len());
        self.buckets.fill(Link::NONE);
        self.entries.clear();
        self.free_list = Link::NONE;
        self.free_count = 0;
        self.bump_version();
    }

    /// Removes every entry and yields the removed pairs in slot order.
    ///
    /// The dictionary is empty as soon as this returns, even if the
    /// iterator is dropped early.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        let len = self.len();
        if !self.entries.is_empty() {
            self.buckets.fill(Link::NONE);
            self.free_list = Link::NONE;
            self.free_count = 0;
            self.bump_version();
        }
        Drain::new(self.entries.drain(..), len)
    }

    /// Whether some entry holds `value`. Linear in the number of slots.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, v)| v == value)
    }

    /// Clones every pair into `dest` starting at `index`, in slot order.
    ///
    /// Fails with [`DictError::InvalidArgument`] if `index` is past the end
    /// of `dest` or fewer than [`len`](Self::len) positions follow it.
    pub fn copy_to(&self, dest: &mut [(K, V)], index: usize) -> Result<()>
    where
        K: Clone,
        V: Clone,
    {
        copy_into(
            dest,
            index,
            self.len(),
            self.iter().map(|(k, v)| (k.clone(), v.clone())),
        )
    }

    /// Iterates over `(&K, &V)` in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.entries, self.len())
    }

    /// Iterates over `(&K, &mut V)` in slot order. Counts as a mutation:
    /// outstanding cursors are invalidated.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.bump_version();
        let len = self.len();
        IterMut::new(&mut self.entries, len)
    }

    /// Read-only view of the keys.
    pub fn keys(&self) -> KeyView<'_, K, V, S> {
        KeyView::new(self)
    }

    /// Read-only view of the values.
    pub fn values(&self) -> ValueView<'_, K, V, S> {
        ValueView::new(self)
    }

    /// Mutable values in slot order; invalidates outstanding cursors.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    /// Detached cursor over `(&K, &V)`, valid until the next mutation.
    ///
    /// ```
    /// use prime_dict::{DictError, Dictionary};
    ///
    /// let mut d = Dictionary::new();
    /// d.insert(1, "one");
    /// d.insert(2, "two");
    ///
    /// let mut cursor = d.cursor();
    /// assert_eq!(cursor.advance(&d), Ok(true));
    /// assert_eq!(cursor.current(&d), Ok((&1, &"one")));
    ///
    /// d.insert(3, "three");
    /// assert_eq!(cursor.advance(&d), Err(DictError::InvalidatedIterator));
    /// ```
    pub fn cursor(&self) -> Cursor<Pairs> {
        Cursor::new(self.version)
    }

    // Pops the free list or appends, growing first when every slot is in
    // use. Returns the slot index and the bucket for `hash` under the
    // (possibly new) table size.
    fn acquire_slot(&mut self, hash: u32) -> (Option<usize>, usize) {
        if let Some(free) = self.free_list.get() {
            self.free_list = self.entries[free].next();
            self.free_count -= 1;
            return (Some(free), hash as usize % self.buckets.len());
        }
        if self.entries.len() == self.buckets.len() {
            self.resize();
        }
        (None, hash as usize % self.buckets.len())
    }

    fn resize(&mut self) {
        let count = self.entries.len();
        let new_size = primes::expand(count);
        assert!(new_size > count, "dictionary capacity overflow");
        log::debug!(
            "growing dictionary from {} to {} buckets",
            self.buckets.len(),
            new_size
        );

        let mut buckets = vec![Link::NONE; new_size];
        let mut entries = Vec::with_capacity(new_size);
        entries.append(&mut self.entries);

        // Only live slots are rethreaded; free slots keep their links.
        for (i, slot) in entries.iter_mut().enumerate() {
            if let Slot::Live { hash, next, .. } = slot {
                let bucket = *hash as usize % new_size;
                *next = buckets[bucket];
                buckets[bucket] = Link::to(i);
            }
        }

        self.buckets = buckets;
        self.entries = entries;
    }

    pub(crate) fn allocate(&mut self, hash_size: usize) {
        self.initialize(hash_size);
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

impl<K, V, S> Dictionary<K, V, S> {
    fn hash_of<Q>(&self, q: &Q) -> u32
    where
        Q: ?Sized,
        S: KeyComparer<Q>,
    {
        (self.comparer.hash_key(q) & HASH_MASK) as u32
    }

    // Walks the chain for `hash` and returns the slot holding `q`.
    fn locate<Q>(&self, hash: u32, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
    {
        if self.buckets.is_empty() {
            return None;
        }
        let mut link = self.buckets[hash as usize % self.buckets.len()];
        while let Some(i) = link.get() {
            match &self.entries[i] {
                Slot::Live {
                    hash: h, next, key, ..
                } => {
                    if *h == hash && self.comparer.keys_equal(key.borrow(), q) {
                        return Some(i);
                    }
                    link = *next;
                }
                Slot::Free { .. } => corrupt_chain(),
            }
        }
        None
    }

    fn find_index<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
    {
        if self.buckets.is_empty() {
            return None;
        }
        self.locate(self.hash_of(q), q)
    }

    /// Returns the value stored for `q`, if any.
    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
    {
        self.get_key_value(q).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
    {
        let i = self.find_index(q)?;
        self.entries[i].live()
    }

    /// Mutable access to the value for `q`. A hit counts as a mutation and
    /// invalidates outstanding cursors; a miss changes nothing.
    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
    {
        let i = self.find_index(q)?;
        self.bump_version();
        self.entries[i].live_mut().map(|(_, v)| v)
    }

    /// Indexed access: like [`get`](Self::get), but a missing key is an
    /// error.
    pub fn lookup<Q>(&self, q: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
    {
        self.get(q).ok_or(DictError::KeyNotFound)
    }

    /// Clone of the value for `q`, or `V::default()` when absent.
    pub fn get_or_default<Q>(&self, q: &Q) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
        V: Clone + Default,
    {
        self.get(q).cloned().unwrap_or_default()
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
    {
        self.find_index(q).is_some()
    }

    /// Whether `q` is present and maps to `value`.
    pub fn contains_pair<Q>(&self, q: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
        V: PartialEq,
    {
        self.get(q).is_some_and(|v| v == value)
    }

    /// Removes the entry for `q`, returning whether one was present.
    pub fn remove<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
    {
        self.remove_entry(q).is_some()
    }

    /// Removes the entry for `q` and returns the stored pair.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
    {
        if self.buckets.is_empty() {
            return None;
        }
        let hash = self.hash_of(q);
        let bucket = hash as usize % self.buckets.len();
        let mut last: Option<usize> = None;
        let mut link = self.buckets[bucket];
        while let Some(i) = link.get() {
            let (found, next) = match &self.entries[i] {
                Slot::Live {
                    hash: h, next, key, ..
                } => (*h == hash && self.comparer.keys_equal(key.borrow(), q), *next),
                Slot::Free { .. } => corrupt_chain(),
            };
            if found {
                match last {
                    None => self.buckets[bucket] = next,
                    Some(prev) => self.entries[prev].set_next(next),
                }
                let removed = mem::replace(
                    &mut self.entries[i],
                    Slot::Free {
                        next: self.free_list,
                    },
                );
                self.free_list = Link::to(i);
                self.free_count += 1;
                self.bump_version();
                return removed.into_live();
            }
            last = Some(i);
            link = next;
        }
        None
    }

    /// Removes `q` only if it maps to `value`.
    pub fn remove_pair<Q>(&mut self, q: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
        V: PartialEq,
    {
        self.contains_pair(q, value) && self.remove(q)
    }
}

impl<K, V, S> Dictionary<K, V, S>
where
    S: KeyComparer<K>,
{
    /// Builds a dictionary from `pairs`, failing on the first duplicate key.
    pub fn from_pairs<I>(pairs: I, comparer: S) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let pairs = pairs.into_iter();
        let mut d = Self::try_with_capacity_and_comparer(pairs.size_hint().0, comparer)?;
        for (k, v) in pairs {
            d.try_insert(k, v)?;
        }
        Ok(d)
    }

    /// Inserts `key` only if it is absent.
    ///
    /// Fails with [`DictError::DuplicateKey`] if the key is present; the
    /// stored value is then left untouched.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<()> {
        self.insert_entry(key, value, true).map(|_| ())
    }

    /// Inserts or overwrites, returning the previous value for `key`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        // Only insert-if-absent can fail.
        self.insert_entry(key, value, false).ok().flatten()
    }

    fn insert_entry(&mut self, key: K, value: V, fail_on_existing: bool) -> Result<Option<V>> {
        if self.buckets.is_empty() {
            self.initialize(0);
        }
        let hash = self.hash_of(&key);

        if let Some(i) = self.locate(hash, &key) {
            if fail_on_existing {
                return Err(DictError::DuplicateKey);
            }
            let previous = match &mut self.entries[i] {
                Slot::Live { value: v, .. } => mem::replace(v, value),
                Slot::Free { .. } => corrupt_chain(),
            };
            self.bump_version();
            return Ok(Some(previous));
        }

        let (reused, bucket) = self.acquire_slot(hash);
        let slot = Slot::Live {
            hash,
            next: self.buckets[bucket],
            key,
            value,
        };
        let index = match reused {
            Some(free) => {
                self.entries[free] = slot;
                free
            }
            None => {
                self.entries.push(slot);
                self.entries.len() - 1
            }
        };
        self.buckets[bucket] = Link::to(index);
        self.bump_version();
        Ok(None)
    }
}

impl<K, V, S> fmt::Debug for Dictionary<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, Q, V, S> Index<&Q> for Dictionary<K, V, S>
where
    K: Borrow<Q>,
    Q: ?Sized,
    S: KeyComparer<Q>,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present; see [`Dictionary::lookup`] for the
    /// fallible form.
    fn index(&self, key: &Q) -> &V {
        match self.lookup(key) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for Dictionary<K, V, S>
where
    S: KeyComparer<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut d = Self::with_comparer(S::default());
        d.extend(iter);
        d
    }
}

impl<K, V, S> Extend<(K, V)> for Dictionary<K, V, S>
where
    S: KeyComparer<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a Dictionary<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut Dictionary<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for Dictionary<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let len = self.len();
        IntoIter::new(self.entries.into_iter(), len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use core::hash::{BuildHasher, Hasher};
    use std::collections::BTreeSet;

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        } // every key lands in the same chain
    }

    // Case-insensitive ASCII comparer for String keys with &str lookups.
    struct IgnoreCase;
    impl KeyComparer<str> for IgnoreCase {
        fn hash_key(&self, key: &str) -> u64 {
            let mut h = std::collections::hash_map::DefaultHasher::new();
            for b in key.bytes() {
                h.write_u8(b.to_ascii_lowercase());
            }
            h.finish()
        }
        fn keys_equal(&self, a: &str, b: &str) -> bool {
            a.eq_ignore_ascii_case(b)
        }
    }
    impl KeyComparer<String> for IgnoreCase {
        fn hash_key(&self, key: &String) -> u64 {
            KeyComparer::<str>::hash_key(self, key)
        }
        fn keys_equal(&self, a: &String, b: &String) -> bool {
            a.eq_ignore_ascii_case(b)
        }
    }

    // Walks every chain and the free list, checking that each slot below
    // the high-water mark is reached exactly once.
    fn assert_consistent<K, V, S>(d: &Dictionary<K, V, S>) {
        let mut seen = vec![false; d.entries.len()];
        for (b, head) in d.buckets.iter().enumerate() {
            let mut link = *head;
            while let Some(i) = link.get() {
                assert!(!seen[i], "slot {i} reached twice");
                seen[i] = true;
                match &d.entries[i] {
                    Slot::Live { hash, next, .. } => {
                        assert_eq!(*hash as usize % d.buckets.len(), b);
                        link = *next;
                    }
                    Slot::Free { .. } => panic!("free slot {i} in chain {b}"),
                }
            }
        }
        let mut free = 0;
        let mut link = d.free_list;
        while let Some(i) = link.get() {
            assert!(!seen[i], "slot {i} reached twice");
            seen[i] = true;
            assert!(matches!(d.entries[i], Slot::Free { .. }));
            link = d.entries[i].next();
            free += 1;
        }
        assert_eq!(free, d.free_count);
        assert!(seen.iter().all(|&s| s), "unreachable slot");
        assert_eq!(d.len(), d.entries.len() - d.free_count);
    }

    #[test]
    fn link_round_trips_and_fits_four_bytes() {
        assert_eq!(mem::size_of::<Link>(), 4);
        assert_eq!(Link::to(0).get(), Some(0));
        assert_eq!(Link::to(41).get(), Some(41));
        assert_eq!(Link::NONE.get(), None);
    }

    #[test]
    fn new_table_allocates_nothing() {
        let d: Dictionary<String, i32> = Dictionary::new();
        assert_eq!(d.capacity(), 0);
        assert_eq!(d.len(), 0);
        assert_eq!(d.version(), 0);
        assert!(d.get("x").is_none());
    }

    #[test]
    fn first_insert_allocates_min_prime() {
        let mut d = Dictionary::new();
        d.insert(1, 1);
        assert_eq!(d.capacity(), primes::MIN_PRIME);
    }

    #[test]
    fn capacity_hint_rounds_to_prime() {
        let d: Dictionary<u32, u32> = Dictionary::with_capacity(8);
        assert_eq!(d.capacity(), 11);
        let d: Dictionary<u32, u32> = Dictionary::with_capacity(0);
        assert_eq!(d.capacity(), 0);
    }

    #[test]
    fn oversized_capacity_hint_is_invalid_argument() {
        let r: Result<Dictionary<u32, u32>> =
            Dictionary::try_with_capacity(primes::MAX_PRIME_ARRAY_LENGTH + 1);
        assert!(matches!(r, Err(DictError::InvalidArgument { .. })));
    }

    #[test]
    fn upsert_overwrites_and_returns_previous() {
        let mut d = Dictionary::new();
        d.try_insert("a", 1).unwrap();
        d.try_insert("b", 2).unwrap();
        assert_eq!(d.insert("a", 3), Some(1));
        assert_eq!(d.get("a"), Some(&3));
        assert_eq!(d.len(), 2);
        assert!(d.contains_key("b"));
        assert_consistent(&d);
    }

    #[test]
    fn duplicate_insert_rejected_without_side_effects() {
        let mut d = Dictionary::new();
        d.try_insert("dup".to_string(), 1).unwrap();
        let v = d.version();
        assert_eq!(d.try_insert("dup".to_string(), 2), Err(DictError::DuplicateKey));
        assert_eq!(d.get("dup"), Some(&1));
        assert_eq!(d.len(), 1);
        assert_eq!(d.version(), v);
    }

    #[test]
    fn remove_absent_key_on_empty_table() {
        let mut d: Dictionary<&str, i32> = Dictionary::new();
        assert!(!d.remove("z"));
        assert_eq!(d.len(), 0);
        assert_eq!(d.version(), 0);
    }

    #[test]
    fn remove_present_key() {
        let mut d = Dictionary::new();
        d.insert("a".to_string(), 1);
        d.insert("b".to_string(), 2);
        let v = d.version();
        assert!(!d.remove("c"));
        assert_eq!(d.version(), v);
        assert_eq!(d.remove_entry("a"), Some(("a".to_string(), 1)));
        assert!(!d.contains_key("a"));
        assert_eq!(d.get("b"), Some(&2));
        assert_eq!(d.len(), 1);
        assert_ne!(d.version(), v);
        assert_consistent(&d);
    }

    #[test]
    fn freed_slot_is_reused_in_place() {
        let mut d = Dictionary::new();
        d.insert('a', 1);
        d.insert('b', 2);
        d.insert('c', 3);
        d.remove(&'a');
        d.insert('d', 4);
        let order: Vec<char> = d.iter().map(|(k, _)| *k).collect();
        assert_eq!(order, ['d', 'b', 'c']);
        assert_eq!(d.capacity(), 3);
        assert_consistent(&d);
    }

    #[test]
    fn grows_from_three_to_seven() {
        let mut d = Dictionary::with_capacity(3);
        assert_eq!(d.capacity(), 3);
        for i in 0..3 {
            d.insert(i, i * 10);
        }
        assert_eq!(d.capacity(), 3);
        d.insert(3, 30);
        assert_eq!(d.capacity(), 7);
        for i in 0..4 {
            assert_eq!(d.get(&i), Some(&(i * 10)));
        }
        assert_consistent(&d);
    }

    #[test]
    fn growth_preserves_slot_order() {
        let mut d = Dictionary::new();
        for i in 0..100 {
            d.insert(i, ());
        }
        let keys: Vec<i32> = d.keys().iter().copied().collect();
        assert_eq!(keys, (0..100).collect::<Vec<_>>());
        assert_consistent(&d);
    }

    #[test]
    fn clear_keeps_allocation_and_bumps_version_once() {
        let mut d = Dictionary::new();
        for i in 0..20 {
            d.insert(i, i);
        }
        let cap = d.capacity();
        let v = d.version();
        d.clear();
        assert_eq!(d.len(), 0);
        assert_eq!(d.capacity(), cap);
        assert_eq!(d.version(), v + 1);
        d.clear();
        assert_eq!(d.version(), v + 1);
        for i in 0..20 {
            assert!(!d.contains_key(&i));
        }
        assert_consistent(&d);
    }

    #[test]
    fn clear_then_refill_matches_fresh_table() {
        let mut reused = Dictionary::with_capacity(5);
        for i in 0..40 {
            reused.insert(i, i);
        }
        reused.clear();
        let mut fresh = Dictionary::with_capacity(5);
        for i in 100..130 {
            reused.insert(i, -i);
            fresh.insert(i, -i);
        }
        let a: BTreeSet<(i32, i32)> = reused.iter().map(|(k, v)| (*k, *v)).collect();
        let b: BTreeSet<(i32, i32)> = fresh.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn collisions_resolve_by_equality() {
        let mut d: Dictionary<String, i32, ConstBuildHasher> =
            Dictionary::with_comparer(ConstBuildHasher);
        for (i, k) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            d.try_insert(k.to_string(), i as i32).unwrap();
        }
        assert!(d.remove("c"));
        assert!(d.remove("a"));
        assert_eq!(d.get("b"), Some(&1));
        assert_eq!(d.get("d"), Some(&3));
        assert_eq!(d.get("e"), Some(&4));
        assert!(d.get("a").is_none());
        d.insert("f".to_string(), 5);
        assert_eq!(d.get("f"), Some(&5));
        assert_consistent(&d);
    }

    #[test]
    fn custom_comparer_folds_case() {
        let mut d: Dictionary<String, i32, IgnoreCase> = Dictionary::with_comparer(IgnoreCase);
        d.try_insert("Hello".to_string(), 1).unwrap();
        assert_eq!(d.get("HELLO"), Some(&1));
        assert_eq!(
            d.try_insert("hello".to_string(), 2),
            Err(DictError::DuplicateKey)
        );
        assert!(d.remove("hElLo"));
        assert!(d.is_empty());
    }

    #[test]
    fn contains_value_scans_live_slots_only() {
        let mut d = Dictionary::new();
        d.insert(1, "x");
        d.insert(2, "y");
        d.remove(&1);
        assert!(!d.contains_value(&"x"));
        assert!(d.contains_value(&"y"));
    }

    #[test]
    fn pair_membership_and_removal() {
        let mut d = Dictionary::new();
        d.insert("k", 1);
        assert!(d.contains_pair("k", &1));
        assert!(!d.contains_pair("k", &2));
        assert!(!d.remove_pair("k", &2));
        assert!(d.contains_key("k"));
        assert!(d.remove_pair("k", &1));
        assert!(d.is_empty());
    }

    #[test]
    fn lookup_and_index() {
        let mut d = Dictionary::new();
        d.insert("k".to_string(), 7);
        assert_eq!(d.lookup("k"), Ok(&7));
        assert_eq!(d.lookup("missing"), Err(DictError::KeyNotFound));
        assert_eq!(d["k"], 7);
        assert_eq!(d.get_or_default("missing"), 0);
        let res = std::panic::catch_unwind(|| d["missing"]);
        assert!(res.is_err());
    }

    #[test]
    fn value_writes_invalidate_open_cursors() {
        let mut d = Dictionary::new();
        d.insert(1, 1);
        d.insert(2, 2);

        let mut c = d.cursor();
        assert_eq!(c.advance(&d), Ok(true));
        *d.get_mut(&2).unwrap() = 99;
        assert_eq!(d.get(&2), Some(&99));
        assert_eq!(c.advance(&d), Err(DictError::InvalidatedIterator));

        let mut c = d.cursor();
        assert_eq!(c.advance(&d), Ok(true));
        for v in d.values_mut() {
            *v += 1;
        }
        assert_eq!(c.advance(&d), Err(DictError::InvalidatedIterator));

        let c = d.cursor();
        for (_, v) in d.iter_mut() {
            *v += 1;
        }
        assert_eq!(c.current(&d), Err(DictError::InvalidatedIterator));

        // A miss hands out nothing and leaves cursors valid.
        let mut c = d.cursor();
        assert!(d.get_mut(&7).is_none());
        assert_eq!(c.advance(&d), Ok(true));
    }

    #[test]
    fn from_pairs_rejects_duplicates() {
        let ok = Dictionary::from_pairs([(1, 'a'), (2, 'b')], DefaultComparer::default()).unwrap();
        assert_eq!(ok.len(), 2);
        let dup = Dictionary::from_pairs([(1, 'a'), (1, 'b')], DefaultComparer::default());
        assert_eq!(dup.err(), Some(DictError::DuplicateKey));
    }

    #[test]
    fn collect_and_extend_upsert() {
        let mut d: Dictionary<i32, i32> = [(1, 1), (2, 2), (1, 3)].into_iter().collect();
        assert_eq!(d.len(), 2);
        assert_eq!(d[&1], 3);
        d.extend([(3, 3)]);
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn copy_to_checks_bounds() {
        let mut d = Dictionary::new();
        d.insert(1, 10);
        d.insert(2, 20);
        let mut dest = [(0, 0); 3];
        assert!(matches!(
            d.copy_to(&mut dest, 2),
            Err(DictError::InvalidArgument { .. })
        ));
        assert!(matches!(
            d.copy_to(&mut dest, 4),
            Err(DictError::InvalidArgument { .. })
        ));
        d.copy_to(&mut dest, 1).unwrap();
        assert_eq!(dest, [(0, 0), (1, 10), (2, 20)]);
    }

    #[test]
    fn drain_empties_and_keeps_capacity() {
        let mut d = Dictionary::new();
        for i in 0..10 {
            d.insert(i, i);
        }
        d.remove(&4);
        let cap = d.capacity();
        let drained: Vec<(i32, i32)> = d.drain().collect();
        assert_eq!(drained.len(), 9);
        assert!(d.is_empty());
        assert_eq!(d.capacity(), cap);
        d.insert(42, 42);
        assert_consistent(&d);
    }

    #[test]
    fn into_iter_yields_owned_pairs_in_slot_order() {
        let mut d = Dictionary::new();
        d.insert("a".to_string(), 1);
        d.insert("b".to_string(), 2);
        let v: Vec<(String, i32)> = d.into_iter().collect();
        assert_eq!(v, [("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn debug_formats_as_map() {
        let mut d = Dictionary::new();
        d.insert(1, "one");
        assert_eq!(alloc::format!("{d:?}"), r#"{1: "one"}"#);
    }

    #[test]
    fn removal_drops_key_and_value() {
        use std::rc::Rc;
        let v = Rc::new(());
        let mut d = Dictionary::new();
        d.insert(1, Rc::clone(&v));
        assert_eq!(Rc::strong_count(&v), 2);
        d.remove(&1);
        assert_eq!(Rc::strong_count(&v), 1);
    }
}
