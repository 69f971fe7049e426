//! Read-only projections of a dictionary onto its keys or its values.
//!
//! Views borrow the dictionary and delegate every query to it. They accept
//! the collection-style mutators of [`ReadOnlyCollection`] only to refuse
//! them with [`DictError::UnsupportedOperation`].

use alloc::format;
use core::borrow::Borrow;
use core::fmt;

use crate::comparer::KeyComparer;
use crate::cursor::{Cursor, KeysOnly, ValuesOnly};
use crate::dictionary::Dictionary;
use crate::error::{DictError, Result};
use crate::iter::{Keys, Values};

/// A sized collection that can be observed but not modified.
pub trait ReadOnlyCollection<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, item: &T) -> bool;

    fn is_read_only(&self) -> bool {
        true
    }

    /// Always fails with [`DictError::UnsupportedOperation`].
    fn add(&mut self, _item: T) -> Result<()> {
        Err(DictError::unsupported("add"))
    }

    /// Always fails with [`DictError::UnsupportedOperation`].
    fn remove(&mut self, _item: &T) -> Result<bool> {
        Err(DictError::unsupported("remove"))
    }

    /// Always fails with [`DictError::UnsupportedOperation`].
    fn clear(&mut self) -> Result<()> {
        Err(DictError::unsupported("clear"))
    }
}

// Writes `items` into `dest[index..]` after checking that `len` of them fit.
pub(crate) fn copy_into<T, I>(dest: &mut [T], index: usize, len: usize, items: I) -> Result<()>
where
    I: Iterator<Item = T>,
{
    if index > dest.len() {
        return Err(DictError::invalid_argument(format!(
            "index {index} is past the end of a destination of length {}",
            dest.len()
        )));
    }
    let room = dest.len() - index;
    if room < len {
        return Err(DictError::invalid_argument(format!(
            "destination has room for {room} items after index {index}, {len} required"
        )));
    }
    for (slot, item) in dest[index..].iter_mut().zip(items) {
        *slot = item;
    }
    Ok(())
}

/// The keys of a dictionary, in slot order.
pub struct KeyView<'a, K, V, S> {
    dict: &'a Dictionary<K, V, S>,
}

impl<'a, K, V, S> KeyView<'a, K, V, S> {
    pub(crate) fn new(dict: &'a Dictionary<K, V, S>) -> Self {
        Self { dict }
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// Key membership; same as [`Dictionary::contains_key`].
    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyComparer<Q>,
    {
        self.dict.contains_key(q)
    }

    /// Clones every key into `dest` starting at `index`.
    pub fn copy_to(&self, dest: &mut [K], index: usize) -> Result<()>
    where
        K: Clone,
    {
        copy_into(dest, index, self.len(), self.iter().cloned())
    }

    pub fn iter(&self) -> Keys<'a, K, V> {
        Keys::new(self.dict.iter())
    }

    /// Detached cursor yielding keys; see [`Cursor`].
    pub fn cursor(&self) -> Cursor<KeysOnly> {
        Cursor::new(self.dict.version())
    }
}

impl<K, V, S> Clone for KeyView<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for KeyView<'_, K, V, S> {}

impl<K: fmt::Debug, V, S> fmt::Debug for KeyView<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K, V, S> ReadOnlyCollection<K> for KeyView<'_, K, V, S>
where
    S: KeyComparer<K>,
{
    fn len(&self) -> usize {
        self.dict.len()
    }

    fn contains(&self, item: &K) -> bool {
        self.dict.contains_key(item)
    }
}

impl<'a, K, V, S> IntoIterator for KeyView<'a, K, V, S> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The values of a dictionary, in slot order.
pub struct ValueView<'a, K, V, S> {
    dict: &'a Dictionary<K, V, S>,
}

impl<'a, K, V, S> ValueView<'a, K, V, S> {
    pub(crate) fn new(dict: &'a Dictionary<K, V, S>) -> Self {
        Self { dict }
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// Linear scan; same as [`Dictionary::contains_value`].
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.dict.contains_value(value)
    }

    /// Clones every value into `dest` starting at `index`.
    pub fn copy_to(&self, dest: &mut [V], index: usize) -> Result<()>
    where
        V: Clone,
    {
        copy_into(dest, index, self.len(), self.iter().cloned())
    }

    pub fn iter(&self) -> Values<'a, K, V> {
        Values::new(self.dict.iter())
    }

    /// Detached cursor yielding values; see [`Cursor`].
    pub fn cursor(&self) -> Cursor<ValuesOnly> {
        Cursor::new(self.dict.version())
    }
}

impl<K, V, S> Clone for ValueView<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for ValueView<'_, K, V, S> {}

impl<K, V: fmt::Debug, S> fmt::Debug for ValueView<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K, V, S> ReadOnlyCollection<V> for ValueView<'_, K, V, S>
where
    V: PartialEq,
{
    fn len(&self) -> usize {
        self.dict.len()
    }

    fn contains(&self, item: &V) -> bool {
        self.dict.contains_value(item)
    }
}

impl<'a, K, V, S> IntoIterator for ValueView<'a, K, V, S> {
    type Item = &'a V;
    type IntoIter = Values<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
