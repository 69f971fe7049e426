//! Save/restore record for a dictionary's contents.
//!
//! A [`Snapshot`] carries the mutation version and bucket count at save
//! time plus the live pairs in slot order. Restoring is ordinary
//! construction: allocate, then insert every pair through the
//! insert-if-absent path.

use alloc::vec::Vec;

use crate::comparer::KeyComparer;
use crate::dictionary::Dictionary;
use crate::error::{DictError, Result};
use crate::primes;

/// One saved pair. `key` is optional so that a decoded record can carry an
/// absent key, which [`Dictionary::restore`] rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapshotPair<K, V> {
    pub key: Option<K>,
    pub value: V,
}

/// Serialized form of a dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot<K, V> {
    /// Mutation version at save time.
    pub version: u64,
    /// Bucket count at save time; zero for a never-allocated table.
    pub hash_size: usize,
    /// Live pairs in slot order, `None` for a never-allocated table.
    pub pairs: Option<Vec<SnapshotPair<K, V>>>,
}

impl<K, V, S> Dictionary<K, V, S> {
    /// Captures the current contents.
    pub fn snapshot(&self) -> Snapshot<K, V>
    where
        K: Clone,
        V: Clone,
    {
        let pairs = (self.capacity() > 0).then(|| {
            self.iter()
                .map(|(k, v)| SnapshotPair {
                    key: Some(k.clone()),
                    value: v.clone(),
                })
                .collect()
        });
        Snapshot {
            version: self.version(),
            hash_size: self.capacity(),
            pairs,
        }
    }
}

impl<K, V, S> Dictionary<K, V, S>
where
    S: KeyComparer<K>,
{
    /// Rebuilds a dictionary from `snapshot`, hashing with `comparer`.
    ///
    /// Fails with [`DictError::MalformedSnapshot`] if a key is absent or the
    /// record is inconsistent, and with [`DictError::DuplicateKey`] if two
    /// pairs carry equal keys. The restored table reports the saved version.
    pub fn restore(snapshot: Snapshot<K, V>, comparer: S) -> Result<Self> {
        let Snapshot {
            version,
            hash_size,
            pairs,
        } = snapshot;

        if hash_size > primes::MAX_PRIME_ARRAY_LENGTH {
            return Err(DictError::malformed_snapshot(alloc::format!(
                "hash size {hash_size} exceeds the maximum table size"
            )));
        }

        let mut d = Self::with_comparer(comparer);
        match (hash_size, pairs) {
            (0, None) => {}
            (0, Some(pairs)) if pairs.is_empty() => {}
            (0, Some(pairs)) => {
                return Err(DictError::malformed_snapshot(alloc::format!(
                    "{} pairs saved for an unallocated table",
                    pairs.len()
                )));
            }
            (_, None) => {
                return Err(DictError::malformed_snapshot(
                    "pairs missing for an allocated table",
                ));
            }
            (size, Some(pairs)) => {
                log::debug!(
                    "restoring {} pairs into {} buckets",
                    pairs.len(),
                    size
                );
                d.allocate(size);
                for SnapshotPair { key, value } in pairs {
                    let key = key.ok_or_else(|| DictError::malformed_snapshot("absent key"))?;
                    d.try_insert(key, value)?;
                }
            }
        }
        d.set_version(version);
        Ok(d)
    }
}
