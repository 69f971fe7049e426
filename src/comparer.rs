//! The pluggable key equality and hashing capability.

use core::hash::{BuildHasher, Hash};

/// Decides how keys are hashed and compared.
///
/// Implementations must be consistent: keys that compare equal must hash
/// equally. Only the low 31 bits of [`hash_key`](KeyComparer::hash_key) are
/// used by the table.
///
/// Every [`BuildHasher`] is a comparer for any `Hash + Eq` key, so the
/// default is simply the key type's own `Hash` and `Eq`. Custom comparers
/// (case-insensitive strings, say) implement this trait directly, once for
/// the stored key type and once per borrowed form used in lookups.
pub trait KeyComparer<K: ?Sized> {
    /// Hash of `key`.
    fn hash_key(&self, key: &K) -> u64;

    /// Whether `a` and `b` denote the same key.
    fn keys_equal(&self, a: &K, b: &K) -> bool;
}

impl<K, S> KeyComparer<K> for S
where
    K: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.hash_one(key)
    }

    #[inline]
    fn keys_equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Comparer used when none is given: the key's own `Hash` and `Eq` with a
/// randomly seeded hasher.
#[cfg(feature = "std")]
pub type DefaultComparer = std::collections::hash_map::RandomState;
/// Comparer used when none is given: the key's own `Hash` and `Eq` with a
/// randomly seeded hasher.
#[cfg(all(not(feature = "std"), feature = "hashbrown"))]
pub type DefaultComparer = hashbrown::DefaultHashBuilder;
