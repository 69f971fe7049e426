//! prime-dict: a general-purpose hash map with prime-sized buckets,
//! separate chaining over an index arena, and versioned cursors.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a dictionary whose layout and enumeration order are fully
//!   determined by the sequence of operations applied to it.
//! - Layers:
//!   - primes: bucket-count policy. Sizes come from a fixed table of
//!     primes, with a trial-division fallback past its end, and grow by
//!     roughly doubling.
//!   - Dictionary<K, V, S>: bucket heads plus a contiguous slot arena.
//!     Collision chains and the free list are threaded through the slots
//!     by index.
//!   - Iterators, Cursor and views: read-side facades. Borrowing iterators
//!     are checked by the borrow checker; detached cursors check the
//!     dictionary's version on every call.
//!   - Snapshot: a plain record of version, bucket count and pairs. Restore
//!     is allocation followed by insert-if-absent of every pair.
//!
//! Constraints
//! - Enumeration is in slot order. Freed slots are reused before the table
//!   grows, so after a removal new entries take the removed entries' places.
//! - Every failing operation leaves the dictionary unchanged.
//! - Keys are never rehashed: each live slot keeps its 31-bit masked hash,
//!   and growth redistributes slots using the stored values.
//! - Handing out mutable access to values (`get_mut` on a hit, `iter_mut`,
//!   `values_mut`) changes the version, so detached cursors notice value
//!   writes as well as structural changes.
//!
//! Hasher
//! - Keys are hashed and compared through [`KeyComparer`]. Every
//!   `BuildHasher` is one for `Hash + Eq` keys; custom equality (such as
//!   case folding) implements the trait directly.
//! - With the `std` feature the default is std's `RandomState`. Without it
//!   the crate is `no_std + alloc` and needs the `hashbrown` feature, whose
//!   default hasher takes over.
//!
//! Logging
//! - Allocation, growth and restore are reported at `debug` level through
//!   the `log` facade, clears at `trace`. The crate installs no logger.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(any(feature = "std", feature = "hashbrown")))]
compile_error!("enable the `std` feature, or `hashbrown` for no_std builds");

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod comparer;
pub mod cursor;
pub mod dictionary;
mod dictionary_proptest;
pub mod error;
pub mod iter;
pub mod primes;
pub mod snapshot;
pub mod views;

// Public surface
pub use comparer::{DefaultComparer, KeyComparer};
pub use cursor::{Cursor, KeysOnly, Pairs, Projection, ValuesOnly};
pub use dictionary::Dictionary;
pub use error::{DictError, Result};
pub use iter::{Drain, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
pub use snapshot::{Snapshot, SnapshotPair};
pub use views::{KeyView, ReadOnlyCollection, ValueView};
