//! Detached, versioned enumeration cursors.
//!
//! A [`Cursor`] does not borrow the dictionary. It records the dictionary's
//! version when created plus a slot position, and every call takes the
//! dictionary by reference. Any mutation in between is detected on the next
//! call and reported as [`DictError::InvalidatedIterator`]; the cursor never
//! observes a half-updated table.
//!
//! Positions follow slot order, so a cursor visits each live entry once in
//! increasing slot index.

use core::marker::PhantomData;

use crate::dictionary::{Dictionary, Slot};
use crate::error::{DictError, Result};

/// What a cursor yields for each live entry.
pub trait Projection {
    type Output<'a, K: 'a, V: 'a>;

    fn project<'a, K, V>(key: &'a K, value: &'a V) -> Self::Output<'a, K, V>
    where
        K: 'a,
        V: 'a;
}

/// Yields `(&K, &V)`.
#[derive(Debug, Clone, Copy)]
pub struct Pairs;

/// Yields `&K`.
#[derive(Debug, Clone, Copy)]
pub struct KeysOnly;

/// Yields `&V`.
#[derive(Debug, Clone, Copy)]
pub struct ValuesOnly;

impl Projection for Pairs {
    type Output<'a, K: 'a, V: 'a> = (&'a K, &'a V);

    #[inline]
    fn project<'a, K, V>(key: &'a K, value: &'a V) -> Self::Output<'a, K, V>
    where
        K: 'a,
        V: 'a,
    {
        (key, value)
    }
}

impl Projection for KeysOnly {
    type Output<'a, K: 'a, V: 'a> = &'a K;

    #[inline]
    fn project<'a, K, V>(key: &'a K, _value: &'a V) -> Self::Output<'a, K, V>
    where
        K: 'a,
        V: 'a,
    {
        key
    }
}

impl Projection for ValuesOnly {
    type Output<'a, K: 'a, V: 'a> = &'a V;

    #[inline]
    fn project<'a, K, V>(_key: &'a K, value: &'a V) -> Self::Output<'a, K, V>
    where
        K: 'a,
        V: 'a,
    {
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NotStarted,
    At(usize),
    Finished,
}

/// Restartable forward cursor over a dictionary's live entries.
#[derive(Debug, Clone)]
pub struct Cursor<P = Pairs> {
    version: u64,
    // Next slot index to examine.
    position: usize,
    state: State,
    _projection: PhantomData<P>,
}

impl<P: Projection> Cursor<P> {
    pub(crate) fn new(version: u64) -> Self {
        Self {
            version,
            position: 0,
            state: State::NotStarted,
            _projection: PhantomData,
        }
    }

    fn check<K, V, S>(&self, dict: &Dictionary<K, V, S>) -> Result<()> {
        if dict.version() != self.version {
            return Err(DictError::InvalidatedIterator);
        }
        Ok(())
    }

    /// Moves to the next live entry. Returns `Ok(false)` once every slot has
    /// been examined, and keeps returning it until [`reset`](Self::reset).
    pub fn advance<K, V, S>(&mut self, dict: &Dictionary<K, V, S>) -> Result<bool> {
        self.check(dict)?;
        let slots = dict.slots();
        while self.position < slots.len() {
            let i = self.position;
            self.position += 1;
            if slots[i].live().is_some() {
                self.state = State::At(i);
                return Ok(true);
            }
        }
        self.state = State::Finished;
        Ok(false)
    }

    /// The entry the cursor is on.
    ///
    /// Fails with [`DictError::InvalidCursorState`] before the first
    /// successful [`advance`](Self::advance) and after exhaustion.
    pub fn current<'a, K, V, S>(
        &self,
        dict: &'a Dictionary<K, V, S>,
    ) -> Result<P::Output<'a, K, V>>
    where
        K: 'a,
        V: 'a,
    {
        self.check(dict)?;
        match self.state {
            // A table at the same version may still be a different table.
            State::At(i) => match dict.slots().get(i).and_then(Slot::live) {
                Some((k, v)) => Ok(P::project(k, v)),
                None => Err(DictError::InvalidCursorState),
            },
            State::NotStarted | State::Finished => Err(DictError::InvalidCursorState),
        }
    }

    /// Rewinds to before the first entry. The dictionary must not have been
    /// mutated since the cursor was created.
    pub fn reset<K, V, S>(&mut self, dict: &Dictionary<K, V, S>) -> Result<()> {
        self.check(dict)?;
        self.position = 0;
        self.state = State::NotStarted;
        Ok(())
    }

    /// Version of the dictionary this cursor is bound to.
    pub fn version(&self) -> u64 {
        self.version
    }
}
