//! Provide [`IndexSet`], a hash set that keeps insertion order.

use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::Hash;

use crate::hash::FixedHashState;
use crate::hash::HashTable;
use crate::hash::hashbrown::hash_table::Entry;

// -----------------------------------------------------------------------------
// IndexSet

/// A set whose iteration order is the order in which values were first inserted.
///
/// Values live in a dense `Vec`; a [`HashTable`] of positions answers membership
/// queries. Values can only be removed from the back, with
/// [`split_off`](Self::split_off), so the positions that remain stay stable.
///
/// # Examples
///
/// ```
/// use jsonapi_utils::IndexSet;
///
/// let mut set = IndexSet::new();
/// assert!(set.insert("posts"));
/// assert!(set.insert("authors"));
/// assert!(!set.insert("posts"));
///
/// assert_eq!(set.as_slice(), &["posts", "authors"]);
/// ```
pub struct IndexSet<T> {
    entries: Vec<T>,
    indices: HashTable<usize>,
}

impl<T> Default for IndexSet<T> {
    #[inline]
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            indices: HashTable::new(),
        }
    }
}

impl<T> IndexSet<T> {
    /// Creates an empty `IndexSet`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of values in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set contains no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the values in insertion order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    /// Iterates over the values in insertion order.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Removes every value from position `at` on and returns them in order.
    ///
    /// Does nothing if `at` is not less than [`len`](Self::len).
    pub fn split_off(&mut self, at: usize) -> Vec<T> {
        if at >= self.entries.len() {
            return Vec::new();
        }
        self.indices.retain(|&mut index| index < at);
        self.entries.split_off(at)
    }
}

impl<T: Hash + Eq> IndexSet<T> {
    /// Adds a value to the set.
    ///
    /// Returns `true` if the value was not present. An already present value
    /// keeps its original position.
    pub fn insert(&mut self, value: T) -> bool {
        let hash = FixedHashState::hash_of(&value);
        let entries = &self.entries;
        match self.indices.entry(
            hash,
            |&index| entries[index] == value,
            |&index| FixedHashState::hash_of(&entries[index]),
        ) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(self.entries.len());
                self.entries.push(value);
                true
            }
        }
    }

    /// Returns the position of `value`, if present.
    pub fn get_index_of<Q>(&self, value: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = FixedHashState::hash_of(value);
        self.indices
            .find(hash, |&index| Borrow::<Q>::borrow(&self.entries[index]) == value)
            .copied()
    }

    /// Returns `true` if the set contains `value`.
    #[inline]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_index_of(value).is_some()
    }
}

impl<'a, T> IntoIterator for &'a IndexSet<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Hash + Eq> FromIterator<T> for IndexSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<T: Debug> Debug for IndexSet<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.entries.iter()).finish()
    }
}

impl<T: Clone + Hash + Eq> Clone for IndexSet<T> {
    fn clone(&self) -> Self {
        self.entries.iter().cloned().collect()
    }
}

// -----------------------------------------------------------------------------
// Tests
