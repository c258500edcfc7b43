//! Provide `FixedHasher`.
//!
//! `FixedHasher` based on `foldhash` crate,
//! Provide stable hash results through a fixed hash seed.

use core::hash::{BuildHasher, Hash};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

/// A fixed hash seed.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x6A50_4E41_5049_2E31);

/// A fixed hasher provided hash results that only related on the input.
///
/// A type alias for [`foldhash::fast::FoldHasher`] .
///
/// Which can be created through [`FixedHashState::build_hasher`].
pub type FixedHasher = FoldHasher<'static>;

/// Fixed Hash State based upon a random but fixed seed.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use jsonapi_utils::hash::FixedHashState;
///
/// assert_eq!(FixedHashState.hash_one("authors"), FixedHashState.hash_one("authors"));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl FixedHashState {
    /// Hash a single value, shorthand used by the hash-table based containers.
    #[inline]
    pub fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
        FixedHashState.hash_one(value)
    }
}

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}
