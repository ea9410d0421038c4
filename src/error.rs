//! Store and index error types.

use std::error::Error;
use std::fmt;

/// Errors reported by [`EntryStore`](crate::EntryStore) operations.
///
/// Range and argument errors are precondition violations the caller can
/// detect up front; none of them leave the store in a partially mutated
/// state. Allocation failure is reported rather than recovered from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// Construction parameters that cannot describe a valid store.
    InvalidConfig {
        /// Requested words per entry (must be non-zero).
        entry_words: usize,
        /// Requested log2 of entries per page (must fit the index width).
        page_log2: u32,
    },
    /// A handle at or beyond the current entry count.
    OutOfRange {
        /// The offending handle value.
        handle: u32,
        /// Number of valid entries at the time of the call.
        len: usize,
    },
    /// An operation that needs at least one entry ran on an empty store.
    Empty,
    /// Shrink target above the current entry count.
    ShrinkBeyondCount {
        /// Requested new entry count.
        requested: usize,
        /// Current entry count.
        len: usize,
    },
    /// An entry slice whose length differs from the configured width.
    EntryWidthMismatch {
        /// Words per entry the store was created with.
        expected: usize,
        /// Length of the slice that was passed in.
        actual: usize,
    },
    /// `attach_index` on a store that already has an index.
    AlreadyIndexed,
    /// `insert` on a store with no attached index.
    NotIndexed,
    /// The allocator could not provide backing memory.
    AllocationFailed {
        /// Size of the failed reservation in bytes.
        bytes: usize,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig {
                entry_words,
                page_log2,
            } => {
                write!(
                    f,
                    "invalid store config: entry_words={entry_words}, page_log2={page_log2}"
                )
            }
            Self::OutOfRange { handle, len } => {
                write!(f, "handle {handle} out of range: store has {len} entries")
            }
            Self::Empty => write!(f, "store is empty"),
            Self::ShrinkBeyondCount { requested, len } => {
                write!(
                    f,
                    "shrink target {requested} exceeds current entry count {len}"
                )
            }
            Self::EntryWidthMismatch { expected, actual } => {
                write!(
                    f,
                    "entry width mismatch: store holds {expected}-word entries, got {actual} words"
                )
            }
            Self::AlreadyIndexed => write!(f, "store already has an attached index"),
            Self::NotIndexed => write!(f, "store has no attached index"),
            Self::AllocationFailed { bytes } => {
                write!(f, "allocation of {bytes} bytes failed")
            }
        }
    }
}

impl Error for StoreError {}

/// Fallible `Vec` growth: reserve `additional` slots, reporting failure
/// as [`StoreError::AllocationFailed`] instead of aborting.
pub(crate) fn try_reserve<T>(v: &mut Vec<T>, additional: usize) -> Result<(), StoreError> {
    v.try_reserve(additional).map_err(|_| StoreError::AllocationFailed {
        bytes: additional.saturating_mul(std::mem::size_of::<T>()),
    })
}
