//! Block ids.
//!
//! Ids are assigned from 1 upward by each allocator and never reused, so a
//! stale id always resolves to either the freed record or nothing at all.

use std::fmt;

/// Handle for a block returned by an allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u64);

impl BlockId {
    /// Returns the raw id value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Zero-based slot for this id in an id-indexed table, or `None` for id 0.
    #[inline]
    pub(crate) const fn slot(self) -> Option<usize> {
        match self.0 {
            0 => None,
            n => Some((n - 1) as usize),
        }
    }

    /// The id issued for the record stored at `slot`.
    #[inline]
    pub(crate) const fn from_slot(slot: usize) -> Self {
        Self(slot as u64 + 1)
    }
}

impl From<u64> for BlockId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
