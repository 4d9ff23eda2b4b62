//! Physical and Virtual Address types.
//!
//! Strong types for the two address spaces, so a virtual address produced by a
//! workload can never be handed to the cache hierarchy without going through
//! translation first.

use std::fmt;

/// A virtual address inside the simulated virtual address space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

/// A physical address, either a translated frame address or a raw cache probe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Returns the virtual page number for the given page size.
    ///
    /// `page_size` must be non-zero.
    #[inline]
    pub const fn page(&self, page_size: u64) -> u64 {
        self.0 / page_size
    }

    /// Returns the byte offset within the page for the given page size.
    ///
    /// `page_size` must be non-zero.
    #[inline]
    pub const fn page_offset(&self, page_size: u64) -> u64 {
        self.0 % page_size
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Builds the physical address of `offset` inside `frame`.
    #[inline]
    pub const fn from_frame(frame: usize, page_size: u64, offset: u64) -> Self {
        Self(frame as u64 * page_size + offset)
    }
}

impl From<u64> for VirtAddr {
    fn from(addr: u64) -> Self {
        Self(addr)
    }
}

impl From<u64> for PhysAddr {
    fn from(addr: u64) -> Self {
        Self(addr)
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}
