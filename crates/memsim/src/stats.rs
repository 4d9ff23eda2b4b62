//! Statistics snapshots for the simulation engines.
//!
//! This module defines the values returned by every engine's `statistics()`:
//! 1. **Allocation:** Memory totals, request counters, block counts, and fragmentation.
//! 2. **Cache:** Per-level accesses, hits, misses, and hit ratio.
//! 3. **Virtual memory:** Geometry, accesses, page hits, and page faults.
//!
//! Snapshots are plain values; taking one never mutates an engine. Formatting for
//! humans is left to the caller.

/// Returns `part / whole * 100`, or 0 when `whole` is zero.
#[inline]
pub(crate) fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// External fragmentation as a fraction in `[0, 1]`.
///
/// Defined as `1 - largest_free / total_free`, and 0 when nothing is free.
#[inline]
pub(crate) fn external_fragmentation(largest_free: u64, total_free: u64) -> f64 {
    if total_free == 0 {
        0.0
    } else {
        1.0 - largest_free as f64 / total_free as f64
    }
}

/// Snapshot of a free-list or buddy allocator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationStats {
    /// Size of the managed space in bytes (after rounding, for buddy).
    pub total_memory: u64,
    /// Bytes held by live allocated blocks.
    pub used_memory: u64,
    /// Bytes held by free blocks.
    pub free_memory: u64,
    /// Successful allocations since init.
    pub num_allocations: u64,
    /// Successful deallocations since init.
    pub num_deallocations: u64,
    /// Allocation requests that found no room.
    pub allocation_failures: u64,
    /// Free blocks currently on the free list(s).
    pub num_free_blocks: usize,
    /// Live allocated blocks.
    pub num_allocated_blocks: usize,
    /// `1 - largest_free_block / free_memory` as a fraction; 0 when nothing is free.
    pub external_fragmentation: f64,
    /// Wasted bytes inside allocated blocks as a percentage of used memory.
    ///
    /// Always 0 for the free-list allocator, which never over-allocates.
    pub internal_fragmentation: f64,
}

impl AllocationStats {
    /// Percentage of the managed space currently allocated.
    pub fn utilization(&self) -> f64 {
        percent(self.used_memory, self.total_memory)
    }

    /// Percentage of allocation requests that succeeded.
    ///
    /// Rejected zero-size requests are not counted as requests.
    pub fn success_rate(&self) -> f64 {
        percent(self.num_allocations, self.total_requests())
    }

    /// Percentage of allocation requests that failed for lack of space.
    pub fn failure_rate(&self) -> f64 {
        percent(self.allocation_failures, self.total_requests())
    }

    const fn total_requests(&self) -> u64 {
        self.num_allocations + self.allocation_failures
    }
}

/// Snapshot of a single cache level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheLevelStats {
    /// Level name from the configuration.
    pub name: String,
    /// Accesses evaluated by this level.
    pub accesses: u64,
    /// Accesses that found a valid matching line.
    pub hits: u64,
    /// Accesses that installed a new line.
    pub misses: u64,
}

impl CacheLevelStats {
    pub(crate) fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// `hits / accesses * 100`, or 0 with no accesses.
    pub fn hit_ratio(&self) -> f64 {
        percent(self.hits, self.accesses)
    }

    /// `misses / accesses * 100`, or 0 with no accesses.
    pub fn miss_ratio(&self) -> f64 {
        percent(self.misses, self.accesses)
    }
}

/// Snapshot of the virtual-memory engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmStats {
    /// Virtual space size in bytes after truncation to whole pages.
    pub virtual_size: u64,
    /// Physical space size in bytes after truncation to whole frames.
    pub physical_size: u64,
    /// Page size in bytes.
    pub page_size: u64,
    /// Number of virtual pages.
    pub num_virtual_pages: usize,
    /// Number of physical frames.
    pub num_frames: usize,
    /// Successful translations.
    pub accesses: u64,
    /// Translations whose page was resident.
    pub page_hits: u64,
    /// Translations that loaded a page.
    pub page_faults: u64,
}

impl VmStats {
    /// `page_hits / accesses * 100`, or 0 with no accesses.
    pub fn hit_rate(&self) -> f64 {
        percent(self.page_hits, self.accesses)
    }

    /// `page_faults / accesses * 100`, or 0 with no accesses.
    pub fn fault_rate(&self) -> f64 {
        percent(self.page_faults, self.accesses)
    }
}
