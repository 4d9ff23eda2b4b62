//! Power-of-two buddy allocator simulator.
//!
//! Free blocks are bucketed by order (`log2(size)`) into address-ordered sets,
//! one per size class between the minimum and maximum block size. Allocations
//! split the first larger free block down to the requested class, keeping the
//! low half each time; deallocations merge a block with its buddy
//! (`address ^ size`) for as long as the buddy is free and undivided.
//!
//! Every block is aligned to its own size: `address % size == 0`.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info, warn};

use crate::alloc::{BlockInfo, BlockState};
use crate::common::{BlockId, MemError, Result};
use crate::config::BuddyConfig;
use crate::stats::{AllocationStats, external_fragmentation, percent};

/// A power-of-two block handed out by the buddy allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuddyBlock {
    /// Start address, aligned to `size`.
    pub address: u64,
    /// Power-of-two length in bytes.
    pub size: u64,
    /// Whether the block is handed out.
    pub allocated: bool,
}

impl BuddyBlock {
    /// Address of this block's buddy at the same size.
    #[inline]
    pub const fn buddy_address(&self) -> u64 {
        self.address ^ self.size
    }
}

/// Payload of a successful buddy allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuddyAllocation {
    /// Freshly assigned id.
    pub id: BlockId,
    /// Start address of the block.
    pub address: u64,
    /// Size the caller asked for.
    pub requested: u64,
    /// Power-of-two size actually reserved.
    pub actual_size: u64,
}

/// Free block addresses of one size class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SizeClass {
    /// Block size of the class in bytes.
    pub block_size: u64,
    /// Free block addresses, ascending.
    pub addresses: Vec<u64>,
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size {} bytes: ", self.block_size)?;
        for (i, addr) in self.addresses.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{addr:#06x}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
enum BuddyRecord {
    Live(BuddyBlock),
    Freed,
}

#[derive(Clone, Copy, Debug)]
struct Geometry {
    total: u64,
    min_block: u64,
    min_order: u32,
    max_order: u32,
}

impl Geometry {
    /// Bucket index for a power-of-two `size` within range.
    const fn bucket(&self, size: u64) -> usize {
        (size.trailing_zeros() - self.min_order) as usize
    }

    const fn orders(&self) -> usize {
        (self.max_order - self.min_order + 1) as usize
    }
}

/// Power-of-two buddy allocator with per-order free buckets.
///
/// # Examples
///
/// ```
/// use memsim_core::buddy::BuddyAllocationEngine;
///
/// let mut buddy = BuddyAllocationEngine::new();
/// buddy.init(1024, 32).unwrap();
/// let a = buddy.allocate(100).unwrap();
/// assert_eq!((a.address, a.actual_size), (0, 128));
/// ```
#[derive(Clone, Debug, Default)]
pub struct BuddyAllocationEngine {
    geometry: Option<Geometry>,
    buckets: Vec<BTreeSet<u64>>,
    records: Vec<BuddyRecord>,
    allocations: u64,
    deallocations: u64,
    failures: u64,
    waste_bytes: u64,
}

impl BuddyAllocationEngine {
    /// Creates an uninitialized engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and initializes an engine from its configuration.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`BuddyAllocationEngine::init`].
    pub fn from_config(config: &BuddyConfig) -> Result<Self> {
        let mut engine = Self::new();
        engine.init(config.total_size, config.min_block_size)?;
        Ok(engine)
    }

    /// Whether [`BuddyAllocationEngine::init`] has succeeded.
    pub const fn is_initialized(&self) -> bool {
        self.geometry.is_some()
    }

    /// Managed space after rounding (0 before init).
    pub fn total_size(&self) -> u64 {
        self.geometry.map_or(0, |g| g.total)
    }

    /// Smallest block size after rounding (0 before init).
    pub fn min_block_size(&self) -> u64 {
        self.geometry.map_or(0, |g| g.min_block)
    }

    /// Largest block size; equal to the rounded total.
    pub fn max_block_size(&self) -> u64 {
        self.total_size()
    }

    /// Rounds both sizes up to powers of two and seeds one free block spanning
    /// the whole space.
    ///
    /// # Errors
    ///
    /// [`MemError::AlreadyInitialized`] on a second call,
    /// [`MemError::InvalidRequest`] for a zero or unrepresentable size, and
    /// [`MemError::InvalidConfiguration`] when the minimum block exceeds the total.
    pub fn init(&mut self, total_size: u64, min_block_size: u64) -> Result<()> {
        if self.is_initialized() {
            warn!("buddy allocator already initialized");
            return Err(MemError::AlreadyInitialized);
        }
        if total_size == 0 || min_block_size == 0 {
            return Err(MemError::InvalidRequest("buddy sizes must be non-zero"));
        }
        let total = total_size
            .checked_next_power_of_two()
            .ok_or(MemError::InvalidRequest("total size too large"))?;
        let min_block = min_block_size
            .checked_next_power_of_two()
            .ok_or(MemError::InvalidRequest("minimum block size too large"))?;
        if min_block > total {
            return Err(MemError::InvalidConfiguration(format!(
                "minimum block {min_block} exceeds total size {total}"
            )));
        }
        if total != total_size {
            debug!(requested = total_size, rounded = total, "rounded total size to a power of two");
        }

        let geometry = Geometry {
            total,
            min_block,
            min_order: min_block.trailing_zeros(),
            max_order: total.trailing_zeros(),
        };
        self.buckets = vec![BTreeSet::new(); geometry.orders()];
        let _ = self.buckets[geometry.bucket(total)].insert(0);
        self.geometry = Some(geometry);
        info!(total, min_block, "buddy allocator initialized");
        Ok(())
    }

    /// Allocates `max(min_block_size, next_pow2(size))` bytes.
    ///
    /// # Errors
    ///
    /// [`MemError::NotInitialized`] before init, [`MemError::InvalidRequest`]
    /// for a zero size, and [`MemError::OutOfMemory`] when no free block of
    /// sufficient size exists (counted as an allocation failure).
    pub fn allocate(&mut self, size: u64) -> Result<BuddyAllocation> {
        let geometry = self.geometry.ok_or(MemError::NotInitialized)?;
        if size == 0 {
            return Err(MemError::InvalidRequest("allocation size must be non-zero"));
        }

        let actual_size = size
            .checked_next_power_of_two()
            .filter(|&actual| actual <= geometry.total)
            .map(|actual| actual.max(geometry.min_block));
        let Some((address, actual_size)) =
            actual_size.and_then(|actual| self.take_free(geometry, actual).map(|a| (a, actual)))
        else {
            self.failures += 1;
            warn!(size, "buddy allocation failed");
            return Err(MemError::OutOfMemory { requested: size });
        };

        let id = BlockId::from_slot(self.records.len());
        self.records.push(BuddyRecord::Live(BuddyBlock {
            address,
            size: actual_size,
            allocated: true,
        }));
        self.allocations += 1;
        self.waste_bytes += actual_size - size;
        debug!(%id, address, requested = size, actual = actual_size, "allocated buddy block");

        Ok(BuddyAllocation {
            id,
            address,
            requested: size,
            actual_size,
        })
    }

    /// Removes a free block of exactly `size` bytes, splitting a larger one if
    /// needed. Returns its address.
    fn take_free(&mut self, geometry: Geometry, size: u64) -> Option<u64> {
        let target = geometry.bucket(size);
        let found = (target..geometry.orders()).find(|&b| !self.buckets[b].is_empty())?;
        let address = self.buckets[found].pop_first()?;

        // Halve down to the target class; the low half is kept, the high half
        // becomes a free sibling one order below.
        let mut order = found;
        while order > target {
            order -= 1;
            let half = geometry.min_block << order;
            let _ = self.buckets[order].insert(address + half);
            debug!(address, half, "split buddy block");
        }
        debug_assert_eq!(address % size, 0);
        Some(address)
    }

    /// Releases block `id` and merges it with its buddy while possible.
    ///
    /// # Errors
    ///
    /// [`MemError::NotInitialized`] before init, [`MemError::InvalidBlockId`]
    /// for id 0 or an id never issued, and [`MemError::DoubleFree`] when the
    /// block was already released.
    pub fn deallocate(&mut self, id: BlockId) -> Result<BuddyBlock> {
        let geometry = self.geometry.ok_or(MemError::NotInitialized)?;
        let record = id
            .slot()
            .and_then(|slot| self.records.get_mut(slot))
            .ok_or(MemError::InvalidBlockId(id))?;
        let BuddyRecord::Live(block) = *record else {
            warn!(%id, "double free");
            return Err(MemError::DoubleFree(id));
        };
        *record = BuddyRecord::Freed;
        self.deallocations += 1;

        let mut merged = BuddyBlock {
            allocated: false,
            ..block
        };
        while merged.size < geometry.total {
            let buddy = merged.buddy_address();
            if !self.buckets[geometry.bucket(merged.size)].remove(&buddy) {
                break;
            }
            merged.address = merged.address.min(buddy);
            merged.size *= 2;
        }
        let _ = self.buckets[geometry.bucket(merged.size)].insert(merged.address);
        debug!(%id, address = block.address, merged_size = merged.size, "freed buddy block");

        Ok(BuddyBlock {
            allocated: false,
            ..block
        })
    }

    fn live_blocks(&self) -> impl Iterator<Item = (BlockId, BuddyBlock)> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(slot, record)| match record {
                BuddyRecord::Live(block) => Some((BlockId::from_slot(slot), *block)),
                BuddyRecord::Freed => None,
            })
    }

    fn free_blocks(&self) -> impl Iterator<Item = BuddyBlock> + '_ {
        let min_block = self.min_block_size();
        self.buckets.iter().enumerate().flat_map(move |(order, bucket)| {
            bucket.iter().map(move |&address| BuddyBlock {
                address,
                size: min_block << order,
                allocated: false,
            })
        })
    }

    /// Snapshot of memory totals, counters, and fragmentation.
    ///
    /// Internal fragmentation is the running total of rounding waste over all
    /// allocations, as a percentage of the bytes currently in use.
    pub fn statistics(&self) -> AllocationStats {
        let total_memory = self.total_size();
        let used_memory: u64 = self.live_blocks().map(|(_, b)| b.size).sum();
        let free_memory = total_memory - used_memory;
        let largest_free = self.free_blocks().map(|b| b.size).max().unwrap_or(0);

        AllocationStats {
            total_memory,
            used_memory,
            free_memory,
            num_allocations: self.allocations,
            num_deallocations: self.deallocations,
            allocation_failures: self.failures,
            num_free_blocks: self.buckets.iter().map(BTreeSet::len).sum(),
            num_allocated_blocks: self.live_blocks().count(),
            external_fragmentation: external_fragmentation(largest_free, free_memory),
            internal_fragmentation: percent(self.waste_bytes, used_memory),
        }
    }

    /// Every block, free or allocated, in address order.
    pub fn dump(&self) -> Vec<BlockInfo> {
        let free = self.free_blocks().map(|b| BlockInfo {
            address: b.address,
            size: b.size,
            state: BlockState::Free,
        });
        let used = self.live_blocks().map(|(id, b)| BlockInfo {
            address: b.address,
            size: b.size,
            state: BlockState::Allocated(id),
        });
        let mut all: Vec<_> = free.chain(used).collect();
        all.sort_by_key(|info| info.address);
        all
    }

    /// Non-empty size classes, smallest first.
    pub fn free_lists(&self) -> Vec<SizeClass> {
        let min_block = self.min_block_size();
        self.buckets
            .iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(order, bucket)| SizeClass {
                block_size: min_block << order,
                addresses: bucket.iter().copied().collect(),
            })
            .collect()
    }
}
