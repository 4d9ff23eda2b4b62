//! Free-list allocator simulator.
//!
//! This module implements a dynamic allocator over a contiguous address space
//! starting at 0. It provides:
//! 1. **Placement:** First-fit, best-fit, or worst-fit search over the free list.
//! 2. **Splitting:** Requests are carved from the low end of the chosen block.
//! 3. **Coalescing:** Released blocks merge with contiguous free neighbours.
//! 4. **Accounting:** Conservation of `used + free == total` after every operation.

/// Index-stable slot arena backing the block records.
mod arena;
/// Address-ordered free list over the arena.
mod free_list;
/// Candidate selection for each fit strategy.
mod strategy;

use std::fmt;

use tracing::{debug, info, warn};

pub use self::free_list::MemoryBlock;
use self::free_list::FreeList;
use crate::common::{BlockId, MemError, Result};
use crate::config::{AllocatorConfig, FitStrategy};
use crate::stats::{AllocationStats, external_fragmentation};

/// Payload of a successful allocation (or of the block a deallocation released).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Freshly assigned id.
    pub id: BlockId,
    /// Start address of the block.
    pub address: u64,
    /// Size of the block in bytes.
    pub size: u64,
}

/// Ownership state of a block in a dump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockState {
    /// On a free list.
    Free,
    /// Handed out under the given id.
    Allocated(BlockId),
}

/// One line of an address-ordered memory dump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Start address.
    pub address: u64,
    /// Length in bytes.
    pub size: u64,
    /// Free or owned.
    pub state: BlockState,
}

impl BlockInfo {
    /// Last address covered by the block (inclusive).
    pub const fn last(&self) -> u64 {
        self.address + self.size - 1
    }
}

impl fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#06x} - {:#06x}] ", self.address, self.last())?;
        match self.state {
            BlockState::Free => write!(f, "FREE (size={})", self.size),
            BlockState::Allocated(id) => write!(f, "USED (id={id}, size={})", self.size),
        }
    }
}

/// Fate of every id ever issued; ids are never reused.
#[derive(Clone, Copy, Debug)]
enum IdRecord {
    Live(usize),
    Freed,
}

#[derive(Clone, Copy, Debug, Default)]
struct Counters {
    allocations: u64,
    deallocations: u64,
    failures: u64,
}

/// Strategy-pluggable free-list allocator.
///
/// # Examples
///
/// ```
/// use memsim_core::alloc::AllocationEngine;
/// use memsim_core::config::FitStrategy;
///
/// let mut engine = AllocationEngine::new(FitStrategy::FirstFit);
/// engine.init(1000).unwrap();
/// let a = engine.allocate(300).unwrap();
/// assert_eq!((a.id.val(), a.address), (1, 0));
/// engine.deallocate(a.id).unwrap();
/// assert_eq!(engine.statistics().num_free_blocks, 1);
/// ```
#[derive(Clone, Debug)]
pub struct AllocationEngine {
    strategy: FitStrategy,
    total_size: u64,
    heap: Option<FreeList>,
    records: Vec<IdRecord>,
    counters: Counters,
}

impl AllocationEngine {
    /// Creates an uninitialized engine using `strategy`.
    pub const fn new(strategy: FitStrategy) -> Self {
        Self {
            strategy,
            total_size: 0,
            heap: None,
            records: Vec::new(),
            counters: Counters {
                allocations: 0,
                deallocations: 0,
                failures: 0,
            },
        }
    }

    /// Creates and initializes an engine from its configuration.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`AllocationEngine::init`].
    pub fn from_config(config: &AllocatorConfig) -> Result<Self> {
        let mut engine = Self::new(config.strategy);
        engine.init(config.total_size)?;
        Ok(engine)
    }

    /// The active placement strategy.
    pub const fn strategy(&self) -> FitStrategy {
        self.strategy
    }

    /// Human-readable allocator name, e.g. `"Best Fit"`.
    pub const fn name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Whether [`AllocationEngine::init`] has succeeded.
    pub const fn is_initialized(&self) -> bool {
        self.heap.is_some()
    }

    /// Replaces the placement strategy.
    ///
    /// # Errors
    ///
    /// [`MemError::AlreadyInitialized`] once memory has been initialized.
    pub fn set_strategy(&mut self, strategy: FitStrategy) -> Result<()> {
        if self.is_initialized() {
            return Err(MemError::AlreadyInitialized);
        }
        self.strategy = strategy;
        Ok(())
    }

    /// Creates one free block covering `[0, total_size)`.
    ///
    /// # Errors
    ///
    /// [`MemError::AlreadyInitialized`] on a second call and
    /// [`MemError::InvalidRequest`] for a zero size.
    pub fn init(&mut self, total_size: u64) -> Result<()> {
        if self.is_initialized() {
            warn!("allocator already initialized");
            return Err(MemError::AlreadyInitialized);
        }
        if total_size == 0 {
            return Err(MemError::InvalidRequest("total size must be non-zero"));
        }
        self.total_size = total_size;
        self.heap = Some(FreeList::new(total_size));
        info!(strategy = self.name(), total_size, "allocator initialized");
        Ok(())
    }

    /// Allocates `size` bytes with the active strategy.
    ///
    /// # Errors
    ///
    /// [`MemError::NotInitialized`] before init, [`MemError::InvalidRequest`]
    /// for a zero size, and [`MemError::OutOfMemory`] when no free block is
    /// large enough (counted as an allocation failure).
    pub fn allocate(&mut self, size: u64) -> Result<Allocation> {
        let heap = self.heap.as_mut().ok_or(MemError::NotInitialized)?;
        if size == 0 {
            return Err(MemError::InvalidRequest("allocation size must be non-zero"));
        }

        let id = BlockId::from_slot(self.records.len());
        let candidates = heap.iter().map(|(slot, block)| (slot, block.size));
        let carved = self
            .strategy
            .select(candidates, size)
            .and_then(|slot| heap.carve(slot, size, id));
        let Some((taken, block)) = carved else {
            self.counters.failures += 1;
            warn!(size, strategy = self.strategy.name(), "allocation failed");
            return Err(MemError::OutOfMemory { requested: size });
        };

        self.records.push(IdRecord::Live(taken));
        self.counters.allocations += 1;

        let address = block.address;
        debug!(%id, address, size, "allocated block");
        Ok(Allocation { id, address, size })
    }

    /// Releases block `id` and coalesces it with contiguous free neighbours.
    ///
    /// # Errors
    ///
    /// [`MemError::NotInitialized`] before init, [`MemError::InvalidBlockId`]
    /// for id 0 or an id never issued, and [`MemError::DoubleFree`] when the
    /// block was already released.
    pub fn deallocate(&mut self, id: BlockId) -> Result<Allocation> {
        let heap = self.heap.as_mut().ok_or(MemError::NotInitialized)?;
        let record = id
            .slot()
            .and_then(|slot| self.records.get_mut(slot))
            .ok_or(MemError::InvalidBlockId(id))?;
        let IdRecord::Live(taken) = *record else {
            warn!(%id, "double free");
            return Err(MemError::DoubleFree(id));
        };

        let block = heap.block(taken).ok_or(MemError::InvalidBlockId(id))?;
        let merged = heap.release(taken).ok_or(MemError::InvalidBlockId(id))?;
        *record = IdRecord::Freed;
        self.counters.deallocations += 1;
        debug!(%id, address = block.address, merged_size = merged.size, "freed block");

        Ok(Allocation {
            id,
            address: block.address,
            size: block.size,
        })
    }

    /// Snapshot of memory totals, counters, and fragmentation.
    pub fn statistics(&self) -> AllocationStats {
        let Some(heap) = &self.heap else {
            return AllocationStats::default();
        };
        let free_memory = heap.free_bytes();
        AllocationStats {
            total_memory: self.total_size,
            used_memory: self.total_size - free_memory,
            free_memory,
            num_allocations: self.counters.allocations,
            num_deallocations: self.counters.deallocations,
            allocation_failures: self.counters.failures,
            num_free_blocks: heap.free_count(),
            num_allocated_blocks: heap.allocated_count(),
            external_fragmentation: external_fragmentation(heap.largest_free(), free_memory),
            internal_fragmentation: 0.0,
        }
    }

    /// Free blocks in list (address) order.
    pub fn free_blocks(&self) -> Vec<MemoryBlock> {
        self.heap
            .as_ref()
            .map(|heap| heap.iter().map(|(_, block)| block).collect())
            .unwrap_or_default()
    }

    /// Every block, free or allocated, in address order.
    pub fn dump(&self) -> Vec<BlockInfo> {
        let Some(heap) = &self.heap else {
            return Vec::new();
        };
        heap.blocks()
            .into_iter()
            .map(|(block, owner)| BlockInfo {
                address: block.address,
                size: block.size,
                state: owner.map_or(BlockState::Free, BlockState::Allocated),
            })
            .collect()
    }
}
