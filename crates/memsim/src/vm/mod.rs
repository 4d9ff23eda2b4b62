//! Paged Virtual Memory Simulator.
//!
//! A single-level page table over a fixed pool of physical frames. Each access
//! translates a virtual address to a physical one, loading the page on a fault
//! into the first empty frame or, once every frame is occupied, into the frame
//! chosen by the [`PagePolicy`]:
//!
//! - `Fifo`: evicts the resident page with the oldest load time.
//! - `Lru`: evicts the resident page with the oldest last-access time.
//!
//! Ties go to the lowest frame index.

/// Page table entries and the reverse frame table.
pub mod page_table;

use std::fmt;

use tracing::{debug, info};

pub use self::page_table::PageTableEntry;
use self::page_table::PageTable;
use crate::common::{Clock, MemError, PhysAddr, Result, VirtAddr};
use crate::config::{PagePolicy, VmConfig};
use crate::stats::VmStats;

/// How a translation was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was already resident.
    Hit,
    /// Page fault served by an empty frame.
    LoadedIntoFreeFrame,
    /// Page fault that evicted a resident page.
    ReplacedVictim {
        /// Virtual page that lost its frame.
        evicted_page: u64,
    },
}

/// Result of a successful address translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Translation {
    /// Address that was translated.
    pub virtual_address: VirtAddr,
    /// `frame * page_size + offset`.
    pub physical_address: PhysAddr,
    /// Virtual page number.
    pub virtual_page: u64,
    /// Frame now holding the page.
    pub frame: usize,
    /// Hit, or how the fault was served.
    pub outcome: PageOutcome,
}

impl Translation {
    /// Whether the access faulted.
    pub const fn page_fault(&self) -> bool {
        !matches!(self.outcome, PageOutcome::Hit)
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VA {} -> PA {} (page {}, frame {})",
            self.virtual_address, self.physical_address, self.virtual_page, self.frame
        )?;
        match self.outcome {
            PageOutcome::Hit => f.write_str(" HIT"),
            PageOutcome::LoadedIntoFreeFrame => f.write_str(" FAULT"),
            PageOutcome::ReplacedVictim { evicted_page } => {
                write!(f, " FAULT (evicted page {evicted_page})")
            }
        }
    }
}

/// Geometry and mappings of an initialized engine.
#[derive(Clone, Debug)]
struct Space {
    virtual_size: u64,
    physical_size: u64,
    page_size: u64,
    policy: PagePolicy,
    table: PageTable,
}

/// Paged virtual memory engine.
///
/// # Examples
///
/// ```
/// use memsim_core::config::PagePolicy;
/// use memsim_core::vm::VirtualMemoryEngine;
///
/// let mut vm = VirtualMemoryEngine::new();
/// vm.init(4096, 256, 1024, PagePolicy::Fifo).unwrap();
/// let t = vm.access(0x123).unwrap();
/// assert!(t.page_fault());
/// assert_eq!(t.physical_address.val(), 0x23);
/// ```
#[derive(Clone, Debug, Default)]
pub struct VirtualMemoryEngine {
    space: Option<Space>,
    clock: Clock,
    accesses: u64,
    page_hits: u64,
    page_faults: u64,
}

impl VirtualMemoryEngine {
    /// Creates an uninitialized engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and initializes an engine from its configuration.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`VirtualMemoryEngine::init`].
    pub fn from_config(config: &VmConfig) -> Result<Self> {
        let mut engine = Self::new();
        engine.init(config.virtual_size, config.page_size, config.physical_size, config.policy)?;
        Ok(engine)
    }

    /// Whether [`VirtualMemoryEngine::init`] has succeeded.
    pub const fn is_initialized(&self) -> bool {
        self.space.is_some()
    }

    /// (Re)configures the engine with every page unmapped and every frame empty.
    ///
    /// Both sizes are truncated down to a multiple of `page_size`. Counters and
    /// the clock restart from zero.
    ///
    /// # Errors
    ///
    /// [`MemError::InvalidRequest`] for a zero page size or a space smaller than
    /// one page, and [`MemError::InvalidConfiguration`] when the page or frame
    /// count does not fit in memory. On error the previous configuration stays.
    pub fn init(
        &mut self,
        virtual_size: u64,
        page_size: u64,
        physical_size: u64,
        policy: PagePolicy,
    ) -> Result<()> {
        if page_size == 0 {
            return Err(MemError::InvalidRequest("page size must be non-zero"));
        }
        if virtual_size < page_size || physical_size < page_size {
            return Err(MemError::InvalidRequest("memory sizes must hold at least one page"));
        }

        let to_count = |size: u64| {
            usize::try_from(size / page_size)
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| MemError::InvalidConfiguration(format!("{size} bytes is not a usable page count")))
        };
        let num_pages = to_count(virtual_size)?;
        let num_frames = to_count(physical_size)?;

        self.space = Some(Space {
            virtual_size: virtual_size - virtual_size % page_size,
            physical_size: physical_size - physical_size % page_size,
            page_size,
            policy,
            table: PageTable::new(num_pages, num_frames),
        });
        self.clear_counters();
        info!(num_pages, num_frames, page_size, ?policy, "virtual memory initialized");
        Ok(())
    }

    /// Translates `vaddr`, loading its page on a fault.
    ///
    /// # Errors
    ///
    /// [`MemError::NotInitialized`] before init and [`MemError::OutOfRange`]
    /// for an address past the virtual space; neither changes any state.
    pub fn access(&mut self, vaddr: u64) -> Result<Translation> {
        let vaddr = VirtAddr::new(vaddr);
        let space = self.space.as_mut().ok_or(MemError::NotInitialized)?;
        if vaddr.val() >= space.virtual_size {
            return Err(MemError::OutOfRange {
                addr: vaddr.val(),
                limit: space.virtual_size,
            });
        }

        let now = self.clock.tick();
        self.accesses += 1;
        let virtual_page = vaddr.page(space.page_size);
        let page = virtual_page as usize;

        let resident = space.table.entry_mut(page).filter(|e| e.valid);
        let (frame, outcome) = if let Some(entry) = resident {
            entry.last_access = now;
            self.page_hits += 1;
            (entry.frame, PageOutcome::Hit)
        } else {
            self.page_faults += 1;
            let frame = space.table.victim_frame(space.policy);
            let outcome = match space.table.install(page, frame, now) {
                Some(evicted) => PageOutcome::ReplacedVictim {
                    evicted_page: evicted as u64,
                },
                None => PageOutcome::LoadedIntoFreeFrame,
            };
            debug!(virtual_page, frame, ?outcome, "page fault");
            (frame, outcome)
        };

        Ok(Translation {
            virtual_address: vaddr,
            physical_address: PhysAddr::from_frame(frame, space.page_size, vaddr.page_offset(space.page_size)),
            virtual_page,
            frame,
            outcome,
        })
    }

    /// Unmaps every page and zeroes the counters and clock; the configuration
    /// is kept. Does nothing before init.
    pub fn reset(&mut self) {
        if let Some(space) = self.space.as_mut() {
            space.table.clear();
            self.clear_counters();
        }
    }

    const fn clear_counters(&mut self) {
        self.clock.reset();
        self.accesses = 0;
        self.page_hits = 0;
        self.page_faults = 0;
    }

    /// Entry for `virtual_page`, if the page exists.
    pub fn page_table_entry(&self, virtual_page: u64) -> Option<PageTableEntry> {
        self.space.as_ref()?.table.entry(virtual_page as usize).copied()
    }

    /// Virtual page occupying `frame`, if any.
    pub fn frame_occupant(&self, frame: usize) -> Option<u64> {
        self.space.as_ref()?.table.occupant(frame).map(|page| page as u64)
    }

    /// Snapshot of the geometry and access counters.
    pub fn statistics(&self) -> VmStats {
        let mut stats = VmStats {
            accesses: self.accesses,
            page_hits: self.page_hits,
            page_faults: self.page_faults,
            ..VmStats::default()
        };
        if let Some(space) = &self.space {
            stats.virtual_size = space.virtual_size;
            stats.physical_size = space.physical_size;
            stats.page_size = space.page_size;
            stats.num_virtual_pages = space.table.num_pages();
            stats.num_frames = space.table.num_frames();
        }
        stats
    }
}
