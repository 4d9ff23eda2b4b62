//! Simulator composition root.
//!
//! Owns one instance of every engine, each built from its section of a
//! [`Config`]. The engines never call each other; the only hand-off is
//! [`Simulator::translate_and_access`], which feeds a virtual-memory
//! translation's physical address into the cache hierarchy.

use tracing::info;

use crate::alloc::AllocationEngine;
use crate::buddy::BuddyAllocationEngine;
use crate::cache::{CacheHierarchy, HierarchyAccess};
use crate::common::Result;
use crate::config::Config;
use crate::vm::{Translation, VirtualMemoryEngine};

/// A translation followed by the cache probe of its physical address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryAccess {
    /// The virtual-memory side of the access.
    pub translation: Translation,
    /// The cache side of the access.
    pub cache: HierarchyAccess,
}

/// One of each engine, ready to be driven.
///
/// # Examples
///
/// ```
/// use memsim_core::{Config, Simulator};
///
/// let mut sim = Simulator::new(&Config::default()).unwrap();
/// let first = sim.translate_and_access(0x40).unwrap();
/// assert!(first.translation.page_fault());
/// assert!(!first.cache.is_hit());
/// let again = sim.translate_and_access(0x40).unwrap();
/// assert!(again.cache.is_hit());
/// ```
#[derive(Debug)]
pub struct Simulator {
    /// Free-list allocator.
    pub allocator: AllocationEngine,
    /// Buddy allocator.
    pub buddy: BuddyAllocationEngine,
    /// Cache hierarchy.
    pub cache: CacheHierarchy,
    /// Virtual memory.
    pub vm: VirtualMemoryEngine,
}

impl Simulator {
    /// Builds and initializes every engine from `config`.
    ///
    /// # Errors
    ///
    /// The first error raised while initializing an engine.
    pub fn new(config: &Config) -> Result<Self> {
        let sim = Self {
            allocator: AllocationEngine::from_config(&config.allocator)?,
            buddy: BuddyAllocationEngine::from_config(&config.buddy)?,
            cache: CacheHierarchy::from_config(&config.cache)?,
            vm: VirtualMemoryEngine::from_config(&config.vm)?,
        };
        info!(cache_levels = sim.cache.levels().len(), "simulator ready");
        Ok(sim)
    }

    /// Translates `vaddr` and submits the physical address to the cache.
    ///
    /// # Errors
    ///
    /// Errors of [`VirtualMemoryEngine::access`]; the cache is not touched
    /// when translation fails.
    pub fn translate_and_access(&mut self, vaddr: u64) -> Result<MemoryAccess> {
        let translation = self.vm.access(vaddr)?;
        let cache = self.cache.access(translation.physical_address.val());
        Ok(MemoryAccess { translation, cache })
    }
}
