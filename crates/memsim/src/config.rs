//! Configuration system for the memory simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the engines. It provides:
//! 1. **Defaults:** Baseline sizes for the allocators, cache levels, and virtual memory.
//! 2. **Structures:** One config per engine, grouped under [`Config`].
//! 3. **Enums:** Fit strategy, cache replacement policy, and page replacement policy.
//!
//! Configuration is deserialized from JSON (`Config::from_json` / `Config::from_file`)
//! or built with `Config::default()`.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default configuration constants for the simulator.
///
/// These values apply whenever a field is omitted from the JSON input.
mod defaults {
    /// Managed space of the free-list allocator (4 KiB).
    pub const ALLOC_TOTAL_SIZE: u64 = 4096;

    /// Managed space of the buddy allocator (1 KiB).
    pub const BUDDY_TOTAL_SIZE: u64 = 1024;

    /// Smallest block the buddy allocator hands out (32 bytes).
    pub const BUDDY_MIN_BLOCK: u64 = 32;

    /// Default cache level size in bytes (1 KiB).
    pub const CACHE_SIZE: u64 = 1024;

    /// Default cache block size in bytes (64 bytes).
    pub const CACHE_BLOCK: u64 = 64;

    /// Default cache associativity (1 way = direct-mapped).
    pub const CACHE_WAYS: u64 = 1;

    /// Default virtual address space size (4 KiB, 16 pages).
    pub const VM_VIRTUAL_SIZE: u64 = 4096;

    /// Default page size (256 bytes).
    pub const VM_PAGE_SIZE: u64 = 256;

    /// Default physical memory size (1 KiB, 4 frames).
    pub const VM_PHYSICAL_SIZE: u64 = 1024;
}

/// Placement strategy of the free-list allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStrategy {
    /// First block in address order large enough for the request.
    #[default]
    #[serde(alias = "FirstFit")]
    FirstFit,
    /// Block leaving the smallest remainder; an exact fit ends the search.
    #[serde(alias = "BestFit")]
    BestFit,
    /// Largest block; the first block reaching the maximum wins ties.
    #[serde(alias = "WorstFit")]
    WorstFit,
}

/// Cache line replacement policy.
///
/// Invalid ways are always filled first; the policy only decides among valid
/// lines, and ties go to the lowest way index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Evicts the line with the oldest insertion time.
    #[default]
    #[serde(alias = "Fifo")]
    Fifo,
    /// Evicts the line with the oldest last-access time.
    #[serde(alias = "Lru")]
    Lru,
    /// Evicts the line with the lowest access frequency.
    #[serde(alias = "Lfu")]
    Lfu,
}

/// Page replacement policy of the virtual-memory engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PagePolicy {
    /// Evicts the resident page that was loaded first.
    #[default]
    #[serde(alias = "Fifo")]
    Fifo,
    /// Evicts the resident page accessed least recently.
    #[serde(alias = "Lru")]
    Lru,
}

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The input is not valid configuration JSON.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The configuration file could not be read.
    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// Root configuration structure containing every engine's settings.
///
/// # Examples
///
/// ```
/// use memsim_core::config::{Config, FitStrategy, PagePolicy, ReplacementPolicy};
///
/// let json = r#"{
///     "allocator": { "total_size": 1000, "strategy": "best_fit" },
///     "buddy": { "total_size": 1024, "min_block_size": 32 },
///     "cache": {
///         "levels": [
///             { "name": "L1", "size_bytes": 64, "block_size": 16, "associativity": 1, "policy": "LRU" },
///             { "name": "L2", "size_bytes": 256, "block_size": 16, "associativity": 4, "policy": "LFU" }
///         ]
///     },
///     "vm": { "virtual_size": 4096, "page_size": 256, "physical_size": 1024, "policy": "FIFO" }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.allocator.strategy, FitStrategy::BestFit);
/// assert_eq!(config.cache.levels.len(), 2);
/// assert_eq!(config.cache.levels[1].policy, ReplacementPolicy::Lfu);
/// assert_eq!(config.vm.policy, PagePolicy::Fifo);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Free-list allocator configuration
    #[serde(default)]
    pub allocator: AllocatorConfig,
    /// Buddy allocator configuration
    #[serde(default)]
    pub buddy: BuddyConfig,
    /// Cache hierarchy configuration
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
    /// Virtual memory configuration
    #[serde(default)]
    pub vm: VmConfig,
}

impl Config {
    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] when the input is malformed.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Json`] when its content is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Free-list allocator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AllocatorConfig {
    /// Managed space in bytes
    #[serde(default = "AllocatorConfig::default_total_size")]
    pub total_size: u64,

    /// Placement strategy
    #[serde(default)]
    pub strategy: FitStrategy,
}

impl AllocatorConfig {
    /// Returns the default managed space in bytes.
    const fn default_total_size() -> u64 {
        defaults::ALLOC_TOTAL_SIZE
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            total_size: defaults::ALLOC_TOTAL_SIZE,
            strategy: FitStrategy::default(),
        }
    }
}

/// Buddy allocator configuration.
///
/// Both sizes are rounded up to a power of two at initialization.
#[derive(Debug, Clone, Deserialize)]
pub struct BuddyConfig {
    /// Managed space in bytes
    #[serde(default = "BuddyConfig::default_total_size")]
    pub total_size: u64,

    /// Smallest block size in bytes
    #[serde(default = "BuddyConfig::default_min_block")]
    pub min_block_size: u64,
}

impl BuddyConfig {
    /// Returns the default managed space in bytes.
    const fn default_total_size() -> u64 {
        defaults::BUDDY_TOTAL_SIZE
    }

    /// Returns the default minimum block size in bytes.
    const fn default_min_block() -> u64 {
        defaults::BUDDY_MIN_BLOCK
    }
}

impl Default for BuddyConfig {
    fn default() -> Self {
        Self {
            total_size: defaults::BUDDY_TOTAL_SIZE,
            min_block_size: defaults::BUDDY_MIN_BLOCK,
        }
    }
}

/// Cache hierarchy configuration; levels are probed in the listed order.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheHierarchyConfig {
    /// Ordered cache levels (closest to the core first)
    #[serde(default = "CacheHierarchyConfig::default_levels")]
    pub levels: Vec<CacheLevelConfig>,
}

impl CacheHierarchyConfig {
    /// Returns a single direct-mapped, 1 KiB level named `L1`.
    fn default_levels() -> Vec<CacheLevelConfig> {
        vec![CacheLevelConfig::default()]
    }
}

impl Default for CacheHierarchyConfig {
    fn default() -> Self {
        Self {
            levels: Self::default_levels(),
        }
    }
}

/// Individual cache level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheLevelConfig {
    /// Level name used in statistics (e.g. `L1`)
    #[serde(default = "CacheLevelConfig::default_name")]
    pub name: String,

    /// Total level size in bytes
    #[serde(default = "CacheLevelConfig::default_size")]
    pub size_bytes: u64,

    /// Cache block (line) size in bytes
    #[serde(default = "CacheLevelConfig::default_block")]
    pub block_size: u64,

    /// Associativity (number of ways per set)
    #[serde(default = "CacheLevelConfig::default_ways")]
    pub associativity: u64,

    /// Replacement policy
    #[serde(default)]
    pub policy: ReplacementPolicy,
}

impl CacheLevelConfig {
    /// Builds a level configuration.
    pub fn new(
        name: impl Into<String>,
        size_bytes: u64,
        block_size: u64,
        associativity: u64,
        policy: ReplacementPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            block_size,
            associativity,
            policy,
        }
    }

    /// Returns the default level name.
    fn default_name() -> String {
        "L1".to_string()
    }

    /// Returns the default level size in bytes.
    const fn default_size() -> u64 {
        defaults::CACHE_SIZE
    }

    /// Returns the default block size in bytes.
    const fn default_block() -> u64 {
        defaults::CACHE_BLOCK
    }

    /// Returns the default associativity.
    const fn default_ways() -> u64 {
        defaults::CACHE_WAYS
    }
}

impl Default for CacheLevelConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            size_bytes: defaults::CACHE_SIZE,
            block_size: defaults::CACHE_BLOCK,
            associativity: defaults::CACHE_WAYS,
            policy: ReplacementPolicy::default(),
        }
    }
}

/// Virtual memory configuration.
///
/// Both sizes are truncated down to a multiple of `page_size` at initialization.
#[derive(Debug, Clone, Deserialize)]
pub struct VmConfig {
    /// Virtual address space size in bytes
    #[serde(default = "VmConfig::default_virtual_size")]
    pub virtual_size: u64,

    /// Page (and frame) size in bytes
    #[serde(default = "VmConfig::default_page_size")]
    pub page_size: u64,

    /// Physical memory size in bytes
    #[serde(default = "VmConfig::default_physical_size")]
    pub physical_size: u64,

    /// Page replacement policy
    #[serde(default)]
    pub policy: PagePolicy,
}

impl VmConfig {
    /// Returns the default virtual address space size.
    const fn default_virtual_size() -> u64 {
        defaults::VM_VIRTUAL_SIZE
    }

    /// Returns the default page size.
    const fn default_page_size() -> u64 {
        defaults::VM_PAGE_SIZE
    }

    /// Returns the default physical memory size.
    const fn default_physical_size() -> u64 {
        defaults::VM_PHYSICAL_SIZE
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            virtual_size: defaults::VM_VIRTUAL_SIZE,
            page_size: defaults::VM_PAGE_SIZE,
            physical_size: defaults::VM_PHYSICAL_SIZE,
            policy: PagePolicy::default(),
        }
    }
}
