//! Set-Associative Cache Hierarchy Simulator.
//!
//! This module implements an ordered list of independently configured
//! set-associative cache levels. Only tags and bookkeeping are modeled; no data
//! bytes are stored.
//!
//! Every level is probed for every access: a miss at one level does not stop
//! the next one from being evaluated, and a hit does not suppress the levels
//! below it. The first level that hits is reported as the hit level.

/// Cache replacement policy implementations (FIFO, LRU, LFU).
pub mod policies;

use std::fmt;

use tracing::{debug, info};

use self::policies::{FifoPolicy, LfuPolicy, LruPolicy, ReplacementPolicy};
use crate::common::{Clock, MemError, Result};
use crate::config::{CacheHierarchyConfig, CacheLevelConfig, ReplacementPolicy as PolicyType};
use crate::stats::CacheLevelStats;

/// Cache line entry: tag, validity, and replacement bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    /// Whether the line holds a block.
    pub valid: bool,
    /// High-order address bits of the cached block.
    pub tag: u64,
    /// Logical time the line was installed.
    pub insert_time: u64,
    /// Logical time of the most recent hit or install.
    pub last_access: u64,
    /// Accesses since install, starting at 1.
    pub frequency: u64,
}

/// Where one level looked and what it found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelAccess {
    /// Set the address mapped to.
    pub set: usize,
    /// Way that hit, or the way the new line was installed into.
    pub way: usize,
    /// Whether the level hit.
    pub hit: bool,
}

/// Outcome of an access across the whole hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HierarchyAccess {
    /// Index of the first level that hit, if any.
    pub hit_level: Option<usize>,
    /// Per-level outcome, in level order.
    pub levels: Vec<LevelAccess>,
}

impl HierarchyAccess {
    /// Whether any level hit.
    pub const fn is_hit(&self) -> bool {
        self.hit_level.is_some()
    }
}

/// One set-associative cache level.
pub struct CacheLevel {
    config: CacheLevelConfig,
    lines: Vec<CacheLine>,
    num_sets: usize,
    ways: usize,
    block_size: u64,
    clock: Clock,
    stats: CacheLevelStats,
    policy: Box<dyn ReplacementPolicy>,
}

impl fmt::Debug for CacheLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheLevel")
            .field("name", &self.config.name)
            .field("num_sets", &self.num_sets)
            .field("ways", &self.ways)
            .field("block_size", &self.block_size)
            .field("clock", &self.clock)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl CacheLevel {
    /// Creates a level with the replacement policy named by `config`.
    ///
    /// The size is rounded down to a multiple of `block_size * associativity`.
    ///
    /// # Errors
    ///
    /// [`MemError::InvalidConfiguration`] for a zero block size or
    /// associativity, or when the rounded size leaves no sets.
    pub fn new(config: &CacheLevelConfig) -> Result<Self> {
        let policy: Box<dyn ReplacementPolicy> = match config.policy {
            PolicyType::Fifo => Box::new(FifoPolicy),
            PolicyType::Lru => Box::new(LruPolicy),
            PolicyType::Lfu => Box::new(LfuPolicy),
        };
        Self::with_policy(config, policy)
    }

    /// Creates a level that consults `policy` instead of the configured one.
    ///
    /// # Errors
    ///
    /// Same as [`CacheLevel::new`].
    pub fn with_policy(config: &CacheLevelConfig, policy: Box<dyn ReplacementPolicy>) -> Result<Self> {
        let invalid = |reason: &str| MemError::InvalidConfiguration(format!("cache level {}: {reason}", config.name));
        if config.block_size == 0 {
            return Err(invalid("block size must be non-zero"));
        }
        if config.associativity == 0 {
            return Err(invalid("associativity must be non-zero"));
        }
        let set_bytes = config
            .block_size
            .checked_mul(config.associativity)
            .ok_or_else(|| invalid("set size overflows"))?;
        let num_sets = config.size_bytes / set_bytes;
        if num_sets == 0 {
            return Err(invalid("size is smaller than one set"));
        }

        let num_sets = usize::try_from(num_sets).map_err(|_| invalid("too many sets"))?;
        let ways = usize::try_from(config.associativity).map_err(|_| invalid("too many ways"))?;
        info!(
            name = %config.name,
            size = num_sets as u64 * set_bytes,
            num_sets,
            ways,
            policy = ?config.policy,
            "cache level configured"
        );

        Ok(Self {
            config: config.clone(),
            lines: vec![CacheLine::default(); num_sets * ways],
            num_sets,
            ways,
            block_size: config.block_size,
            clock: Clock::new(),
            stats: CacheLevelStats::named(&config.name),
            policy,
        })
    }

    /// The configuration this level was built from.
    pub const fn config(&self) -> &CacheLevelConfig {
        &self.config
    }

    /// Number of sets after rounding.
    pub const fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Ways per set.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// The ways of set `set`, or an empty slice if out of range.
    pub fn lines(&self, set: usize) -> &[CacheLine] {
        set.checked_mul(self.ways)
            .and_then(|base| Some(base..base.checked_add(self.ways)?))
            .and_then(|ways| self.lines.get(ways))
            .unwrap_or_default()
    }

    /// Set index and tag for `addr`.
    fn locate(&self, addr: u64) -> (usize, u64) {
        let block = addr / self.block_size;
        let sets = self.num_sets as u64;
        ((block % sets) as usize, block / sets)
    }

    /// Looks up `addr`, installing it on a miss.
    pub fn access(&mut self, addr: u64) -> LevelAccess {
        let now = self.clock.tick();
        self.stats.accesses += 1;

        let (set, tag) = self.locate(addr);
        let base = set * self.ways;
        let ways = &mut self.lines[base..base + self.ways];

        if let Some(way) = ways.iter().position(|l| l.valid && l.tag == tag) {
            let line = &mut ways[way];
            line.last_access = now;
            line.frequency += 1;
            self.stats.hits += 1;
            return LevelAccess { set, way, hit: true };
        }

        self.stats.misses += 1;
        let way = match ways.iter().position(|l| !l.valid) {
            Some(empty) => empty,
            None => self.policy.victim(ways).min(self.ways - 1),
        };
        debug!(level = %self.config.name, addr, set, way, evicted = ways[way].valid, "cache miss");
        ways[way] = CacheLine {
            valid: true,
            tag,
            insert_time: now,
            last_access: now,
            frequency: 1,
        };
        LevelAccess { set, way, hit: false }
    }

    /// Invalidates every line and zeroes the counters and clock.
    pub fn reset(&mut self) {
        self.lines.fill(CacheLine::default());
        self.clock.reset();
        self.stats = CacheLevelStats::named(&self.config.name);
    }

    /// Snapshot of this level's counters.
    pub fn statistics(&self) -> CacheLevelStats {
        self.stats.clone()
    }
}

/// Ordered list of cache levels, first level first.
///
/// # Examples
///
/// ```
/// use memsim_core::cache::CacheHierarchy;
/// use memsim_core::config::{CacheLevelConfig, ReplacementPolicy};
///
/// let mut cache = CacheHierarchy::new();
/// cache
///     .set_levels(&[CacheLevelConfig::new("L1", 64, 16, 1, ReplacementPolicy::Fifo)])
///     .unwrap();
/// assert!(!cache.access(0).is_hit());
/// assert_eq!(cache.access(0).hit_level, Some(0));
/// ```
#[derive(Debug, Default)]
pub struct CacheHierarchy {
    levels: Vec<CacheLevel>,
}

impl CacheHierarchy {
    /// Creates a hierarchy with no levels.
    pub const fn new() -> Self {
        Self { levels: Vec::new() }
    }

    /// Builds every level of `config`.
    ///
    /// # Errors
    ///
    /// The first [`MemError::InvalidConfiguration`] raised by a level.
    pub fn from_config(config: &CacheHierarchyConfig) -> Result<Self> {
        let mut hierarchy = Self::new();
        hierarchy.set_levels(&config.levels)?;
        Ok(hierarchy)
    }

    /// Replaces every level. On error the current levels are kept.
    ///
    /// # Errors
    ///
    /// The first [`MemError::InvalidConfiguration`] raised by a level.
    pub fn set_levels(&mut self, configs: &[CacheLevelConfig]) -> Result<()> {
        self.levels = configs.iter().map(CacheLevel::new).collect::<Result<_>>()?;
        Ok(())
    }

    /// Appends an already built level, e.g. one with a custom policy.
    pub fn push_level(&mut self, level: CacheLevel) {
        self.levels.push(level);
    }

    /// The configured levels.
    pub fn levels(&self) -> &[CacheLevel] {
        &self.levels
    }

    /// Whether no levels are configured.
    pub const fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Probes every level with `addr`.
    pub fn access(&mut self, addr: u64) -> HierarchyAccess {
        let levels: Vec<LevelAccess> = self.levels.iter_mut().map(|level| level.access(addr)).collect();
        HierarchyAccess {
            hit_level: levels.iter().position(|l| l.hit),
            levels,
        }
    }

    /// Resets every level.
    pub fn reset(&mut self) {
        self.levels.iter_mut().for_each(CacheLevel::reset);
    }

    /// Per-level snapshots in level order.
    pub fn statistics(&self) -> Vec<CacheLevelStats> {
        self.levels.iter().map(CacheLevel::statistics).collect()
    }
}
