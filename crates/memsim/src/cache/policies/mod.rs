//! Cache Replacement Policies.
//!
//! Select the victim way of a full set from the timestamps and counters kept on
//! each [`CacheLine`]. Policies are only consulted once every way of the set is
//! valid; empty ways are always filled first by the level itself.
//!
//! # Policies
//!
//! - `Fifo`: oldest insertion time.
//! - `Lru`: oldest last-access time.
//! - `Lfu`: lowest access frequency.
//!
//! Every policy resolves ties in favour of the lowest way index.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Frequently Used replacement policy.
pub mod lfu;

/// Least Recently Used replacement policy.
pub mod lru;

pub use fifo::FifoPolicy;
pub use lfu::LfuPolicy;
pub use lru::LruPolicy;

use super::CacheLine;

/// Trait for cache replacement policies.
pub trait ReplacementPolicy: Send + Sync {
    /// Selects the way to evict from a full set.
    ///
    /// # Arguments
    ///
    /// * `set` - The ways of the set, all valid, in way order.
    ///
    /// # Returns
    ///
    /// The index of the way to evict.
    fn victim(&self, set: &[CacheLine]) -> usize;
}

/// Way index of the first line minimizing `key`; 0 for an empty set.
pub(crate) fn first_min_by_key<K: Ord>(set: &[CacheLine], key: impl Fn(&CacheLine) -> K) -> usize {
    set.iter()
        .enumerate()
        .min_by_key(|(_, line)| key(line))
        .map_or(0, |(way, _)| way)
}
