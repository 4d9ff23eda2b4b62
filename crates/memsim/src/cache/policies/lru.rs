//! Least Recently Used (LRU) Replacement Policy.
//!
//! Evicts the line whose last access lies furthest in the past. Every hit and
//! every install stamps the line with the level's logical time, so the oldest
//! stamp identifies the least recently used way.
//!
//! # Performance
//!
//! - **Time Complexity:** `victim()`: O(W) where W is the associativity
//! - **Best Case:** Accesses with good temporal locality
//! - **Worst Case:** Scanning patterns larger than the set (thrashing)

use super::{ReplacementPolicy, first_min_by_key};
use crate::cache::CacheLine;

/// LRU Policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct LruPolicy;

impl ReplacementPolicy for LruPolicy {
    fn victim(&self, set: &[CacheLine]) -> usize {
        first_min_by_key(set, |line| line.last_access)
    }
}
