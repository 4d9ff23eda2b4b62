//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! Evicts the line that was installed earliest, regardless of how recently or
//! how often it has been accessed since. Hits do not refresh a line's position.
//!
//! # Performance
//!
//! - **Time Complexity:** `victim()`: O(W) where W is the associativity
//! - **Space Complexity:** none beyond the per-line insertion time
//! - **Worst Case:** Workloads with strong temporal locality (may evict hot lines)

use super::{ReplacementPolicy, first_min_by_key};
use crate::cache::CacheLine;

/// FIFO Policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct FifoPolicy;

impl ReplacementPolicy for FifoPolicy {
    fn victim(&self, set: &[CacheLine]) -> usize {
        first_min_by_key(set, |line| line.insert_time)
    }
}
