//! Least Frequently Used (LFU) Replacement Policy.
//!
//! Evicts the line with the fewest accesses since it was installed. A freshly
//! installed line starts at frequency 1. Among equally cold lines the lowest
//! way wins, which makes LFU degrade to way-order eviction on streaming input.

use super::{ReplacementPolicy, first_min_by_key};
use crate::cache::CacheLine;

/// LFU Policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct LfuPolicy;

impl ReplacementPolicy for LfuPolicy {
    fn victim(&self, set: &[CacheLine]) -> usize {
        first_min_by_key(set, |line| line.frequency)
    }
}
