//! Fit strategies.
//!
//! A strategy only chooses the candidate; splitting and bookkeeping are shared
//! by the engine. Candidates are visited in ascending address order.
//!
//! # Tie-breaking
//!
//! - `FirstFit`: the first block with enough capacity.
//! - `BestFit`: the smallest remainder; the first block achieving it wins, and
//!   an exact fit stops the scan.
//! - `WorstFit`: the largest block; strict comparison, so the first block
//!   reaching the maximum wins.

use crate::config::FitStrategy;

impl FitStrategy {
    /// Human-readable strategy name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstFit => "First Fit",
            Self::BestFit => "Best Fit",
            Self::WorstFit => "Worst Fit",
        }
    }

    /// Picks the slot of the free block to carve `size` bytes from.
    ///
    /// `candidates` yields `(slot, capacity)` pairs in address order.
    pub(crate) fn select<I>(self, candidates: I, size: u64) -> Option<usize>
    where
        I: IntoIterator<Item = (usize, u64)>,
    {
        let mut fits = candidates.into_iter().filter(|&(_, cap)| cap >= size);
        match self {
            Self::FirstFit => fits.next().map(|(slot, _)| slot),
            Self::BestFit => {
                let mut best: Option<(usize, u64)> = None;
                for (slot, cap) in fits {
                    let diff = cap - size;
                    if best.is_none_or(|(_, smallest)| diff < smallest) {
                        best = Some((slot, diff));
                        if diff == 0 {
                            break;
                        }
                    }
                }
                best.map(|(slot, _)| slot)
            }
            Self::WorstFit => {
                let mut worst: Option<(usize, u64)> = None;
                for (slot, cap) in fits {
                    if worst.is_none_or(|(_, largest)| cap > largest) {
                        worst = Some((slot, cap));
                    }
                }
                worst.map(|(slot, _)| slot)
            }
        }
    }
}
