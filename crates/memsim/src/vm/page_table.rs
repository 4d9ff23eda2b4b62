//! Single-level page table and reverse frame table.
//!
//! The page table holds one entry per virtual page; the frame table maps each
//! physical frame back to the page occupying it. A valid entry's frame always
//! points back at that entry's page.

use crate::config::PagePolicy;

/// A single entry in the page table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageTableEntry {
    /// Whether the page is resident.
    pub valid: bool,
    /// Frame holding the page (meaningful only when valid).
    pub frame: usize,
    /// Logical time the page was loaded.
    pub load_time: u64,
    /// Logical time of the most recent access.
    pub last_access: u64,
}

/// Page table plus the frame → page reverse mapping.
#[derive(Clone, Debug)]
pub(crate) struct PageTable {
    entries: Vec<PageTableEntry>,
    frames: Vec<Option<usize>>,
}

impl PageTable {
    pub(crate) fn new(num_pages: usize, num_frames: usize) -> Self {
        Self {
            entries: vec![PageTableEntry::default(); num_pages],
            frames: vec![None; num_frames],
        }
    }

    pub(crate) fn entry(&self, page: usize) -> Option<&PageTableEntry> {
        self.entries.get(page)
    }

    pub(crate) fn entry_mut(&mut self, page: usize) -> Option<&mut PageTableEntry> {
        self.entries.get_mut(page)
    }

    pub(crate) fn occupant(&self, frame: usize) -> Option<usize> {
        self.frames.get(frame).copied().flatten()
    }

    pub(crate) fn num_pages(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Frame to load into: the first empty frame, else the policy's victim.
    pub(crate) fn victim_frame(&self, policy: PagePolicy) -> usize {
        if let Some(empty) = self.frames.iter().position(Option::is_none) {
            return empty;
        }
        let age = |page: usize| {
            let entry = &self.entries[page];
            match policy {
                PagePolicy::Fifo => entry.load_time,
                PagePolicy::Lru => entry.last_access,
            }
        };
        self.frames
            .iter()
            .enumerate()
            .filter_map(|(frame, page)| page.map(|p| (frame, age(p))))
            .min_by_key(|&(_, time)| time)
            .map_or(0, |(frame, _)| frame)
    }

    /// Maps `page` into `frame`, invalidating the previous occupant.
    /// Returns the evicted page, if any.
    pub(crate) fn install(&mut self, page: usize, frame: usize, now: u64) -> Option<usize> {
        let evicted = self.frames[frame].replace(page);
        if let Some(old) = evicted {
            self.entries[old].valid = false;
        }
        self.entries[page] = PageTableEntry {
            valid: true,
            frame,
            load_time: now,
            last_access: now,
        };
        evicted
    }

    pub(crate) fn clear(&mut self) {
        self.entries.fill(PageTableEntry::default());
        self.frames.fill(None);
    }
}
