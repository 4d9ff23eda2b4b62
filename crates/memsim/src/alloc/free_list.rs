//! Address-ordered free list over a block arena.
//!
//! Every block (free or allocated) lives in one [`Arena`]. Only free blocks are
//! threaded onto the doubly linked list through `prev`/`next` slot indices, and
//! the list is kept sorted by ascending address. After a release settles no two
//! listed blocks are contiguous.

use super::arena::Arena;
use crate::common::BlockId;

/// A region of the managed space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryBlock {
    /// Start address.
    pub address: u64,
    /// Length in bytes.
    pub size: u64,
    /// Whether the block is handed out.
    pub allocated: bool,
}

impl MemoryBlock {
    /// First address past the block.
    pub const fn end(&self) -> u64 {
        self.address + self.size
    }
}

#[derive(Clone, Debug)]
struct Node {
    block: MemoryBlock,
    owner: Option<BlockId>,
    prev: Option<usize>,
    next: Option<usize>,
}

impl Node {
    const fn free(address: u64, size: u64) -> Self {
        Self {
            block: MemoryBlock {
                address,
                size,
                allocated: false,
            },
            owner: None,
            prev: None,
            next: None,
        }
    }
}

/// Block storage plus the address-ordered list of free blocks.
#[derive(Clone, Debug)]
pub(crate) struct FreeList {
    nodes: Arena<Node>,
    head: Option<usize>,
    free_count: usize,
}

impl FreeList {
    /// Seeds a single free block covering `[0, total)`.
    pub(crate) fn new(total: u64) -> Self {
        let mut nodes = Arena::new();
        let head = nodes.insert(Node::free(0, total));
        Self {
            nodes,
            head: Some(head),
            free_count: 1,
        }
    }

    /// The block stored in slot `idx`, if the slot is live.
    pub(crate) fn block(&self, idx: usize) -> Option<MemoryBlock> {
        self.nodes.get(idx).map(|n| n.block)
    }

    /// Free blocks in address order as `(slot, block)`.
    pub(crate) fn iter(&self) -> FreeIter<'_> {
        FreeIter {
            list: self,
            cursor: self.head,
        }
    }

    pub(crate) const fn free_count(&self) -> usize {
        self.free_count
    }

    /// Allocated blocks currently stored in the arena.
    pub(crate) fn allocated_count(&self) -> usize {
        self.nodes.len() - self.free_count
    }

    pub(crate) fn free_bytes(&self) -> u64 {
        self.iter().map(|(_, b)| b.size).sum()
    }

    pub(crate) fn largest_free(&self) -> u64 {
        self.iter().map(|(_, b)| b.size).max().unwrap_or(0)
    }

    /// Every block with its owning id, sorted by address.
    pub(crate) fn blocks(&self) -> Vec<(MemoryBlock, Option<BlockId>)> {
        let mut all: Vec<_> = self.nodes.iter().map(|n| (n.block, n.owner)).collect();
        all.sort_by_key(|(b, _)| b.address);
        all
    }

    /// Hands out `size` bytes from the low end of free block `idx`.
    ///
    /// An exact fit detaches the whole block; otherwise a new allocated block is
    /// carved at the candidate's address and the candidate shrinks upward.
    /// Returns the slot and extent of the allocated block, or `None` if `idx`
    /// is not a live slot.
    pub(crate) fn carve(&mut self, idx: usize, size: u64, owner: BlockId) -> Option<(usize, MemoryBlock)> {
        let candidate = self.block(idx)?;
        debug_assert!(!candidate.allocated && candidate.size >= size);

        let taken = if candidate.size == size {
            self.unlink(idx)?;
            idx
        } else {
            let node = &mut self.nodes.get_mut(idx)?.block;
            node.address += size;
            node.size -= size;
            self.nodes.insert(Node::free(candidate.address, size))
        };

        let node = self.nodes.get_mut(taken)?;
        node.block.allocated = true;
        node.owner = Some(owner);
        Some((taken, node.block))
    }

    /// Returns allocated block `idx` to the list and coalesces it with
    /// contiguous neighbours. Returns the resulting free block, or `None` if
    /// `idx` is not a live slot.
    pub(crate) fn release(&mut self, idx: usize) -> Option<MemoryBlock> {
        let node = self.nodes.get_mut(idx)?;
        node.block.allocated = false;
        node.owner = None;
        self.insert_sorted(idx)?;

        let mut merged = idx;
        let (prev, next) = self.nodes.get(merged).map(|n| (n.prev, n.next))?;
        if let Some(next) = next
            && self.block(merged)?.end() == self.block(next)?.address
        {
            self.absorb(merged, next)?;
        }
        if let Some(prev) = prev
            && self.block(prev)?.end() == self.block(merged)?.address
        {
            self.absorb(prev, merged)?;
            merged = prev;
        }
        self.block(merged)
    }

    /// Grows `keep` by the size of its list successor `gone` and drops `gone`.
    fn absorb(&mut self, keep: usize, gone: usize) -> Option<()> {
        let size = self.block(gone)?.size;
        self.unlink(gone)?;
        self.nodes.get_mut(keep)?.block.size += size;
        self.nodes.remove(gone).map(drop)
    }

    fn insert_sorted(&mut self, idx: usize) -> Option<()> {
        let address = self.block(idx)?.address;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(cur) = cursor {
            let node = self.nodes.get(cur)?;
            if node.block.address > address {
                break;
            }
            prev = Some(cur);
            cursor = node.next;
        }

        let node = self.nodes.get_mut(idx)?;
        node.prev = prev;
        node.next = cursor;
        match prev {
            Some(p) => self.nodes.get_mut(p)?.next = Some(idx),
            None => self.head = Some(idx),
        }
        if let Some(n) = cursor {
            self.nodes.get_mut(n)?.prev = Some(idx);
        }
        self.free_count += 1;
        Some(())
    }

    fn unlink(&mut self, idx: usize) -> Option<()> {
        let node = self.nodes.get_mut(idx)?;
        let (prev, next) = (node.prev.take(), node.next.take());
        match prev {
            Some(p) => self.nodes.get_mut(p)?.next = next,
            None => self.head = next,
        }
        if let Some(n) = next {
            self.nodes.get_mut(n)?.prev = prev;
        }
        self.free_count -= 1;
        Some(())
    }
}

/// Iterator over the free list in address order.
#[derive(Debug)]
pub(crate) struct FreeIter<'a> {
    list: &'a FreeList,
    cursor: Option<usize>,
}

impl Iterator for FreeIter<'_> {
    type Item = (usize, MemoryBlock);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = self.list.nodes.get(idx)?;
        self.cursor = node.next;
        Some((idx, node.block))
    }
}
