//! Index-stable slot arena.
//!
//! Nodes are addressed by `usize` slot indices instead of pointers. A removed
//! slot is recycled by the next insertion (most recently vacated first), so the
//! slot sequence depends only on the operation sequence.

/// Vector of optional slots plus a stack of vacated indices.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    vacant: Vec<usize>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Stores `value` and returns its slot index.
    pub(crate) fn insert(&mut self, value: T) -> usize {
        if let Some(idx) = self.vacant.pop()
            && let Some(slot) = self.slots.get_mut(idx)
        {
            *slot = Some(value);
            idx
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        }
    }

    /// Vacates `idx`, returning the value that lived there.
    pub(crate) fn remove(&mut self, idx: usize) -> Option<T> {
        let value = self.slots.get_mut(idx)?.take()?;
        self.vacant.push(idx);
        Some(value)
    }

    /// The value in `idx`, or `None` if the slot is vacant or was never used.
    pub(crate) fn get(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.slots.get_mut(idx)?.as_mut()
    }

    /// Live values in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }

    /// Number of live values.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }
}
