//! Logical clock.
//!
//! Each cache level and the virtual-memory engine owns one. It advances once per
//! access and stamps insertion/last-access times; it is never wall-clock time.

/// Monotonic logical time counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    now: u64,
}

impl Clock {
    /// Creates a clock at time zero.
    pub const fn new() -> Self {
        Self { now: 0 }
    }

    /// Advances the clock by one and returns the new time.
    #[inline]
    pub const fn tick(&mut self) -> u64 {
        self.now += 1;
        self.now
    }

    /// Current time without advancing.
    #[inline]
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Rewinds the clock to zero.
    pub const fn reset(&mut self) {
        self.now = 0;
    }
}
