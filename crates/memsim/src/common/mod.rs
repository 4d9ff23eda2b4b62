//! Common utilities and types shared by every simulation engine.
//!
//! This module provides:
//! 1. **Address Types:** Strong types for virtual and physical addresses.
//! 2. **Block Ids:** Monotonic, never-reused handles for allocated blocks.
//! 3. **Logical Time:** A per-engine counter used for FIFO/LRU ordering.
//! 4. **Error Handling:** The error taxonomy reported by every engine.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Block id type and id issuing.
pub mod block_id;

/// Logical clock used for replacement ordering.
pub mod clock;

/// Error types.
pub mod error;

pub use addr::{PhysAddr, VirtAddr};
pub use block_id::BlockId;
pub use clock::Clock;
pub use error::{ErrorKind, MemError, Result};
