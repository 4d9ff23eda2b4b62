//! Deterministic memory-management simulator library.
//!
//! This crate models three classical memory-management subsystems with the following:
//! 1. **Allocation:** Free-list allocator with first/best/worst fit placement, splitting, and coalescing.
//! 2. **Buddy:** Power-of-two buddy allocator with per-order free buckets and XOR buddy merging.
//! 3. **Cache:** Multi-level set-associative cache hierarchy with FIFO, LRU, and LFU replacement.
//! 4. **Virtual memory:** Single-level page table over a fixed frame pool with FIFO/LRU eviction.
//!
//! Only addresses, sizes, and metadata are tracked; no data bytes are stored. Every engine
//! is single-threaded and driven by a logical clock, so an identical operation sequence
//! always produces identical results.

/// Common types (addresses, block ids, logical clock, errors).
pub mod common;
/// Simulator configuration (defaults, enums, per-engine config structures).
pub mod config;
/// Free-list allocator with pluggable fit strategies.
pub mod alloc;
/// Power-of-two buddy allocator.
pub mod buddy;
/// Set-associative cache levels and the cache hierarchy.
pub mod cache;
/// Paged virtual memory with frame replacement.
pub mod vm;
/// Statistics snapshots for every engine.
pub mod stats;
/// Composition root owning one of each engine.
pub mod sim;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Error type returned by every engine operation.
pub use crate::common::{MemError, Result};
/// Composition root; construct with `Simulator::new`.
pub use crate::sim::Simulator;
