//! # Unit Components
//!
//! Tests for each engine, the configuration layer, and the statistics model.


/// Buddy allocator: rounding, splitting, XOR coalescing, alignment.
pub mod buddy;



/// Error kinds and reason strings.
pub mod error;

/// Composition of the engines through the simulator.
pub mod sim;

/// Derived statistics ratios.
pub mod stats;
