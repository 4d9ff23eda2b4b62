//! Shared test helpers.

/// Mock implementations of the crate's extension traits.
pub mod mocks;

use memsim_core::config::{CacheLevelConfig, ReplacementPolicy};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Level configuration with the given geometry and policy.
pub fn level(name: &str, size: u64, block: u64, ways: u64, policy: ReplacementPolicy) -> CacheLevelConfig {
    CacheLevelConfig::new(name, size, block, ways, policy)
}
