//! # Simulator Tests
//!
//! Construction from configuration and the virtual-memory to cache hand-off.

use memsim_core::common::{ErrorKind, MemError, PhysAddr};
use memsim_core::vm::PageOutcome;
use memsim_core::{Config, Simulator};
use pretty_assertions::assert_eq;

use crate::common::init_tracing;

fn two_level() -> Config {
    Config::from_json(
        r#"{
            "cache": { "levels": [
                { "name": "L1", "size_bytes": 64, "block_size": 16, "associativity": 1, "policy": "FIFO" },
                { "name": "L2", "size_bytes": 256, "block_size": 16, "associativity": 4, "policy": "LRU" }
            ] },
            "vm": { "virtual_size": 4096, "page_size": 256, "physical_size": 512, "policy": "LRU" }
        }"#,
    )
    .unwrap()
}

#[test]
fn test_new_initializes_every_engine() {
    init_tracing();
    let sim = Simulator::new(&Config::default()).unwrap();
    assert!(sim.allocator.is_initialized());
    assert!(sim.buddy.is_initialized());
    assert!(sim.vm.is_initialized());
    assert_eq!(sim.cache.levels().len(), 1);
}

#[test]
fn test_new_reports_first_bad_engine() {
    let config = Config::from_json(r#"{ "buddy": { "total_size": 64, "min_block_size": 128 } }"#).unwrap();
    let err = Simulator::new(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
}

#[test]
fn test_translated_address_reaches_cache() {
    init_tracing();
    let mut sim = Simulator::new(&two_level()).unwrap();

    // Page 3 lands in frame 0, so the cache sees physical 0x10.
    let first = sim.translate_and_access(0x310).unwrap();
    assert_eq!(first.translation.physical_address, PhysAddr(0x10));
    assert_eq!(first.translation.outcome, PageOutcome::LoadedIntoFreeFrame);
    assert_eq!(first.cache.hit_level, None);
    assert_eq!(first.cache.levels[0].set, 1);

    let second = sim.translate_and_access(0x314).unwrap();
    assert!(!second.translation.page_fault());
    assert_eq!(second.cache.hit_level, Some(0));

    let stats = sim.cache.statistics();
    assert_eq!((stats[0].accesses, stats[0].hits), (2, 1));
    assert_eq!((stats[1].accesses, stats[1].hits), (2, 1));
}

#[test]
fn test_failed_translation_skips_cache() {
    let mut sim = Simulator::new(&two_level()).unwrap();
    assert_eq!(
        sim.translate_and_access(4096).unwrap_err(),
        MemError::OutOfRange { addr: 4096, limit: 4096 }
    );
    assert!(sim.cache.statistics().iter().all(|s| s.accesses == 0));
}

#[test]
fn test_engines_are_independent() {
    let mut sim = Simulator::new(&Config::default()).unwrap();
    let block = sim.allocator.allocate(128).unwrap();
    let buddy = sim.buddy.allocate(128).unwrap();
    let _ = sim.translate_and_access(0).unwrap();

    assert_eq!((block.address, buddy.address), (0, 0));
    assert_eq!(sim.vm.statistics().accesses, 1);
    assert_eq!(sim.allocator.statistics().num_allocations, 1);
}
