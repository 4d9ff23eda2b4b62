//! # Buddy Allocator Tests
//!
//! Power-of-two rounding, splitting to the low half, XOR buddy coalescing,
//! fragmentation accounting, and alignment properties.

use memsim_core::alloc::BlockState;
use memsim_core::buddy::{BuddyAllocationEngine, SizeClass};
use memsim_core::common::{BlockId, ErrorKind, MemError};
use memsim_core::config::BuddyConfig;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::init_tracing;

fn buddy(total: u64, min: u64) -> BuddyAllocationEngine {
    init_tracing();
    let mut engine = BuddyAllocationEngine::new();
    engine.init(total, min).unwrap();
    engine
}

fn class(block_size: u64, addresses: &[u64]) -> SizeClass {
    SizeClass {
        block_size,
        addresses: addresses.to_vec(),
    }
}

// ──────────────────────────────────────────────────────────
// Splitting and coalescing
// ──────────────────────────────────────────────────────────

#[test]
fn test_split_then_collapse() {
    let mut engine = buddy(1024, 32);

    let a = engine.allocate(100).unwrap();
    assert_eq!((a.id, a.address, a.requested, a.actual_size), (BlockId(1), 0, 100, 128));
    assert_eq!(
        engine.free_lists(),
        vec![class(128, &[128]), class(256, &[256]), class(512, &[512])]
    );

    let b = engine.allocate(100).unwrap();
    assert_eq!((b.address, b.actual_size), (128, 128));

    let _ = engine.deallocate(a.id).unwrap();
    let _ = engine.deallocate(b.id).unwrap();
    assert_eq!(engine.free_lists(), vec![class(1024, &[0])]);
    assert_eq!(engine.statistics().num_free_blocks, 1);
}

#[test]
fn test_buddy_stays_split_while_partner_is_allocated() {
    let mut engine = buddy(1024, 32);
    let a = engine.allocate(128).unwrap();
    let _ = engine.allocate(128).unwrap();

    let freed = engine.deallocate(a.id).unwrap();
    assert_eq!((freed.address, freed.size, freed.allocated), (0, 128, false));
    assert_eq!(
        engine.free_lists(),
        vec![class(128, &[0]), class(256, &[256]), class(512, &[512])]
    );
}

#[test]
fn test_exact_bucket_is_used_before_splitting() {
    let mut engine = buddy(1024, 32);
    let a = engine.allocate(32).unwrap();
    let b = engine.allocate(32).unwrap();
    let c = engine.allocate(64).unwrap();

    assert_eq!((a.address, b.address, c.address), (0, 32, 64));
}

#[test]
fn test_lowest_free_address_is_taken_first() {
    let mut engine = buddy(256, 64);
    let blocks: Vec<_> = (0..4).map(|_| engine.allocate(64).unwrap()).collect();
    let _ = engine.deallocate(blocks[3].id).unwrap();
    let _ = engine.deallocate(blocks[1].id).unwrap();

    assert_eq!(engine.allocate(64).unwrap().address, 64);
}

#[rstest]
#[case::rounds_total_and_min(1000, 20, 1024, 32)]
#[case::already_powers(512, 16, 512, 16)]
#[case::single_block(64, 64, 64, 64)]
fn test_init_rounds_to_powers_of_two(
    #[case] total: u64,
    #[case] min: u64,
    #[case] rounded_total: u64,
    #[case] rounded_min: u64,
) {
    let engine = buddy(total, min);
    assert_eq!(engine.total_size(), rounded_total);
    assert_eq!(engine.max_block_size(), rounded_total);
    assert_eq!(engine.min_block_size(), rounded_min);
    assert_eq!(engine.free_lists(), vec![class(rounded_total, &[0])]);
}

#[rstest]
#[case(1, 32)]
#[case(32, 32)]
#[case(33, 64)]
#[case(100, 128)]
#[case(1024, 1024)]
fn test_actual_size(#[case] requested: u64, #[case] actual: u64) {
    let mut engine = buddy(1024, 32);
    assert_eq!(engine.allocate(requested).unwrap().actual_size, actual);
}

#[test]
fn test_from_config() {
    let engine = BuddyAllocationEngine::from_config(&BuddyConfig {
        total_size: 3000,
        min_block_size: 64,
    })
    .unwrap();
    assert_eq!(engine.total_size(), 4096);
}

// ──────────────────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────────────────

#[test]
fn test_operations_before_init() {
    let mut engine = BuddyAllocationEngine::new();
    assert!(!engine.is_initialized());
    assert_eq!(engine.allocate(10), Err(MemError::NotInitialized));
    assert_eq!(engine.deallocate(BlockId(1)), Err(MemError::NotInitialized));
    assert!(engine.dump().is_empty());
}

#[test]
fn test_init_errors() {
    let mut engine = BuddyAllocationEngine::new();
    assert_eq!(engine.init(0, 32).unwrap_err().kind(), ErrorKind::InvalidRequest);
    assert_eq!(engine.init(1024, 0).unwrap_err().kind(), ErrorKind::InvalidRequest);
    assert_eq!(engine.init(64, 100).unwrap_err().kind(), ErrorKind::InvalidConfiguration);
    assert!(!engine.is_initialized());

    engine.init(1024, 32).unwrap();
    assert_eq!(engine.init(1024, 32), Err(MemError::AlreadyInitialized));
}

#[test]
fn test_request_errors() {
    let mut engine = buddy(256, 32);
    assert_eq!(engine.allocate(0).unwrap_err().kind(), ErrorKind::InvalidRequest);
    assert_eq!(engine.allocate(257), Err(MemError::OutOfMemory { requested: 257 }));

    let whole = engine.allocate(256).unwrap();
    let before = engine.dump();
    assert_eq!(engine.allocate(1), Err(MemError::OutOfMemory { requested: 1 }));
    assert_eq!(engine.dump(), before);
    assert_eq!(engine.statistics().allocation_failures, 2);

    assert_eq!(engine.deallocate(BlockId(0)), Err(MemError::InvalidBlockId(BlockId(0))));
    assert_eq!(engine.deallocate(BlockId(9)), Err(MemError::InvalidBlockId(BlockId(9))));
    let _ = engine.deallocate(whole.id).unwrap();
    assert_eq!(engine.deallocate(whole.id), Err(MemError::DoubleFree(whole.id)));
}

// ──────────────────────────────────────────────────────────
// Statistics and dump
// ──────────────────────────────────────────────────────────

#[test]
fn test_statistics() {
    let mut engine = buddy(1024, 32);
    let _ = engine.allocate(100).unwrap();
    let _ = engine.allocate(100).unwrap();

    let stats = engine.statistics();
    assert_eq!(stats.total_memory, 1024);
    assert_eq!(stats.used_memory, 256);
    assert_eq!(stats.free_memory, 768);
    assert_eq!(stats.num_allocated_blocks, 2);
    assert_eq!(stats.num_free_blocks, 2);
    assert!((stats.internal_fragmentation - 56.0 / 256.0 * 100.0).abs() < 1e-9);
    assert!((stats.external_fragmentation - (1.0 - 512.0 / 768.0)).abs() < 1e-9);
}

#[test]
fn test_dump_interleaves_free_and_allocated() {
    let mut engine = buddy(1024, 32);
    let a = engine.allocate(100).unwrap();
    let b = engine.allocate(100).unwrap();

    let rows: Vec<_> = engine.dump().iter().map(|i| (i.address, i.size, i.state)).collect();
    assert_eq!(
        rows,
        vec![
            (0, 128, BlockState::Allocated(a.id)),
            (128, 128, BlockState::Allocated(b.id)),
            (256, 256, BlockState::Free),
            (512, 512, BlockState::Free),
        ]
    );
}

#[test]
fn test_size_class_display() {
    assert_eq!(class(128, &[0, 256]).to_string(), "Size 128 bytes: 0x0000 -> 0x0100");
}

// ──────────────────────────────────────────────────────────
// Properties
// ──────────────────────────────────────────────────────────

fn ops() -> impl Strategy<Value = Vec<(bool, u64)>> {
    prop::collection::vec((any::<bool>(), 1u64..300), 1..60)
}

fn replay(engine: &mut BuddyAllocationEngine, ops: &[(bool, u64)]) -> Vec<String> {
    let mut live = Vec::new();
    let mut log = Vec::new();
    for &(alloc, n) in ops {
        if alloc || live.is_empty() {
            let outcome = engine.allocate(n).inspect(|a| live.push(a.id));
            log.push(format!("{outcome:?}"));
        } else {
            let id = live.swap_remove(n as usize % live.len());
            log.push(format!("{:?}", engine.deallocate(id)));
        }
    }
    log
}

proptest! {
    #[test]
    fn prop_replay_is_deterministic(ops in ops()) {
        let mut first = buddy(1024, 16);
        let mut second = buddy(1024, 16);

        prop_assert_eq!(replay(&mut first, &ops), replay(&mut second, &ops));
        prop_assert_eq!(first.statistics(), second.statistics());
        prop_assert_eq!(first.dump(), second.dump());
        prop_assert_eq!(first.free_lists(), second.free_lists());
    }

    #[test]
    fn prop_blocks_aligned_and_memory_conserved(ops in ops()) {
        let mut engine = BuddyAllocationEngine::new();
        engine.init(1024, 16).unwrap();
        let mut live = Vec::new();

        for (alloc, n) in ops {
            if alloc || live.is_empty() {
                if let Ok(a) = engine.allocate(n) {
                    prop_assert_eq!(a.address % a.actual_size, 0);
                    prop_assert!(a.actual_size >= a.requested);
                    live.push(a.id);
                }
            } else {
                let id = live.swap_remove(n as usize % live.len());
                let _ = engine.deallocate(id).unwrap();
            }
            let stats = engine.statistics();
            prop_assert_eq!(stats.used_memory + stats.free_memory, stats.total_memory);
        }

        for info in engine.dump() {
            prop_assert_eq!(info.address % info.size, 0);
        }
    }

    #[test]
    fn prop_freeing_everything_restores_one_block(sizes in prop::collection::vec(1u64..200, 1..40)) {
        let mut engine = BuddyAllocationEngine::new();
        engine.init(2048, 32).unwrap();
        let ids: Vec<_> = sizes
            .iter()
            .filter_map(|&s| engine.allocate(s).ok())
            .map(|a| a.id)
            .collect();

        for id in ids.into_iter().rev() {
            let _ = engine.deallocate(id).unwrap();
        }
        prop_assert_eq!(engine.free_lists(), vec![class(2048, &[0])]);
    }
}
