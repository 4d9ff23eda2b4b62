//! # Statistics Tests
//!
//! Derived ratios and their behaviour on empty snapshots.

use memsim_core::stats::{AllocationStats, CacheLevelStats, VmStats};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_empty_snapshots_report_zero() {
    let alloc = AllocationStats::default();
    assert!(close(alloc.utilization(), 0.0));
    assert!(close(alloc.success_rate(), 0.0));
    assert!(close(alloc.failure_rate(), 0.0));
    assert!(close(CacheLevelStats::default().hit_ratio(), 0.0));
    assert!(close(VmStats::default().fault_rate(), 0.0));
}

#[test]
fn test_allocation_ratios() {
    let stats = AllocationStats {
        total_memory: 1000,
        used_memory: 250,
        free_memory: 750,
        num_allocations: 3,
        allocation_failures: 1,
        ..AllocationStats::default()
    };
    assert!(close(stats.utilization(), 25.0));
    assert!(close(stats.success_rate(), 75.0));
    assert!(close(stats.failure_rate(), 25.0));
}

#[test]
fn test_cache_ratios() {
    let stats = CacheLevelStats {
        name: "L1".into(),
        accesses: 8,
        hits: 6,
        misses: 2,
    };
    assert!(close(stats.hit_ratio(), 75.0));
    assert!(close(stats.miss_ratio(), 25.0));
}

#[test]
fn test_vm_rates() {
    let stats = VmStats {
        accesses: 10,
        page_hits: 7,
        page_faults: 3,
        ..VmStats::default()
    };
    assert!(close(stats.hit_rate(), 70.0));
    assert!(close(stats.fault_rate(), 30.0));
}
