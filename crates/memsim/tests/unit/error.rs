//! # Error Tests
//!
//! Reason strings and kinds reported alongside failed operations.

use memsim_core::common::{BlockId, ErrorKind, MemError};
use rstest::rstest;

#[rstest]
#[case(MemError::InvalidRequest("allocation size must be non-zero"), ErrorKind::InvalidRequest, "invalid request: allocation size must be non-zero")]
#[case(MemError::AlreadyInitialized, ErrorKind::AlreadyInitialized, "already initialized")]
#[case(MemError::NotInitialized, ErrorKind::NotInitialized, "not initialized")]
#[case(MemError::OutOfMemory { requested: 64 }, ErrorKind::OutOfMemory, "out of memory: no free block can hold 64 bytes")]
#[case(MemError::InvalidBlockId(BlockId(0)), ErrorKind::InvalidBlockId, "invalid block id 0")]
#[case(MemError::DoubleFree(BlockId(3)), ErrorKind::DoubleFree, "block 3 is already free")]
#[case(MemError::OutOfRange { addr: 0x1000, limit: 0x1000 }, ErrorKind::OutOfRange, "address 0x1000 out of range (limit 0x1000)")]
fn test_kind_and_reason(#[case] err: MemError, #[case] kind: ErrorKind, #[case] reason: &str) {
    assert_eq!(err.kind(), kind);
    assert_eq!(err.to_string(), reason);
}

#[test]
fn test_invalid_configuration_carries_detail() {
    let err = MemError::InvalidConfiguration("cache level L1: size is smaller than one set".into());
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    assert!(err.to_string().ends_with("smaller than one set"));
}
