//! Engine error definitions.
//!
//! Every engine operation returns [`Result`]. A failed operation leaves the
//! engine's blocks, lines, and page mappings exactly as they were; only the
//! failure counters in the statistics move. The `Display` output of
//! [`MemError`] is the human-readable reason reported to callers.

use thiserror::Error;

use super::block_id::BlockId;

/// Result alias used by all engine operations.
pub type Result<T> = std::result::Result<T, MemError>;

/// Errors reported by the simulation engines.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MemError {
    /// The request itself is malformed (zero size, zero page size, and so on).
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    /// The configuration normalizes to an unusable geometry (e.g. zero cache sets).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A one-time initialization was invoked a second time.
    #[error("already initialized")]
    AlreadyInitialized,

    /// The engine was used before being initialized.
    #[error("not initialized")]
    NotInitialized,

    /// No free region can satisfy the request.
    #[error("out of memory: no free block can hold {requested} bytes")]
    OutOfMemory {
        /// Size of the failed request in bytes.
        requested: u64,
    },

    /// The id is zero, was never issued, or is unknown to this engine.
    #[error("invalid block id {0}")]
    InvalidBlockId(BlockId),

    /// The block was already freed.
    #[error("block {0} is already free")]
    DoubleFree(BlockId),

    /// The address lies beyond the configured space.
    #[error("address {addr:#x} out of range (limit {limit:#x})")]
    OutOfRange {
        /// Offending address.
        addr: u64,
        /// First address past the configured space.
        limit: u64,
    },
}

/// Fieldless discriminant of [`MemError`], convenient for matching and counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`MemError::InvalidRequest`].
    InvalidRequest,
    /// See [`MemError::InvalidConfiguration`].
    InvalidConfiguration,
    /// See [`MemError::AlreadyInitialized`].
    AlreadyInitialized,
    /// See [`MemError::NotInitialized`].
    NotInitialized,
    /// See [`MemError::OutOfMemory`].
    OutOfMemory,
    /// See [`MemError::InvalidBlockId`].
    InvalidBlockId,
    /// See [`MemError::DoubleFree`].
    DoubleFree,
    /// See [`MemError::OutOfRange`].
    OutOfRange,
}

impl MemError {
    /// Returns the fieldless kind of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            Self::AlreadyInitialized => ErrorKind::AlreadyInitialized,
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            Self::InvalidBlockId(_) => ErrorKind::InvalidBlockId,
            Self::DoubleFree(_) => ErrorKind::DoubleFree,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }
}
