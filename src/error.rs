use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("key `{0:#x}` not found")]
    KeyNotFound(u64),
    #[error("segment width `{0}` is not one of 1, 2, 4, 8, 16")]
    InvalidSegmentWidth(u32),
    #[error("node arena allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
    #[error("node arena exhausted the 32-bit node id space")]
    CapacityExceeded,
}

pub type Result<T> = std::result::Result<T, IndexError>;
