//! Error types for map construction and insertion.

use std::collections::TryReserveError;
use thiserror::Error;

/// Failure while constructing a `HashChain`.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("bucket count must be at least 1")]
    ZeroBuckets,

    #[error("failed to allocate bucket array: {0}")]
    Alloc(#[from] TryReserveError),
}

/// Failure while inserting an entry. The map is left unchanged.
#[derive(Debug, Error)]
pub enum SetError {
    #[error("failed to allocate chain entry: {0}")]
    Alloc(#[from] TryReserveError),
}
