//! Error types for the filter subsystem.
//!
//! Mutating calls abort their transaction on any of these and surface the
//! error to the caller; no partial write is ever externally visible.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A persisted bucket payload failed validation: short read, declared
    /// sizes exceeding the buffer, or an undecodable bitmap.
    #[error("corrupt bucket payload: {0}")]
    Corrupt(String),

    /// A precondition the covering-bucket lookup is supposed to guarantee
    /// was violated. Indicates a caller bug, not bad data.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("column family not found: {0}")]
    MissingColumnFamily(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] rocksdb::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
