//! # Error Types
//!
//! Persistence errors for the formats and storage modules.
//!
//! The analysis engine itself is infallible; only the edges that touch
//! disk can fail, and a failure always leaves the in-memory session
//! untouched.

use thiserror::Error;

/// Errors from the persistence layer (file format and redb backends).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary encode/decode failure.
    #[error("codec error: {0}")]
    Codec(#[from] postcard::Error),

    /// Embedded database failure.
    #[error("database error: {0}")]
    Database(#[from] redb::Error),

    /// The file is not a konband database.
    #[error("not a konband database (bad magic)")]
    BadMagic,

    /// The file was written by an incompatible version.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
}

/// Result alias for persistence operations.
pub type StoreResult<T> = Result<T, StoreError>;
