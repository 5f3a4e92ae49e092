//! TESSERA - Custom Error Types
//! Defines the error hierarchy for chunked storage.

use thiserror::Error;

/// Custom Result type for Tessera.
pub type Result<T> = std::result::Result<T, TesseraError>;

/// Which store quota a write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaKind {
    /// A single item (key + value) is larger than the per-item quota.
    BytesPerItem,
    /// The store as a whole would exceed its total byte quota.
    TotalBytes,
    /// The store would hold more items than allowed.
    MaxItems,
}

impl std::fmt::Display for QuotaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuotaKind::BytesPerItem => write!(f, "bytes per item"),
            QuotaKind::TotalBytes => write!(f, "total bytes"),
            QuotaKind::MaxItems => write!(f, "max items"),
        }
    }
}

/// Error types for Tessera.
#[derive(Error, Debug)]
pub enum TesseraError {
    /// I/O errors from file operations (journal).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Compression or decompression failure.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Data corruption detected (CRC mismatch).
    #[error("Data corruption detected: {0}")]
    Corruption(String),

    /// Configuration error, e.g. a segment key too long for the per-item quota.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The store rejected a write because a quota would be exceeded.
    #[error("Quota exceeded ({kind}) for '{key}': {size} > {limit}")]
    QuotaExceeded {
        kind: QuotaKind,
        key: String,
        size: usize,
        limit: usize,
    },

    /// Any other failure signaled by the store adapter.
    #[error("Store error: {0}")]
    Store(String),
}

impl From<serde_json::Error> for TesseraError {
    fn from(err: serde_json::Error) -> Self {
        TesseraError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for TesseraError {
    fn from(err: bincode::Error) -> Self {
        TesseraError::Serialization(err.to_string())
    }
}
