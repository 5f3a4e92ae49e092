//! TESSERA - Configuration
//! Defines the quota parameters of the backing store and where
//! the file-backed store keeps its journal.

use std::path::PathBuf;

use crate::error::{Result, TesseraError};
use crate::store::QuotaLimits;

/// Default per-item quota in bytes (key + value).
pub const DEFAULT_QUOTA_BYTES_PER_ITEM: usize = 8192;

/// Default total quota in bytes.
pub const DEFAULT_QUOTA_BYTES: usize = 102_400;

/// Default maximum number of stored items.
pub const DEFAULT_MAX_ITEMS: usize = 512;

/// Bytes the store charges per item on top of key and value.
/// String values are stored JSON-encoded, so the two quotes count.
pub const DEFAULT_ITEM_OVERHEAD: usize = 2;

/// Configuration for a Tessera store and sync manager.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for the file-backed store's journal.
    pub data_dir: PathBuf,

    /// Maximum size of one stored item in bytes, key included.
    pub quota_bytes_per_item: usize,

    /// Maximum size of all stored items together, in bytes.
    pub quota_bytes: usize,

    /// Maximum number of stored items.
    pub max_items: usize,

    /// Per-item bytes reserved by the store's own bookkeeping.
    pub item_overhead: usize,

    /// Whether to fsync journal writes immediately.
    pub sync_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            quota_bytes_per_item: DEFAULT_QUOTA_BYTES_PER_ITEM,
            quota_bytes: DEFAULT_QUOTA_BYTES,
            max_items: DEFAULT_MAX_ITEMS,
            item_overhead: DEFAULT_ITEM_OVERHEAD,
            sync_writes: true,
        }
    }
}

impl Config {
    /// Create a new Config with a custom data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Set the per-item quota.
    pub fn with_quota_bytes_per_item(mut self, bytes: usize) -> Self {
        self.quota_bytes_per_item = bytes;
        self
    }

    /// Set the total byte quota.
    pub fn with_quota_bytes(mut self, bytes: usize) -> Self {
        self.quota_bytes = bytes;
        self
    }

    /// Set the maximum item count.
    pub fn with_max_items(mut self, items: usize) -> Self {
        self.max_items = items;
        self
    }

    /// Set the per-item bookkeeping overhead.
    pub fn with_item_overhead(mut self, bytes: usize) -> Self {
        self.item_overhead = bytes;
        self
    }

    /// Budget handed to the chunk writer: key bytes + value bytes must fit in it.
    pub fn max_bytes_per_item(&self) -> usize {
        self.quota_bytes_per_item.saturating_sub(self.item_overhead)
    }

    /// Quota limits for store adapters built from this config.
    pub fn quota(&self) -> QuotaLimits {
        QuotaLimits {
            bytes_per_item: self.quota_bytes_per_item,
            total_bytes: self.quota_bytes,
            max_items: self.max_items,
            item_overhead: self.item_overhead,
        }
    }

    /// Reject quotas that cannot hold a single one-byte segment under a one-byte key.
    pub fn validate(&self) -> Result<()> {
        // "k_0" + one byte of value
        let minimum = 4;
        if self.max_bytes_per_item() < minimum {
            return Err(TesseraError::Config(format!(
                "per-item quota of {} bytes (overhead {}) leaves less than {} usable bytes",
                self.quota_bytes_per_item, self.item_overhead, minimum
            )));
        }
        if self.quota_bytes < self.quota_bytes_per_item {
            return Err(TesseraError::Config(format!(
                "total quota {} is smaller than the per-item quota {}",
                self.quota_bytes, self.quota_bytes_per_item
            )));
        }
        if self.max_items < 2 {
            return Err(TesseraError::Config(
                "max_items must allow a count marker and at least one segment".into(),
            ));
        }
        Ok(())
    }

    /// Ensure the data directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}
