//! TESSERA - Store Adapters
//! The quota-constrained key-value store the chunk layer writes into.
//!
//! Adapters provided:
//! - [`MemoryStore`]: in-memory table enforcing the store quotas
//! - [`FileStore`]: the same table, journaled to disk for persistence

pub mod file;
pub mod memory;
pub mod wal;

pub use file::FileStore;
pub use memory::{MemoryStore, QuotaTable};
pub use wal::Journal;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Entries, KeySelector};

/// Quotas enforced by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaLimits {
    /// Maximum bytes for one item: key + value + overhead.
    pub bytes_per_item: usize,
    /// Maximum bytes across all items.
    pub total_bytes: usize,
    /// Maximum number of items.
    pub max_items: usize,
    /// Bytes charged per item on top of key and value.
    pub item_overhead: usize,
}

/// A quota-constrained key-value store.
///
/// Within one [`set`](StoreAdapter::set), either every entry becomes visible
/// to subsequent reads or none does. Failures are returned unchanged to the
/// caller; adapters do not retry.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Remove every item in the store's namespace, including other logical keys.
    async fn clear_namespace(&self) -> Result<()>;

    /// Store all `entries`, replacing existing values under the same keys.
    async fn set(&self, entries: Entries) -> Result<()>;

    /// Read the selected keys. Absent keys are omitted.
    async fn get(&self, keys: KeySelector) -> Result<Entries>;

    /// The quotas this store enforces.
    fn quota(&self) -> QuotaLimits;

    /// Bytes currently charged against the total quota.
    async fn bytes_in_use(&self) -> Result<usize>;
}
