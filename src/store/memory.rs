//! TESSERA - In-Memory Quota Store
//! A sorted in-memory table that charges every item against the same
//! quotas a browser sync store enforces.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::chunk::utf8::byte_length;
use crate::config::Config;
use crate::error::{QuotaKind, Result, TesseraError};
use crate::types::{Entries, KeySelector, StoredValue};

use super::{QuotaLimits, StoreAdapter};

/// In-memory sorted table with quota accounting.
pub struct QuotaTable {
    entries: Entries,
    /// Sum of item costs of all entries.
    bytes_in_use: usize,
    limits: QuotaLimits,
}

impl QuotaTable {
    /// Create a new, empty table.
    pub fn new(limits: QuotaLimits) -> Self {
        Self {
            entries: Entries::new(),
            bytes_in_use: 0,
            limits,
        }
    }

    /// Load previously stored entries without quota checks.
    pub fn from_entries(limits: QuotaLimits, entries: Entries) -> Self {
        let mut table = Self::new(limits);
        for (key, value) in entries {
            let cost = table.item_cost(&key, &value);
            table.bytes_in_use += cost;
            table.entries.insert(key, value);
        }
        table
    }

    /// Bytes charged for one item.
    pub fn item_cost(&self, key: &str, value: &StoredValue) -> usize {
        byte_length(key) + value.stored_len() + self.limits.item_overhead
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bytes_in_use(&self) -> usize {
        self.bytes_in_use
    }

    pub fn limits(&self) -> QuotaLimits {
        self.limits
    }

    /// Check that applying `incoming` keeps every quota satisfied.
    pub fn check(&self, incoming: &Entries) -> Result<()> {
        let mut total = self.bytes_in_use;
        let mut items = self.entries.len();

        for (key, value) in incoming {
            let cost = self.item_cost(key, value);
            if cost > self.limits.bytes_per_item {
                return Err(TesseraError::QuotaExceeded {
                    kind: QuotaKind::BytesPerItem,
                    key: key.clone(),
                    size: cost,
                    limit: self.limits.bytes_per_item,
                });
            }
            match self.entries.get(key) {
                Some(old) => total = total - self.item_cost(key, old) + cost,
                None => {
                    total += cost;
                    items += 1;
                }
            }
        }

        // Report the first key of the batch; the batch is what overflows.
        let first = incoming.keys().next().cloned().unwrap_or_default();
        if total > self.limits.total_bytes {
            return Err(TesseraError::QuotaExceeded {
                kind: QuotaKind::TotalBytes,
                key: first,
                size: total,
                limit: self.limits.total_bytes,
            });
        }
        if items > self.limits.max_items {
            return Err(TesseraError::QuotaExceeded {
                kind: QuotaKind::MaxItems,
                key: first,
                size: items,
                limit: self.limits.max_items,
            });
        }
        Ok(())
    }

    /// Insert all entries. Callers run [`check`](Self::check) first.
    pub fn apply(&mut self, incoming: Entries) {
        for (key, value) in incoming {
            let cost = self.item_cost(&key, &value);
            if let Some(old) = self.entries.get(&key) {
                let old_cost = self.item_cost(&key, old);
                self.bytes_in_use = self.bytes_in_use.saturating_sub(old_cost);
            }
            self.bytes_in_use += cost;
            self.entries.insert(key, value);
        }
    }

    /// Check quotas, then insert all entries or none.
    pub fn insert_all(&mut self, incoming: Entries) -> Result<()> {
        self.check(&incoming)?;
        self.apply(incoming);
        Ok(())
    }

    /// Copy out the selected entries.
    pub fn select(&self, keys: &KeySelector) -> Entries {
        match keys {
            KeySelector::All => self.entries.clone(),
            KeySelector::Keys(keys) => keys
                .iter()
                .filter_map(|k| self.entries.get(k).map(|v| (k.clone(), v.clone())))
                .collect(),
        }
    }

    /// Clear all entries and reset usage.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.bytes_in_use = 0;
    }

    /// Returns a reference to the inner map for iteration.
    pub fn entries(&self) -> &Entries {
        &self.entries
    }
}

/// Cloneable in-memory store. All clones share the same table.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<QuotaTable>>,
}

impl MemoryStore {
    /// Create an empty store with the given quotas.
    pub fn new(limits: QuotaLimits) -> Self {
        Self {
            inner: Arc::new(RwLock::new(QuotaTable::new(limits))),
        }
    }

    /// Create an empty store with the quotas of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quota())
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Remove a single item, bypassing the chunk layer.
    ///
    /// Simulates a store that evicted or never received one item.
    pub fn evict(&self, key: &str) -> Option<StoredValue> {
        let mut table = self.inner.write();
        let old = table.entries.remove(key)?;
        let cost = table.item_cost(key, &old);
        table.bytes_in_use = table.bytes_in_use.saturating_sub(cost);
        Some(old)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[async_trait]
impl StoreAdapter for MemoryStore {
    async fn clear_namespace(&self) -> Result<()> {
        self.inner.write().clear();
        Ok(())
    }

    async fn set(&self, entries: Entries) -> Result<()> {
        self.inner.write().insert_all(entries)
    }

    async fn get(&self, keys: KeySelector) -> Result<Entries> {
        Ok(self.inner.read().select(&keys))
    }

    fn quota(&self) -> QuotaLimits {
        self.inner.read().limits()
    }

    async fn bytes_in_use(&self) -> Result<usize> {
        Ok(self.inner.read().bytes_in_use())
    }
}
