//! TESSERA - Sync Manager
//! Stores serializable values in a quota-constrained store by
//! compressing them and spreading the result over several items.
//!
//! Write path: serialize -> compress -> plan segments -> clear -> set.
//! Read path: get all -> assemble -> decompress -> deserialize.
//!
//! Every write clears the store's ENTIRE namespace first, so writing one
//! logical key destroys any other logical key kept in the same store.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::chunk::reader::{assemble_detailed, ReadOutcome};
use crate::chunk::writer::plan_segments;
use crate::codec::Codec;
use crate::error::{Result, TesseraError};
use crate::metrics::SyncMetrics;
use crate::store::StoreAdapter;
use crate::types::{Entries, KeySelector, StoredValue};

/// Coordinates the codec, the chunk layer and a store adapter.
pub struct SyncManager<S, C> {
    store: S,
    codec: C,
    /// Key + value budget per item, after the store's own overhead.
    max_bytes_per_item: usize,
    metrics: SyncMetrics,
}

impl<S: StoreAdapter, C: Codec> SyncManager<S, C> {
    /// Create a manager whose segment budget is derived from the store's quota.
    pub fn new(store: S, codec: C) -> Result<Self> {
        let quota = store.quota();
        let max_bytes_per_item = quota.bytes_per_item.saturating_sub(quota.item_overhead);
        if max_bytes_per_item == 0 {
            return Err(TesseraError::Config(format!(
                "per-item quota {} leaves no room after {} bytes of overhead",
                quota.bytes_per_item, quota.item_overhead
            )));
        }
        Ok(Self {
            store,
            codec,
            max_bytes_per_item,
            metrics: SyncMetrics::new(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }

    pub fn max_bytes_per_item(&self) -> usize {
        self.max_bytes_per_item
    }

    /// Serialize `value` as JSON and store it under `key`.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let serialized = serde_json::to_string(value)?;
        self.set_raw(key, &serialized).await
    }

    /// Read and deserialize the value under `key`.
    ///
    /// `Ok(None)` means no value is stored (no count marker, or a count of 0).
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key).await? {
            Some(serialized) => Ok(Some(serde_json::from_str(&serialized)?)),
            None => Ok(None),
        }
    }

    /// Store already-serialized text under `key`.
    pub async fn set_raw(&self, key: &str, serialized: &str) -> Result<()> {
        let compressed = self.codec.compress(serialized)?;
        let entries = plan_segments(key, &compressed, self.max_bytes_per_item)?;
        let segments = segment_count(key, &entries);

        log::info!(
            "set '{}': {} bytes serialized, {} compressed, {} segments",
            key,
            serialized.len(),
            compressed.len(),
            segments
        );

        // Shrinking a value must not leave stale higher-index segments behind.
        self.store.clear_namespace().await?;
        self.store.set(entries).await?;

        self.metrics
            .record_set(segments, serialized.len(), compressed.len());
        Ok(())
    }

    /// Read the serialized text under `key`.
    ///
    /// A read that finds fewer segments than the count marker declares is
    /// not an error here; the torn text is handed to the codec, which will
    /// usually reject it.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let snapshot = self.store.get(KeySelector::All).await?;
        let (compressed, outcome) = match assemble_detailed(key, &snapshot) {
            Some(found) => found,
            None => {
                log::debug!("get '{}': no value stored", key);
                self.metrics.record_get(None);
                return Ok(None);
            }
        };

        if let ReadOutcome::Partial { expected, found } = outcome {
            log::warn!(
                "get '{}': read {} of {} segments",
                key,
                found,
                expected
            );
            self.metrics.record_partial_read();
        }
        self.metrics.record_get(Some(compressed.len()));

        let serialized = self.codec.decompress(&compressed)?;
        log::info!(
            "get '{}': {} bytes compressed, {} serialized",
            key,
            compressed.len(),
            serialized.len()
        );
        Ok(Some(serialized))
    }
}

fn segment_count(key: &str, entries: &Entries) -> u64 {
    entries
        .get(key)
        .and_then(StoredValue::as_count)
        .unwrap_or_default()
}
