//! TESSERA - File-Backed Quota Store
//! A [`QuotaTable`] whose mutations are journaled before they are applied.
//!
//! The write path is journal (disk) -> table (memory). A write rejected
//! by the quota check never reaches the journal. Journal I/O runs on
//! tokio's blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{Result, TesseraError};
use crate::types::{Entries, KeySelector};

use super::memory::QuotaTable;
use super::wal::Journal;
use super::{QuotaLimits, StoreAdapter};

/// Journal file name inside `Config::data_dir`.
pub const JOURNAL_FILE: &str = "tessera.journal";

struct FileState {
    table: QuotaTable,
    journal: Journal,
}

/// Persistent store. All clones share the same table and journal.
#[derive(Clone)]
pub struct FileStore {
    inner: Arc<Mutex<FileState>>,
    limits: QuotaLimits,
}

impl FileStore {
    /// Open or create a store in `config.data_dir`, replaying its journal.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        config.ensure_dirs()?;

        let path = config.data_dir.join(JOURNAL_FILE);
        let recovery = Journal::recover(&path)?;
        let mut journal = Journal::open(path, config.sync_writes)?;
        if recovery.records > 1 || recovery.truncated_tail {
            journal.compact(&recovery.entries)?;
        }

        let limits = config.quota();
        let table = QuotaTable::from_entries(limits, recovery.entries);
        log::info!(
            "file store opened at {:?} ({} items, {} bytes in use, {} journal records replayed)",
            config.data_dir,
            table.len(),
            table.bytes_in_use(),
            recovery.records
        );

        Ok(Self {
            inner: Arc::new(Mutex::new(FileState { table, journal })),
            limits,
        })
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.inner.lock().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().table.is_empty()
    }

    /// Run `f` against the locked state on the blocking pool.
    async fn with_state<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut FileState) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&mut inner.lock()))
            .await
            .map_err(|e| TesseraError::Store(format!("journal task failed: {e}")))?
    }
}

#[async_trait]
impl StoreAdapter for FileStore {
    async fn clear_namespace(&self) -> Result<()> {
        self.with_state(|state| {
            state.journal.compact(&Entries::new())?;
            state.table.clear();
            Ok(())
        })
        .await
    }

    async fn set(&self, entries: Entries) -> Result<()> {
        self.with_state(move |state| {
            state.table.check(&entries)?;
            state.journal.append_set(&entries)?;
            state.table.apply(entries);
            Ok(())
        })
        .await
    }

    async fn get(&self, keys: KeySelector) -> Result<Entries> {
        Ok(self.inner.lock().table.select(&keys))
    }

    fn quota(&self) -> QuotaLimits {
        self.limits
    }

    async fn bytes_in_use(&self) -> Result<usize> {
        Ok(self.inner.lock().table.bytes_in_use())
    }
}
