//! TESSERA - Chunked Storage for Quota-Constrained Key-Value Stores
//!
//! Persists an arbitrary serializable value into a store whose items are
//! capped at a small byte size, by compressing it and spreading the result
//! over several items.
//!
//! ## Features
//! - **UTF-8 Byte Accounting**: Segments are cut at character boundaries by UTF-8 size
//! - **Chunk Writer / Reader**: `key_0..key_{n-1}` segments plus a count marker under `key`
//! - **Codecs**: zstd + base64, or plain passthrough
//! - **Quota Stores**: In-memory and journaled file-backed adapters enforcing per-item, total and item-count quotas
//! - **Metrics**: Lock-free atomic counters for observability
//!
//! ## Example
//! ```no_run
//! use tessera::{codec::ZstdBase64Codec, manager::SyncManager, store::MemoryStore};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let manager = SyncManager::new(MemoryStore::default(), ZstdBase64Codec::default()).unwrap();
//!
//! manager.set("tabs", &vec!["news", "mail"]).await.unwrap();
//! let tabs: Option<Vec<String>> = manager.get("tabs").await.unwrap();
//! assert_eq!(tabs, Some(vec!["news".to_string(), "mail".to_string()]));
//! # });
//! ```

pub mod chunk;
pub mod codec;
pub mod config;
pub mod error;
pub mod manager;
pub mod metrics;
pub mod store;
pub mod types;
