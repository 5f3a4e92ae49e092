//! TESSERA - Integration Tests
//! End-to-end tests over the public API:
//! set -> get, shrinking writes, torn stores, persistence, quota properties.

use std::collections::BTreeMap;

use proptest::prelude::*;
use serde::{Deserialize, Serialize};

use tessera::chunk::{
    assemble, byte_length, plan_segments, plan_segments_utf16, segment_key, truncate,
};
use tessera::codec::{PlainCodec, ZstdBase64Codec};
use tessera::config::Config;
use tessera::error::TesseraError;
use tessera::manager::SyncManager;
use tessera::store::{FileStore, MemoryStore, StoreAdapter};
use tessera::types::{Entries, KeySelector, StoredValue};

mod common {
    use tessera::config::Config;

    /// Config with a small per-item quota so values span many segments.
    pub fn small_config(dir: &std::path::Path) -> Config {
        Config::new(dir)
            .with_quota_bytes_per_item(48)
            .with_quota_bytes(64 * 1024)
            .with_max_items(4096)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    tags: Vec<String>,
    counters: BTreeMap<String, i64>,
    active: bool,
}

fn sample_profile() -> Profile {
    Profile {
        name: "Zoë 🦀".into(),
        tags: (0..30).map(|i| format!("tag-{i}-日本")).collect(),
        counters: (0..20).map(|i| (format!("c{i}"), i * -7)).collect(),
        active: true,
    }
}

#[tokio::test]
async fn test_round_trip_default_quotas() {
    let manager = SyncManager::new(MemoryStore::default(), ZstdBase64Codec::default()).unwrap();
    manager.set("profile", &sample_profile()).await.unwrap();
    let back: Option<Profile> = manager.get("profile").await.unwrap();
    assert_eq!(back, Some(sample_profile()));
}

#[tokio::test]
async fn test_round_trip_many_segments() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::from_config(&common::small_config(dir.path()));
    let manager = SyncManager::new(store, PlainCodec).unwrap();

    manager.set("profile", &sample_profile()).await.unwrap();

    let all = manager.store().get(KeySelector::All).await.unwrap();
    let count = all["profile"].as_count().unwrap();
    assert!(count > 10);
    assert_eq!(all.len() as u64, count + 1);

    let back: Option<Profile> = manager.get("profile").await.unwrap();
    assert_eq!(back, Some(sample_profile()));
}

#[tokio::test]
async fn test_shrink_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::from_config(&common::small_config(dir.path()));
    let manager = SyncManager::new(store, PlainCodec).unwrap();

    let long: Vec<String> = (0..100).map(|i| format!("entry number {i}")).collect();
    manager.set("list", &long).await.unwrap();
    manager.set("list", &vec!["one"]).await.unwrap();

    let back: Option<Vec<String>> = manager.get("list").await.unwrap();
    assert_eq!(back, Some(vec!["one".to_string()]));
    assert_eq!(manager.store().len(), 2);
}

#[tokio::test]
async fn test_empty_serialized_value_reads_as_none() {
    let manager = SyncManager::new(MemoryStore::default(), PlainCodec).unwrap();
    manager.set_raw("k", "").await.unwrap();

    let all = manager.store().get(KeySelector::All).await.unwrap();
    assert_eq!(all["k"], StoredValue::Count(0));
    assert_eq!(manager.get_raw("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_partial_store_returns_prefix() {
    let store = MemoryStore::default();
    let mut entries = Entries::new();
    entries.insert("k".into(), StoredValue::Count(3));
    entries.insert("k_0".into(), StoredValue::Segment("\"ab".into()));
    entries.insert("k_2".into(), StoredValue::Segment("cd\"".into()));
    store.set(entries).await.unwrap();

    let manager = SyncManager::new(store, PlainCodec).unwrap();
    assert_eq!(manager.get_raw("k").await.unwrap().as_deref(), Some("\"ab"));

    // the torn JSON surfaces as a deserialization error, not a silent value
    let err = manager.get::<String>("k").await.unwrap_err();
    assert!(matches!(err, TesseraError::Serialization(_)));
}

#[tokio::test]
async fn test_file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::small_config(dir.path());
    {
        let store = FileStore::open(&config).unwrap();
        let manager = SyncManager::new(store, ZstdBase64Codec::default()).unwrap();
        manager.set("profile", &sample_profile()).await.unwrap();
    }

    let store = FileStore::open(&config).unwrap();
    let manager = SyncManager::new(store, ZstdBase64Codec::default()).unwrap();
    let back: Option<Profile> = manager.get("profile").await.unwrap();
    assert_eq!(back, Some(sample_profile()));
}

#[tokio::test]
async fn test_writes_complete_before_reads() {
    let manager = SyncManager::new(MemoryStore::default(), ZstdBase64Codec::default()).unwrap();
    for i in 0..20u32 {
        let value: Vec<u32> = (0..i * 50).collect();
        manager.set("seq", &value).await.unwrap();
        let back: Option<Vec<u32>> = manager.get("seq").await.unwrap();
        assert_eq!(back, Some(value));
    }
}

#[test]
fn test_config_error_for_tiny_quota() {
    let err = plan_segments("key", "value", 4).unwrap_err();
    assert!(matches!(err, TesseraError::Config(_)));
    assert!(Config::default().with_quota_bytes_per_item(4).validate().is_err());
}

// ==================== Property Tests ====================

proptest! {
    /// Every planned item fits the per-item budget, key bytes included.
    #[test]
    fn planned_entries_respect_quota(text in "\\PC{0,400}", max in 12usize..128) {
        let entries = plan_segments("key", &text, max).unwrap();
        for (key, value) in &entries {
            prop_assert!(byte_length(key) + value.stored_len() <= max, "{} over budget", key);
        }
    }

    /// Segment indices are exactly 0..count, and joining them gives the input back.
    #[test]
    fn segments_are_contiguous_and_lossless(text in "\\PC{0,400}", max in 12usize..128) {
        let entries = plan_segments("key", &text, max).unwrap();
        let count = entries["key"].as_count().unwrap() as usize;
        prop_assert_eq!(entries.len(), count + 1);

        let mut joined = String::new();
        for i in 0..count {
            let segment = entries[&segment_key("key", i)].as_segment().unwrap();
            prop_assert!(!segment.is_empty());
            joined.push_str(segment);
        }
        prop_assert_eq!(&joined, &text);

        let assembled = assemble("key", &entries);
        if text.is_empty() {
            prop_assert_eq!(assembled, None);
        } else {
            prop_assert_eq!(assembled, Some(text));
        }
    }

    /// UTF-16 input, including lone surrogates, is planned within budget and
    /// reassembles to its lossy UTF-8 form.
    #[test]
    fn utf16_plans_respect_quota(units in prop::collection::vec(any::<u16>(), 0..300), max in 12usize..128) {
        let entries = plan_segments_utf16("key", &units, max).unwrap();
        for (key, value) in &entries {
            prop_assert!(byte_length(key) + value.stored_len() <= max, "{} over budget", key);
        }
        let expected = String::from_utf16_lossy(&units);
        let assembled = assemble("key", &entries);
        if units.is_empty() {
            prop_assert_eq!(assembled, None);
        } else {
            prop_assert_eq!(assembled, Some(expected));
        }
    }

    /// Truncation returns the longest char-aligned prefix within budget.
    #[test]
    fn truncate_is_longest_valid_prefix(text in "\\PC{0,64}", max in 0usize..80) {
        let prefix = truncate(&text, max);
        prop_assert!(prefix.len() <= max);
        prop_assert!(text.starts_with(prefix));
        if let Some(next) = text[prefix.len()..].chars().next() {
            prop_assert!(prefix.len() + next.len_utf8() > max);
        }
    }

    /// Values survive set/get through compression and chunking.
    #[test]
    fn values_round_trip(
        words in prop::collection::vec("\\PC{0,20}", 0..40),
        per_item in 24usize..200,
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let config = Config::default()
            .with_quota_bytes_per_item(per_item)
            .with_quota_bytes(1024 * 1024)
            .with_max_items(100_000);
        let manager = SyncManager::new(MemoryStore::from_config(&config), ZstdBase64Codec::default()).unwrap();

        let back: Option<Vec<String>> = rt.block_on(async {
            manager.set("words", &words).await.unwrap();
            manager.get("words").await.unwrap()
        });
        prop_assert_eq!(back, Some(words));
    }
}
