//! TESSERA - Chunk Writer
//! Cuts a compressed string into segments that each fit the store's
//! per-item quota once their own segment key is accounted for.

use crate::error::{Result, TesseraError};
use crate::types::{Entries, StoredValue};

use super::keys::{count_key, segment_key};
use super::utf8::{byte_length, truncate, truncate_utf16, utf16_byte_length};

/// Plan the full set of entries needed to store `text` under `logical_key`.
///
/// Every produced segment satisfies
/// `byte_length(segment_key) + byte_length(segment) <= max_bytes_per_item`.
/// The count marker is stored under the bare logical key and is `0` for an
/// empty `text`.
///
/// Fails with [`TesseraError::Config`] when a segment key leaves no room for
/// even one character, or the count marker itself does not fit.
pub fn plan_segments(logical_key: &str, text: &str, max_bytes_per_item: usize) -> Result<Entries> {
    let mut entries = Entries::new();
    let mut remaining = text;
    let mut index = 0;

    while !remaining.is_empty() {
        let key = segment_key(logical_key, index);
        let budget = max_bytes_per_item.saturating_sub(byte_length(&key));
        let segment = truncate(remaining, budget);

        if segment.is_empty() {
            return Err(no_progress(&key, budget));
        }

        log::debug!("segment {} -> '{}' ({} bytes)", index, key, byte_length(segment));
        remaining = &remaining[segment.len()..];
        entries.insert(key, StoredValue::Segment(segment.to_string()));
        index += 1;
    }

    insert_count(&mut entries, logical_key, index, max_bytes_per_item)?;
    Ok(entries)
}

/// Like [`plan_segments`], for text held as UTF-16 code units.
///
/// Surrogate pairs are never split across segments. A lone surrogate is
/// costed at 3 bytes and stored as U+FFFD, which has the same UTF-8 size.
pub fn plan_segments_utf16(
    logical_key: &str,
    units: &[u16],
    max_bytes_per_item: usize,
) -> Result<Entries> {
    let mut entries = Entries::new();
    let mut remaining = units;
    let mut index = 0;

    while !remaining.is_empty() {
        let key = segment_key(logical_key, index);
        let budget = max_bytes_per_item.saturating_sub(byte_length(&key));
        let segment = truncate_utf16(remaining, budget);

        if segment.is_empty() {
            return Err(no_progress(&key, budget));
        }

        log::debug!(
            "segment {} -> '{}' ({} bytes)",
            index,
            key,
            utf16_byte_length(segment)
        );
        remaining = &remaining[segment.len()..];
        entries.insert(key, StoredValue::Segment(String::from_utf16_lossy(segment)));
        index += 1;
    }

    insert_count(&mut entries, logical_key, index, max_bytes_per_item)?;
    Ok(entries)
}

fn no_progress(key: &str, budget: usize) -> TesseraError {
    TesseraError::Config(format!(
        "segment key '{}' ({} bytes) leaves {} bytes per item, too few for the next character",
        key,
        byte_length(key),
        budget
    ))
}

fn insert_count(
    entries: &mut Entries,
    logical_key: &str,
    segments: usize,
    max_bytes_per_item: usize,
) -> Result<()> {
    let key = count_key(logical_key);
    let marker = StoredValue::Count(segments as u64);
    let cost = byte_length(key) + marker.stored_len();
    if cost > max_bytes_per_item {
        return Err(TesseraError::Config(format!(
            "count marker for '{}' needs {} bytes, per-item budget is {}",
            key, cost, max_bytes_per_item
        )));
    }
    entries.insert(key.to_string(), marker);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_split_at_twenty_bytes() {
        let entries = plan_segments("k", "ABCDEFGHIJKLMNOPQRSTUVWXYZ", 20).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries["k_0"], StoredValue::Segment("ABCDEFGHIJKLMNOPQ".into()));
        assert_eq!(entries["k_1"], StoredValue::Segment("RSTUVWXYZ".into()));
        assert_eq!(entries["k"], StoredValue::Count(2));
    }

    #[test]
    fn test_empty_text_has_zero_count() {
        let entries = plan_segments("k", "", 20).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["k"], StoredValue::Count(0));
    }

    #[test]
    fn test_exact_fit_single_segment() {
        // "k_0" = 3 bytes, 17 bytes of value fill the item exactly
        let text = "a".repeat(17);
        let entries = plan_segments("k", &text, 20).unwrap();
        assert_eq!(entries["k"], StoredValue::Count(1));
    }

    #[test]
    fn test_multibyte_respects_budget() {
        // 5 crabs = 20 bytes; budget per segment is 8 - 3 = 5 bytes -> one crab each
        let entries = plan_segments("k", "🦀🦀🦀🦀🦀", 8).unwrap();
        assert_eq!(entries["k"], StoredValue::Count(5));
        for i in 0..5 {
            assert_eq!(entries[&segment_key("k", i)], StoredValue::Segment("🦀".into()));
        }
    }

    #[test]
    fn test_growing_key_shrinks_budget() {
        // keys k_0..k_9 take 3 bytes, k_10 and up take 4
        let text = "x".repeat(12 * 2);
        let entries = plan_segments("k", &text, 5).unwrap();
        assert_eq!(entries["k_9"], StoredValue::Segment("xx".into()));
        assert_eq!(entries["k_10"], StoredValue::Segment("x".into()));
        for (key, value) in &entries {
            assert!(byte_length(key) + value.stored_len() <= 5, "{key}");
        }
    }

    #[test]
    fn test_key_too_long_is_config_error() {
        let err = plan_segments("a_very_long_logical_key", "data", 10).unwrap_err();
        assert!(matches!(err, TesseraError::Config(_)));
    }

    #[test]
    fn test_empty_text_with_oversized_key_is_config_error() {
        let err = plan_segments("twenty_byte_key_xxxx", "", 20).unwrap_err();
        assert!(matches!(err, TesseraError::Config(_)));
        // 19-byte key + "0" fits exactly
        let entries = plan_segments("nineteen_byte_key_x", "", 20).unwrap();
        assert_eq!(entries["nineteen_byte_key_x"], StoredValue::Count(0));
    }

    #[test]
    fn test_utf16_alphabet_matches_str_path() {
        let text = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let units: Vec<u16> = text.encode_utf16().collect();
        assert_eq!(
            plan_segments_utf16("k", &units, 20).unwrap(),
            plan_segments("k", text, 20).unwrap()
        );
    }

    #[test]
    fn test_utf16_keeps_surrogate_pairs_whole() {
        // "k_0" leaves 5 bytes: "a" and the crab fill segment 0 exactly
        let units: Vec<u16> = "a🦀b🦀".encode_utf16().collect();
        let entries = plan_segments_utf16("k", &units, 8).unwrap();
        assert_eq!(entries["k"], StoredValue::Count(2));
        assert_eq!(entries["k_0"], StoredValue::Segment("a🦀".into()));
        assert_eq!(entries["k_1"], StoredValue::Segment("b🦀".into()));
        for (key, value) in &entries {
            assert!(byte_length(key) + value.stored_len() <= 8, "{key}");
        }
    }

    #[test]
    fn test_utf16_lone_surrogate_costed_as_replacement() {
        let units = vec![0x0041, 0xD83E, 0x0042];
        let entries = plan_segments_utf16("k", &units, 7).unwrap();
        // budget 4: "A" + lone surrogate (3)
        assert_eq!(entries["k_0"], StoredValue::Segment("A\u{FFFD}".into()));
        assert_eq!(entries["k_1"], StoredValue::Segment("B".into()));
        assert_eq!(entries["k_0"].stored_len(), 4);
    }

    #[test]
    fn test_utf16_pair_larger_than_budget_is_config_error() {
        let units: Vec<u16> = "🦀".encode_utf16().collect();
        let err = plan_segments_utf16("k", &units, 6).unwrap_err();
        assert!(matches!(err, TesseraError::Config(_)));
    }

    #[test]
    fn test_char_larger_than_budget_is_config_error() {
        // "k_0" leaves 2 bytes; a crab needs 4
        let err = plan_segments("k", "🦀", 5).unwrap_err();
        assert!(matches!(err, TesseraError::Config(_)));
    }
}
