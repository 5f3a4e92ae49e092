//! TESSERA - Chunk Reader
//! Reassembles a compressed string from a store snapshot, bounded by
//! the count marker and tolerant of missing trailing segments.

use crate::types::{Entries, StoredValue};

use super::keys::{count_key, segment_key};

/// How complete a reassembled value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Every segment named by the count marker was found.
    Complete { segments: u64 },
    /// Segment `found` was missing; only segments `0..found` were joined.
    Partial { expected: u64, found: u64 },
}

/// Reassemble the value stored under `logical_key`.
///
/// Returns `None` when there is no count marker or it is zero.
pub fn assemble(logical_key: &str, snapshot: &Entries) -> Option<String> {
    assemble_detailed(logical_key, snapshot).map(|(text, _)| text)
}

/// Like [`assemble`], also reporting whether any segment was missing.
///
/// Reading stops at the first missing segment; later segments are never
/// joined across a gap.
pub fn assemble_detailed(logical_key: &str, snapshot: &Entries) -> Option<(String, ReadOutcome)> {
    let count = match snapshot.get(count_key(logical_key)) {
        Some(StoredValue::Count(n)) if *n > 0 => *n,
        _ => return None,
    };

    let mut text = String::new();
    for i in 0..count {
        let key = segment_key(logical_key, i as usize);
        match snapshot.get(&key).and_then(StoredValue::as_segment) {
            Some(segment) => text.push_str(segment),
            None => {
                log::warn!(
                    "'{}' declares {} segments but '{}' is missing",
                    logical_key,
                    count,
                    key
                );
                return Some((
                    text,
                    ReadOutcome::Partial {
                        expected: count,
                        found: i,
                    },
                ));
            }
        }
    }

    Some((text, ReadOutcome::Complete { segments: count }))
}
