//! TESSERA - Core Type Definitions
//! Defines the values exchanged between the chunk layer and store adapters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chunk::utf8::byte_length;

/// A value held by the store under one storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoredValue {
    /// Segment count marker, stored under the bare logical key.
    Count(u64),
    /// One slice of a compressed representation.
    Segment(String),
}

impl StoredValue {
    /// A count of 0 and an empty segment are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            StoredValue::Count(n) => *n != 0,
            StoredValue::Segment(s) => !s.is_empty(),
        }
    }

    /// Bytes the store charges for this value, excluding per-item overhead.
    pub fn stored_len(&self) -> usize {
        match self {
            StoredValue::Count(n) => n.to_string().len(),
            StoredValue::Segment(s) => byte_length(s),
        }
    }

    /// The count if this is a count marker.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            StoredValue::Count(n) => Some(*n),
            StoredValue::Segment(_) => None,
        }
    }

    /// The segment text if this is a segment.
    pub fn as_segment(&self) -> Option<&str> {
        match self {
            StoredValue::Segment(s) => Some(s),
            StoredValue::Count(_) => None,
        }
    }
}

/// Storage key to stored value, sorted for deterministic iteration.
pub type Entries = BTreeMap<String, StoredValue>;

/// Which keys a `get` should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelector {
    /// The entire store.
    All,
    /// Only the listed keys; absent keys are omitted from the result.
    Keys(Vec<String>),
}
