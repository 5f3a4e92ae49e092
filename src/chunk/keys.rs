//! TESSERA - Segment Key Derivation
//! The bare logical key holds the segment count; segment `i` lives
//! under `"<logical key>_<i>"`.
//!
//! A logical key such as `"a_0"` collides with segment 0 of `"a"`.
//! Callers keeping several logical keys in one store must avoid such names.

/// Separator between a logical key and its segment index.
pub const SEGMENT_SEPARATOR: &str = "_";

/// Storage key for segment `index` of `logical_key`.
pub fn segment_key(logical_key: &str, index: usize) -> String {
    format!("{logical_key}{SEGMENT_SEPARATOR}{index}")
}

/// Storage key of the segment count marker.
pub fn count_key(logical_key: &str) -> &str {
    logical_key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_key() {
        assert_eq!(segment_key("k", 0), "k_0");
        assert_eq!(segment_key("settings", 12), "settings_12");
        assert_eq!(segment_key("", 3), "_3");
    }

    #[test]
    fn test_count_key_is_logical_key() {
        assert_eq!(count_key("settings"), "settings");
    }

    #[test]
    fn test_distinct_indices_distinct_keys() {
        let keys: std::collections::BTreeSet<_> = (0..100).map(|i| segment_key("k", i)).collect();
        assert_eq!(keys.len(), 100);
        assert!(!keys.contains("k"));
    }
}
