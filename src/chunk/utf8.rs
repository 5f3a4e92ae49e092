//! TESSERA - UTF-8 Byte Accounting
//! Measures text in UTF-8 bytes and cuts it at character boundaries
//! so that no segment ever ends inside a multi-byte character.
//!
//! The store's quota is denominated in UTF-8 bytes, so segment sizes are
//! computed here rather than from character or code-unit counts.

const HIGH_SURROGATES: std::ops::Range<u16> = 0xD800..0xDC00;
const LOW_SURROGATES: std::ops::Range<u16> = 0xDC00..0xE000;

/// Number of bytes `text` occupies under UTF-8.
pub fn byte_length(text: &str) -> usize {
    text.len()
}

/// Longest prefix of `text` whose UTF-8 length does not exceed `max_bytes`.
///
/// Characters are never split: if the first character alone is larger than
/// `max_bytes`, the empty string is returned.
pub fn truncate(text: &str, max_bytes: usize) -> &str {
    let mut end = 0;
    for (idx, ch) in text.char_indices() {
        let next = idx + ch.len_utf8();
        if next > max_bytes {
            break;
        }
        end = next;
    }
    &text[..end]
}

/// UTF-8 cost of the code unit at `units[i]`, and how many units it spans.
///
/// A high surrogate followed by a low surrogate is one 4-byte character.
/// A lone surrogate is costed like the 3-byte replacement character it
/// would be encoded as.
fn utf16_char_cost(units: &[u16], i: usize) -> (usize, usize) {
    let c = units[i];
    let mut cost = 1;
    if c >= 128 {
        cost += 1;
    }
    if c >= 2048 {
        cost += 1;
    }
    if HIGH_SURROGATES.contains(&c) {
        if let Some(next) = units.get(i + 1) {
            if LOW_SURROGATES.contains(next) {
                return (cost + 1, 2);
            }
        }
    }
    (cost, 1)
}

/// Number of bytes a UTF-16 buffer occupies once encoded as UTF-8.
pub fn utf16_byte_length(units: &[u16]) -> usize {
    let mut bytes = 0;
    let mut i = 0;
    while i < units.len() {
        let (cost, width) = utf16_char_cost(units, i);
        bytes += cost;
        i += width;
    }
    bytes
}

/// Longest prefix of a UTF-16 buffer whose UTF-8 length fits in `max_bytes`.
///
/// Surrogate pairs are consumed as one indivisible character and are never
/// split between the prefix and the remainder.
pub fn truncate_utf16(units: &[u16], max_bytes: usize) -> &[u16] {
    let mut bytes = 0;
    let mut i = 0;
    while i < units.len() {
        let (cost, width) = utf16_char_cost(units, i);
        if bytes + cost > max_bytes {
            break;
        }
        bytes += cost;
        i += width;
    }
    &units[..i]
}
