//! TESSERA - Chunking Protocol
//! Splits compressed text into quota-sized segments and joins them back.

pub mod keys;
pub mod reader;
pub mod utf8;
pub mod writer;

pub use keys::{count_key, segment_key, SEGMENT_SEPARATOR};
pub use reader::{assemble, assemble_detailed, ReadOutcome};
pub use utf8::{byte_length, truncate};
pub use writer::{plan_segments, plan_segments_utf16};
