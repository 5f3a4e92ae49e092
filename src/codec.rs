//! TESSERA - Codecs
//! Text-to-text transforms applied before chunking and after reassembly.
//!
//! A codec must be a bijection over its own output: `decompress(compress(s))`
//! returns `s` for every string. Decompressing foreign or torn input is
//! reported as [`TesseraError::Codec`].

use std::io::Read;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::config::{Config, DEFAULT_QUOTA_BYTES};
use crate::error::{Result, TesseraError};

/// Default zstd compression level.
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Default cap on compact input accepted by `decompress`, in bytes.
/// Nothing larger than the whole store can have been read from it.
pub const DEFAULT_MAX_COMPRESSED_SIZE: usize = DEFAULT_QUOTA_BYTES;

/// Default cap on decompressed output, in bytes (16 MiB).
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 16 * 1024 * 1024;

/// Reversible string transform used around the chunk layer.
pub trait Codec: Send + Sync {
    /// Transform serialized text into its compact stored form.
    fn compress(&self, text: &str) -> Result<String>;

    /// Recover the serialized text from its compact stored form.
    fn decompress(&self, compact: &str) -> Result<String>;
}

/// zstd compression wrapped in standard base64, yielding ASCII output.
///
/// `decompress` rejects compact input above `max_compressed_size` and stops
/// reading once output passes `max_decompressed_size`.
#[derive(Debug, Clone, Copy)]
pub struct ZstdBase64Codec {
    level: i32,
    max_compressed_size: usize,
    max_decompressed_size: usize,
}

impl ZstdBase64Codec {
    /// Create a codec with the given zstd level (1-22) and default size limits.
    pub fn new(level: i32) -> Self {
        Self {
            level,
            max_compressed_size: DEFAULT_MAX_COMPRESSED_SIZE,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
        }
    }

    /// Default level, compact input capped at the store's total quota.
    pub fn from_config(config: &Config) -> Self {
        Self::new(DEFAULT_ZSTD_LEVEL).with_limits(config.quota_bytes, DEFAULT_MAX_DECOMPRESSED_SIZE)
    }

    /// Set the compact-input and decompressed-output limits.
    pub fn with_limits(mut self, max_compressed_size: usize, max_decompressed_size: usize) -> Self {
        self.max_compressed_size = max_compressed_size;
        self.max_decompressed_size = max_decompressed_size;
        self
    }

    /// The configured compression level.
    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn max_compressed_size(&self) -> usize {
        self.max_compressed_size
    }

    pub fn max_decompressed_size(&self) -> usize {
        self.max_decompressed_size
    }
}

impl Default for ZstdBase64Codec {
    fn default() -> Self {
        Self::new(DEFAULT_ZSTD_LEVEL)
    }
}

impl Codec for ZstdBase64Codec {
    fn compress(&self, text: &str) -> Result<String> {
        let compressed = zstd::encode_all(text.as_bytes(), self.level)
            .map_err(|e| TesseraError::Codec(format!("zstd compression failed: {e}")))?;
        Ok(STANDARD.encode(compressed))
    }

    fn decompress(&self, compact: &str) -> Result<String> {
        if compact.is_empty() {
            return Ok(String::new());
        }
        if compact.len() > self.max_compressed_size {
            return Err(TesseraError::Codec(format!(
                "compressed input too large: {} > {}",
                compact.len(),
                self.max_compressed_size
            )));
        }
        let compressed = STANDARD
            .decode(compact)
            .map_err(|e| TesseraError::Codec(format!("invalid base64: {e}")))?;

        let decoder = zstd::stream::read::Decoder::new(compressed.as_slice())
            .map_err(|e| TesseraError::Codec(format!("zstd decoder init failed: {e}")))?;
        let mut raw = Vec::new();
        // One byte past the limit is enough to tell an oversized frame apart.
        decoder
            .take(self.max_decompressed_size as u64 + 1)
            .read_to_end(&mut raw)
            .map_err(|e| TesseraError::Codec(format!("zstd decompression failed: {e}")))?;
        if raw.len() > self.max_decompressed_size {
            return Err(TesseraError::Codec(format!(
                "decompressed output exceeds {} bytes",
                self.max_decompressed_size
            )));
        }
        String::from_utf8(raw)
            .map_err(|e| TesseraError::Codec(format!("decompressed text is not UTF-8: {e}")))
    }
}

/// Identity codec: values are stored as their serialized text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl Codec for PlainCodec {
    fn compress(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn decompress(&self, compact: &str) -> Result<String> {
        Ok(compact.to_string())
    }
}
