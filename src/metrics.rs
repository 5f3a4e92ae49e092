//! TESSERA - Sync Metrics
//! Atomic counters for chunked reads and writes.
//!
//! All counters use `Ordering::Relaxed`; they are for observation only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Operation counters for a [`SyncManager`](crate::manager::SyncManager).
#[derive(Debug)]
pub struct SyncMetrics {
    /// Completed `set` operations.
    pub sets: AtomicU64,
    /// Completed `get` operations.
    pub gets: AtomicU64,
    /// Reads that found no count marker.
    pub misses: AtomicU64,
    /// Reads that stopped at a missing segment.
    pub partial_reads: AtomicU64,
    /// Segments written across all sets.
    pub segments_written: AtomicU64,
    /// Compressed bytes written.
    pub bytes_written: AtomicU64,
    /// Compressed bytes read back.
    pub bytes_read: AtomicU64,
    /// Serialized bytes before compression, across all sets.
    pub raw_bytes_written: AtomicU64,
    started: Instant,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self {
            sets: AtomicU64::new(0),
            gets: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            partial_reads: AtomicU64::new(0),
            segments_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            raw_bytes_written: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Record a completed set.
    pub fn record_set(&self, segments: u64, raw_bytes: usize, compressed_bytes: usize) {
        self.sets.fetch_add(1, Ordering::Relaxed);
        self.segments_written.fetch_add(segments, Ordering::Relaxed);
        self.raw_bytes_written
            .fetch_add(raw_bytes as u64, Ordering::Relaxed);
        self.bytes_written
            .fetch_add(compressed_bytes as u64, Ordering::Relaxed);
    }

    /// Record a get; `None` for a miss.
    pub fn record_get(&self, compressed_bytes: Option<usize>) {
        self.gets.fetch_add(1, Ordering::Relaxed);
        match compressed_bytes {
            Some(size) => {
                self.bytes_read.fetch_add(size as u64, Ordering::Relaxed);
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn record_partial_read(&self) {
        self.partial_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Compressed size divided by serialized size; 1.0 before any write.
    pub fn compression_ratio(&self) -> f64 {
        let raw = self.raw_bytes_written.load(Ordering::Relaxed);
        if raw == 0 {
            return 1.0;
        }
        self.bytes_written.load(Ordering::Relaxed) as f64 / raw as f64
    }

    /// Format metrics as a human-readable report.
    pub fn report(&self) -> String {
        format!(
            "\n═══ TESSERA Sync Metrics ═══\n\
             Operations:\n\
               sets:          {}\n\
               gets:          {}\n\
               misses:        {}\n\
               partial reads: {}\n\
             Segments:\n\
               written:       {}\n\
             I/O:\n\
               written:       {} bytes\n\
               read:          {} bytes\n\
               ratio:         {:.2}\n\
             Uptime: {:.2}s",
            self.sets.load(Ordering::Relaxed),
            self.gets.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.partial_reads.load(Ordering::Relaxed),
            self.segments_written.load(Ordering::Relaxed),
            self.bytes_written.load(Ordering::Relaxed),
            self.bytes_read.load(Ordering::Relaxed),
            self.compression_ratio(),
            self.uptime_secs(),
        )
    }
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}
