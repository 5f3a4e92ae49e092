//! TESSERA - Store Journal
//! Append-only log of store mutations, replayed on open so a
//! file-backed store survives restarts.
//!
//! Clearing the store makes every earlier record dead, so a clear
//! compacts the log to nothing instead of appending a record.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, TesseraError};
use crate::types::Entries;

/// Operation type for journal records.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(u8)]
enum OpType {
    Set = 2,
}

impl OpType {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            2 => Some(OpType::Set),
            _ => None,
        }
    }
}

/// Size of the record header: op byte + payload length.
const HEADER_LEN: usize = 5;
/// Size of the trailing CRC.
const CRC_LEN: usize = 4;

/// Result of replaying a journal.
#[derive(Debug, Default)]
pub struct Recovery {
    /// Store contents after replaying every intact record.
    pub entries: Entries,
    /// Number of intact records replayed.
    pub records: usize,
    /// Whether replay stopped at a torn or corrupt record.
    pub truncated_tail: bool,
}

/// Write-ahead journal for the file-backed store.
///
/// ## Binary Format (per record)
/// ```text
/// [op_type: 1 byte][payload_len: 4 bytes (LE)][payload: N bytes][crc: 4 bytes]
/// ```
/// `Set` records carry bincode-encoded entries. The CRC covers op, length
/// and payload.
pub struct Journal {
    path: PathBuf,
    file: File,
    sync_writes: bool,
}

impl Journal {
    /// Open or create a journal file at the specified path.
    pub fn open(path: PathBuf, sync_writes: bool) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file,
            sync_writes,
        })
    }

    /// Returns the path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(op: OpType, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len() + CRC_LEN);
        buf.push(op as u8);
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(payload);
        let crc = crc32fast::hash(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());
        buf
    }

    fn append(&mut self, op: OpType, payload: &[u8]) -> Result<()> {
        let encoded = Self::encode(op, payload);
        self.file.write_all(&encoded)?;
        if self.sync_writes {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Append a SET record for a batch of entries.
    pub fn append_set(&mut self, entries: &Entries) -> Result<()> {
        let payload = bincode::serialize(entries)?;
        self.append(OpType::Set, &payload)
    }

    /// Replay the journal at `path`. A missing file recovers as empty.
    ///
    /// Replay stops at the first torn or CRC-mismatched record; records
    /// before it are kept.
    pub fn recover(path: &Path) -> Result<Recovery> {
        let mut recovery = Recovery::default();
        let mut data = Vec::new();
        match File::open(path) {
            Ok(mut file) => {
                file.read_to_end(&mut data)?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(recovery),
            Err(e) => return Err(e.into()),
        }

        let mut pos = 0;
        while pos < data.len() {
            match Self::decode_at(&data, pos) {
                Ok((op, payload, next)) => {
                    match op {
                        OpType::Set => {
                            let batch: Entries = bincode::deserialize(payload)?;
                            recovery.entries.extend(batch);
                        }
                    }
                    recovery.records += 1;
                    pos = next;
                }
                Err(e) => {
                    log::warn!(
                        "journal {:?}: stopping replay at byte {}: {}",
                        path,
                        pos,
                        e
                    );
                    recovery.truncated_tail = true;
                    break;
                }
            }
        }

        Ok(recovery)
    }

    /// Decode the record starting at `pos`, returning the next offset.
    fn decode_at(data: &[u8], pos: usize) -> Result<(OpType, &[u8], usize)> {
        let header_end = pos + HEADER_LEN;
        if header_end > data.len() {
            return Err(TesseraError::Corruption("torn record header".into()));
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&data[pos + 1..header_end]);
        let payload_len = u32::from_le_bytes(len_bytes) as usize;

        let payload_end = header_end + payload_len;
        let record_end = payload_end + CRC_LEN;
        if record_end > data.len() {
            return Err(TesseraError::Corruption("torn record body".into()));
        }

        let mut crc_bytes = [0u8; 4];
        crc_bytes.copy_from_slice(&data[payload_end..record_end]);
        let stored_crc = u32::from_le_bytes(crc_bytes);
        let actual_crc = crc32fast::hash(&data[pos..payload_end]);
        if stored_crc != actual_crc {
            return Err(TesseraError::Corruption(format!(
                "CRC mismatch: stored {stored_crc:08x}, computed {actual_crc:08x}"
            )));
        }

        let op = OpType::from_byte(data[pos])
            .ok_or_else(|| TesseraError::Corruption(format!("unknown op {}", data[pos])))?;
        Ok((op, &data[header_end..payload_end], record_end))
    }

    /// Replace the journal with a single SET of `entries` (or nothing if empty).
    pub fn compact(&mut self, entries: &Entries) -> Result<()> {
        let tmp_path = self.path.with_extension("journal.tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            if !entries.is_empty() {
                let payload = bincode::serialize(entries)?;
                tmp.write_all(&Self::encode(OpType::Set, &payload))?;
            }
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        Ok(())
    }
}
