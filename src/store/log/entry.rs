//! Log entry definitions
//!
//! Defines the structure and framing of individual ledger log entries.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// Largest payload a single entry may carry (64 MB)
pub const MAX_ENTRY_SIZE: u32 = 64 * 1024 * 1024;

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogOp {
    /// Store a value under a key
    Put { key: String, value: Vec<u8> },

    /// Drop the value under a key
    Remove { key: String },
}

impl LogOp {
    pub fn key(&self) -> &str {
        match self {
            LogOp::Put { key, .. } | LogOp::Remove { key } => key,
        }
    }
}

/// A single entry in the ledger log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation
    pub op: LogOp,

    /// Timestamp (unix millis) when the entry was created
    pub timestamp: u64,
}

impl LogEntry {
    pub fn new(lsn: u64, op: LogOp) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { lsn, op, timestamp }
    }

    /// Frame the entry: `LSN | CRC | Len | bincode(timestamp, op)`
    pub fn serialize(&self) -> StoreResult<Vec<u8>> {
        let payload = bincode::serialize(&(self.timestamp, &self.op))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if payload.len() > MAX_ENTRY_SIZE as usize {
            return Err(StoreError::Serialization(format!(
                "Entry too large: {} bytes (max {})",
                payload.len(),
                MAX_ENTRY_SIZE
            )));
        }

        let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
        bytes.extend_from_slice(&self.lsn.to_le_bytes());
        bytes.extend_from_slice(&checksum(self.lsn, &payload).to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decode the entry at the start of `bytes`
    ///
    /// Returns:
    /// - `Ok(Some((entry, consumed)))`: a complete, valid entry
    /// - `Ok(None)`: the buffer ends mid-entry (partial write)
    /// - `Err(Corruption)`: checksum mismatch or nonsensical header
    pub fn decode(bytes: &[u8]) -> StoreResult<Option<(Self, usize)>> {
        if bytes.len() < HEADER_SIZE {
            return Ok(None);
        }

        let mut lsn_bytes = [0u8; 8];
        lsn_bytes.copy_from_slice(&bytes[0..8]);
        let lsn = u64::from_le_bytes(lsn_bytes);
        let crc = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

        if len > MAX_ENTRY_SIZE {
            return Err(StoreError::Corruption(format!(
                "entry at lsn {} claims {} bytes",
                lsn, len
            )));
        }

        let total = HEADER_SIZE + len as usize;
        if bytes.len() < total {
            return Ok(None);
        }

        let payload = &bytes[HEADER_SIZE..total];
        if checksum(lsn, payload) != crc {
            return Err(StoreError::Corruption(format!(
                "checksum mismatch at lsn {}",
                lsn
            )));
        }

        let (timestamp, op): (u64, LogOp) = bincode::deserialize(payload)
            .map_err(|e| StoreError::Corruption(format!("lsn {}: {}", lsn, e)))?;

        Ok(Some((Self { lsn, op, timestamp }, total)))
    }
}

fn checksum(lsn: u64, payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&lsn.to_le_bytes());
    hasher.update(payload);
    hasher.finalize()
}
