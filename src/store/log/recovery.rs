//! Log Recovery
//!
//! Replays the ledger log on open and cuts off anything unreadable.

use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::error::StoreResult;

use super::LogEntry;

/// Handles ledger log recovery
pub struct LogRecovery;

/// Result of a recovery pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Number of corrupted entries found (recovery stops at the first)
    pub entries_corrupted: u64,

    /// Last valid LSN (0 when the log is empty)
    pub last_lsn: u64,

    /// Whether the file was truncated to drop a partial or corrupt tail
    pub was_truncated: bool,
}

impl LogRecovery {
    /// Recover entries from a log file
    ///
    /// This will:
    /// 1. Read entries from the start until the data stops making sense
    /// 2. Treat a checksum mismatch as the end of the trustworthy log
    /// 3. Truncate the file to the last good entry
    /// 4. Return all valid entries in order
    pub fn recover(path: &Path) -> StoreResult<(Vec<LogEntry>, RecoveryResult)> {
        let (entries, result, valid_len) = Self::scan(path)?;

        if result.was_truncated {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(valid_len as u64)?;
            file.sync_all()?;
        }

        Ok((entries, result))
    }

    /// Verify integrity of a log file without modifying it
    pub fn verify(path: &Path) -> StoreResult<RecoveryResult> {
        Self::scan(path).map(|(_, result, _)| result)
    }

    fn scan(path: &Path) -> StoreResult<(Vec<LogEntry>, RecoveryResult, usize)> {
        let bytes = fs::read(path)?;
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();
        let mut offset = 0;

        while offset < bytes.len() {
            match LogEntry::decode(&bytes[offset..]) {
                Ok(Some((entry, consumed))) => {
                    result.last_lsn = entry.lsn;
                    result.entries_recovered += 1;
                    entries.push(entry);
                    offset += consumed;
                }
                Ok(None) => {
                    tracing::warn!(
                        "Partial entry at offset {} in {}, dropping {} trailing bytes",
                        offset,
                        path.display(),
                        bytes.len() - offset
                    );
                    result.was_truncated = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("Corrupt entry at offset {} in {}: {}", offset, path.display(), e);
                    result.entries_corrupted += 1;
                    result.was_truncated = true;
                    break;
                }
            }
        }

        Ok((entries, result, offset))
    }
}
