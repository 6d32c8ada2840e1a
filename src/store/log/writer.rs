//! Log Writer
//!
//! Handles appending entries to the ledger log file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::config::LogSyncStrategy;
use crate::error::{StoreError, StoreResult};

use super::{LogEntry, LogOp};

/// Appends entries to the ledger log
///
/// A failed append is cut back off the file, so a later append never lands
/// behind torn bytes. If the cut itself fails the writer refuses further
/// appends.
pub struct LogWriter {
    file: File,
    next_lsn: u64,
    sync_strategy: LogSyncStrategy,
    unsynced: usize,

    /// File length up to the end of the last complete entry
    len: u64,

    /// Set when a torn append could not be rolled back
    failed: bool,
}

impl LogWriter {
    /// Open or create a log file for appending
    ///
    /// `next_lsn` is the LSN the next appended entry receives; callers pass
    /// one past the last LSN recovered from the file.
    pub fn open(path: &Path, sync_strategy: LogSyncStrategy, next_lsn: u64) -> StoreResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            next_lsn: next_lsn.max(1),
            sync_strategy,
            unsynced: 0,
            len,
            failed: false,
        })
    }

    /// Append an operation; returns the LSN it was written under
    ///
    /// The bytes always reach the OS before this returns. Whether they are
    /// also fsynced depends on the sync strategy. On error nothing of the
    /// entry is left in the file.
    pub fn append(&mut self, op: LogOp) -> StoreResult<u64> {
        if self.failed {
            return Err(StoreError::Unavailable(
                "log writer stopped after an unrecoverable append failure".to_string(),
            ));
        }

        let lsn = self.next_lsn;
        let bytes = LogEntry::new(lsn, op).serialize()?;

        if let Err(e) = self.write_entry(&bytes) {
            self.rollback();
            return Err(e);
        }

        self.len += bytes.len() as u64;
        self.next_lsn += 1;
        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> StoreResult<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// The LSN the next append will use
    pub fn next_lsn(&self) -> u64 {
        self.next_lsn
    }

    fn write_entry(&mut self, bytes: &[u8]) -> StoreResult<()> {
        self.file.write_all(bytes)?;
        self.unsynced += 1;

        let due = match self.sync_strategy {
            LogSyncStrategy::EveryWrite => true,
            LogSyncStrategy::EveryNEntries { count } => self.unsynced >= count.max(1),
        };
        if due {
            self.sync()?;
        }
        Ok(())
    }

    /// Cut the file back to the end of the last complete entry
    fn rollback(&mut self) {
        let restored = self
            .file
            .set_len(self.len)
            .and_then(|_| self.file.sync_data());
        if let Err(e) = restored {
            tracing::error!(
                "Could not truncate torn log append back to {} bytes: {}",
                self.len,
                e
            );
            self.failed = true;
        }
    }
}
