//! Durable store
//!
//! An append-only log on disk with an in-memory table in front of it.
//!
//! ## Write path
//! 1. Acquire the writer lock (serializes writes)
//! 2. Append the operation to the log
//! 3. Apply it to the table
//!
//! ## Open path
//! 1. Create the data directory
//! 2. Recover the log, truncating a torn or corrupt tail
//! 3. Replay surviving entries into the table (rebuilding counters)

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::{Config, LogSyncStrategy};
use crate::error::StoreResult;
use crate::ids::TopicId;

use super::log::{LogOp, LogRecovery, LogWriter};
use super::{MemoryStore, Store};

/// A ledger persisted to `{data_dir}/ledger.log`
pub struct LogStore {
    path: PathBuf,
    writer: Mutex<LogWriter>,
    table: MemoryStore,
}

impl LogStore {
    const LOG_FILENAME: &'static str = "ledger.log";

    /// Open or create the ledger under `config.data_dir`
    pub fn open(config: &Config) -> StoreResult<Self> {
        Self::open_dir(&config.data_dir, config.log_sync_strategy)
    }

    /// Open or create the ledger in `dir`
    pub fn open_dir(dir: &Path, sync_strategy: LogSyncStrategy) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::LOG_FILENAME);
        let table = MemoryStore::new();

        let mut next_lsn = 1;
        if path.exists() {
            let (entries, result) = LogRecovery::recover(&path)?;
            tracing::info!(
                "Ledger recovery: {} entries recovered, {} corrupted, last_lsn={}, truncated={}",
                result.entries_recovered,
                result.entries_corrupted,
                result.last_lsn,
                result.was_truncated
            );

            for entry in entries {
                match entry.op {
                    LogOp::Put { key, value } => table.put(&key, &value)?,
                    LogOp::Remove { key } => {
                        table.remove(&key);
                    }
                }
            }
            next_lsn = result.last_lsn + 1;
        }

        let writer = LogWriter::open(&path, sync_strategy, next_lsn)?;

        Ok(Self {
            path,
            writer: Mutex::new(writer),
            table,
        })
    }

    /// Drop the value under `key`, logging the removal
    ///
    /// Counters are unaffected, so this punches a hole in a dense sequence.
    pub fn remove(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut writer = self.writer.lock();
        writer.append(LogOp::Remove {
            key: key.to_string(),
        })?;
        Ok(self.table.remove(key))
    }

    /// Force the log to disk regardless of sync strategy
    pub fn sync(&self) -> StoreResult<()> {
        self.writer.lock().sync()
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of keys currently holding a value
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Store for LogStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.table.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut writer = self.writer.lock();
        writer.append(LogOp::Put {
            key: key.to_string(),
            value: value.to_vec(),
        })?;
        self.table.put(key, value)
    }

    fn put_if_absent(&self, key: &str, value: &[u8]) -> StoreResult<bool> {
        // Holding the writer lock makes check-then-append atomic
        let mut writer = self.writer.lock();
        if self.table.contains_key(key) {
            return Ok(false);
        }
        writer.append(LogOp::Put {
            key: key.to_string(),
            value: value.to_vec(),
        })?;
        self.table.put(key, value)?;
        Ok(true)
    }

    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        self.table.scan_prefix(prefix)
    }

    fn topic_count(&self) -> StoreResult<u64> {
        self.table.topic_count()
    }

    fn post_count(&self, topic: TopicId) -> StoreResult<u64> {
        self.table.post_count(topic)
    }

    fn comment_count(&self) -> StoreResult<u64> {
        self.table.comment_count()
    }
}

impl Drop for LogStore {
    fn drop(&mut self) {
        if let Err(e) = self.writer.lock().sync() {
            tracing::warn!("Failed to sync ledger log on close: {}", e);
        }
    }
}
