//! Store Module
//!
//! The boundary to the durable ledger.
//!
//! ## Responsibilities
//! - Point `get` / `put` of opaque values under string keys
//! - Conditional `put_if_absent` used by identifier allocation
//! - Prefix scans for bulk listing
//! - Per-family counters the rebuild uses as read bounds
//!
//! ## Counters
//! Counters are high-water marks: one past the highest sequence number ever
//! written in that family. They never go down, even if a value later
//! disappears from the ledger.
//!
//! ## Implementations
//! - [`MemoryStore`]: ordered in-memory map, for tests and ephemeral boards
//! - [`LogStore`]: append-only log on disk, replayed on open

mod counters;
mod memory;
mod log_store;

pub mod log;

use std::sync::Arc;

use crate::error::StoreResult;
use crate::ids::TopicId;

pub use counters::LedgerCounters;
pub use memory::MemoryStore;
pub use log_store::LogStore;

/// A durable key-value ledger
///
/// A `get` returning `Ok(None)` means the key is absent. That is distinct
/// from `Err`, which means the store could not answer.
pub trait Store: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any previous value
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Write `value` only if `key` holds nothing; returns whether it wrote
    fn put_if_absent(&self, key: &str, value: &[u8]) -> StoreResult<bool>;

    /// All entries whose key starts with `prefix`, ascending by key
    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>>;

    /// Topic counter
    fn topic_count(&self) -> StoreResult<u64>;

    /// Post counter of one topic
    fn post_count(&self, topic: TopicId) -> StoreResult<u64>;

    /// Global comment counter
    fn comment_count(&self) -> StoreResult<u64>;
}

impl<T: Store + ?Sized> Store for Arc<T> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn put_if_absent(&self, key: &str, value: &[u8]) -> StoreResult<bool> {
        (**self).put_if_absent(key, value)
    }

    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        (**self).scan_prefix(prefix)
    }

    fn topic_count(&self) -> StoreResult<u64> {
        (**self).topic_count()
    }

    fn post_count(&self, topic: TopicId) -> StoreResult<u64> {
        (**self).post_count(topic)
    }

    fn comment_count(&self) -> StoreResult<u64> {
        (**self).comment_count()
    }
}
