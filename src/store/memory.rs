//! In-memory store
//!
//! BTreeMap-based ledger with RwLock for concurrency. Also serves as the
//! table behind [`super::LogStore`].

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::StoreResult;
use crate::ids::TopicId;

use super::{LedgerCounters, Store};

#[derive(Debug, Default)]
struct Inner {
    data: BTreeMap<String, Vec<u8>>,
    counters: LedgerCounters,
}

/// An in-memory ledger
///
/// Ordered keys keep prefix scans cheap. Counters are updated on every
/// write and are left alone by [`MemoryStore::remove`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the value under `key` without touching the counters
    ///
    /// Leaves a hole in a dense sequence, which is how a lost or corrupted
    /// ledger entry looks to the rebuild.
    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.write().data.remove(key)
    }

    /// Number of keys currently holding a value
    pub fn len(&self) -> usize {
        self.inner.read().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().data.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().data.contains_key(key)
    }

    /// Snapshot of all entries in key order
    pub fn entries(&self) -> Vec<(String, Vec<u8>)> {
        self.inner
            .read()
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.inner.read().data.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut inner = self.inner.write();
        inner.data.insert(key.to_string(), value.to_vec());
        inner.counters.observe(key);
        Ok(())
    }

    fn put_if_absent(&self, key: &str, value: &[u8]) -> StoreResult<bool> {
        let mut inner = self.inner.write();
        if inner.data.contains_key(key) {
            return Ok(false);
        }
        inner.data.insert(key.to_string(), value.to_vec());
        inner.counters.observe(key);
        Ok(true)
    }

    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let inner = self.inner.read();
        Ok(inner
            .data
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn topic_count(&self) -> StoreResult<u64> {
        Ok(self.inner.read().counters.topics())
    }

    fn post_count(&self, topic: TopicId) -> StoreResult<u64> {
        Ok(self.inner.read().counters.posts(topic))
    }

    fn comment_count(&self) -> StoreResult<u64> {
        Ok(self.inner.read().counters.comments())
    }
}
