//! Store wrappers shared by the board tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ledgerboard::store::Store;
use ledgerboard::{MemoryStore, StoreError, StoreResult, TopicId};
use parking_lot::Mutex;

/// A MemoryStore that can be told to fail, and records every key it is asked for
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub fail_gets: AtomicBool,
    pub fail_puts: AtomicBool,
    /// A foreign write that lands on this key right after it is read as absent
    pub racing_write: Mutex<Option<(String, Vec<u8>)>>,
    gets: Mutex<Vec<String>>,
}

impl FaultyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Keys passed to `get` since the last call
    pub fn take_gets(&self) -> Vec<String> {
        std::mem::take(&mut *self.gets.lock())
    }

    fn check(&self, flag: &AtomicBool) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

impl Store for FaultyStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.gets.lock().push(key.to_string());
        self.check(&self.fail_gets)?;
        let value = self.inner.get(key)?;
        if value.is_none() {
            let mut racing = self.racing_write.lock();
            if racing.as_ref().is_some_and(|(k, _)| k == key) {
                if let Some((k, v)) = racing.take() {
                    self.inner.put(&k, &v)?;
                }
            }
        }
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.check(&self.fail_puts)?;
        self.inner.put(key, value)
    }

    fn put_if_absent(&self, key: &str, value: &[u8]) -> StoreResult<bool> {
        self.check(&self.fail_puts)?;
        self.inner.put_if_absent(key, value)
    }

    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        self.check(&self.fail_gets)?;
        self.inner.scan_prefix(prefix)
    }

    fn topic_count(&self) -> StoreResult<u64> {
        self.inner.topic_count()
    }

    fn post_count(&self, topic: TopicId) -> StoreResult<u64> {
        self.inner.post_count(topic)
    }

    fn comment_count(&self) -> StoreResult<u64> {
        self.inner.comment_count()
    }
}

// =============================================================================
// Raw ledger values, as a foreign writer would leave them
// =============================================================================

pub fn topic_json(name: &str) -> Vec<u8> {
    format!(r#"{{"topicName":"{}"}}"#, name).into_bytes()
}

pub fn post_json(topic: u64, caption: &str) -> Vec<u8> {
    format!(r#"{{"caption":"{}","topicID":"TOPIC{}"}}"#, caption, topic).into_bytes()
}

pub fn comment_json(topic: u64, post: u64, author: &str, body: &str) -> Vec<u8> {
    format!(
        r#"{{"author":"{}","body":"{}","parentTopic":"TOPIC{}","parentPost":"POST{}"}}"#,
        author, body, topic, post
    )
    .into_bytes()
}
