//! Ledger counters
//!
//! High-water marks per key family, maintained by the reference stores.

use std::collections::HashMap;

use crate::ids::{KeyFamily, TopicId};

/// Family counters derived from the keys written to a ledger
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LedgerCounters {
    topics: u64,
    posts: HashMap<TopicId, u64>,
    comments: u64,
}

impl LedgerCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for a write to `key`; keys outside the families are ignored
    pub fn observe(&mut self, key: &str) {
        match KeyFamily::classify(key) {
            Some(KeyFamily::Topic(topic)) => {
                self.topics = self.topics.max(topic.seq().saturating_add(1));
            }
            Some(KeyFamily::Post(topic, post)) => {
                let count = self.posts.entry(topic).or_insert(0);
                *count = (*count).max(post.seq().saturating_add(1));
            }
            Some(KeyFamily::Comment(comment)) => {
                self.comments = self.comments.max(comment.seq().saturating_add(1));
            }
            None => {}
        }
    }

    pub fn topics(&self) -> u64 {
        self.topics
    }

    pub fn posts(&self, topic: TopicId) -> u64 {
        self.posts.get(&topic).copied().unwrap_or(0)
    }

    pub fn comments(&self) -> u64 {
        self.comments
    }
}
