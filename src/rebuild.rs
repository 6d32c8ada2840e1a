//! Rebuild
//!
//! Reconstructs the hierarchical index from the ledger alone.
//!
//! ## Algorithm
//! 1. Read `TOPIC0 .. TOPIC(topicCount-1)`, stopping at the first absent key
//! 2. For each loaded topic, read `TOPIC<n>POST0 .. POST(postCount-1)` the same way
//! 3. Read `COMMENT0 .. COMMENT(commentCount-1)` and attach each comment to
//!    the post named in its value
//!
//! An absent key ends that key sequence quietly: ids are dense, so a hole
//! is read as the end of the range. A store error is not an absent key and
//! aborts the whole rebuild.
//!
//! Values that fail to decode are skipped one at a time and reported. A
//! skipped topic takes its posts with it.
//!
//! The same walks let a live index catch up on ledger entries that sit past
//! its end, without a full rebuild.

use serde::Serialize;

use crate::error::{BoardError, Result};
use crate::ids::{post_key, CommentId, PostId, TopicId};
use crate::index::HierarchicalIndex;
use crate::model::{Comment, CommentRecord, PostRecord, TopicRecord};
use crate::store::Store;

/// Tracing target for data-integrity events
pub const INTEGRITY_TARGET: &str = "ledgerboard::integrity";

/// Result of a rebuild
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildReport {
    /// Topics loaded into the index
    pub topics: usize,

    /// Posts loaded into the index
    pub posts: usize,

    /// Comments loaded into the index
    pub comments: usize,

    /// Entries present in the ledger but left out of the index
    pub skipped: Vec<SkippedEntry>,

    /// Key sequences that hit an absent key before their counter
    pub halted: Vec<SequenceHalt>,
}

impl RebuildReport {
    /// True when every counted entry made it into the index
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.halted.is_empty()
    }
}

/// An entry the rebuild could not use
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub key: String,
    pub reason: String,
}

/// Where a key sequence stopped early
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceHalt {
    /// The sequence that stopped (`topics`, `TOPIC3 posts`, `comments`)
    pub scope: String,

    /// The first absent key
    pub missing_key: String,

    /// What the counter promised
    pub expected: u64,
}

/// Rebuild an index from `store`
pub fn rebuild_index<S: Store + ?Sized>(store: &S) -> Result<(HierarchicalIndex, RebuildReport)> {
    let mut index = HierarchicalIndex::new();
    let mut rebuild = Rebuild::new(store, &mut index);

    rebuild.load_topics()?;
    rebuild.load_comments()?;
    let report = rebuild.report;

    tracing::info!(
        "Rebuilt index: {} topics, {} posts, {} comments, {} skipped, {} halted",
        report.topics,
        report.posts,
        report.comments,
        report.skipped.len(),
        report.halted.len()
    );

    Ok((index, report))
}

// =============================================================================
// Catch-up
// =============================================================================
//
// Index ledger entries from `from` onward that `index` has not seen, up to
// the first absent key, and return that key's sequence number. Used when a
// write runs into entries past the index's end.

pub(crate) fn catch_up_topics<S: Store + ?Sized>(
    store: &S,
    index: &mut HierarchicalIndex,
    from: u64,
) -> Result<u64> {
    Rebuild::new(store, index).walk_topics(from, u64::MAX)
}

pub(crate) fn catch_up_posts<S: Store + ?Sized>(
    store: &S,
    index: &mut HierarchicalIndex,
    topic: TopicId,
    from: u64,
) -> Result<u64> {
    Rebuild::new(store, index).walk_posts(topic, from, u64::MAX)
}

pub(crate) fn catch_up_comments<S: Store + ?Sized>(
    store: &S,
    index: &mut HierarchicalIndex,
    from: u64,
) -> Result<u64> {
    Rebuild::new(store, index).walk_comments(from, u64::MAX)
}

struct Rebuild<'a, S: ?Sized> {
    store: &'a S,
    index: &'a mut HierarchicalIndex,
    report: RebuildReport,
}

impl<'a, S: Store + ?Sized> Rebuild<'a, S> {
    fn new(store: &'a S, index: &'a mut HierarchicalIndex) -> Self {
        Self {
            store,
            index,
            report: RebuildReport::default(),
        }
    }

    fn load_topics(&mut self) -> Result<()> {
        let expected = self.store.topic_count()?;
        let stopped = self.walk_topics(0, expected)?;
        if stopped < expected {
            self.halt("topics".to_string(), TopicId(stopped).key(), expected);
        }
        Ok(())
    }

    fn load_posts(&mut self, topic: TopicId) -> Result<()> {
        let expected = self.store.post_count(topic)?;
        let stopped = self.walk_posts(topic, 0, expected)?;
        if stopped < expected {
            self.halt(
                format!("{} posts", topic),
                post_key(topic, PostId(stopped)),
                expected,
            );
        }
        Ok(())
    }

    fn load_comments(&mut self) -> Result<()> {
        let expected = self.store.comment_count()?;
        let stopped = self.walk_comments(0, expected)?;
        if stopped < expected {
            self.halt("comments".to_string(), CommentId(stopped).key(), expected);
        }
        Ok(())
    }

    /// Load topics `from..end`; returns the first absent sequence number
    fn walk_topics(&mut self, from: u64, end: u64) -> Result<u64> {
        for seq in from..end {
            let id = TopicId(seq);
            let key = id.key();
            let Some(bytes) = self.store.get(&key)? else {
                return Ok(seq);
            };

            match TopicRecord::from_bytes(&bytes) {
                Ok(record) => {
                    self.index.insert_topic(id, record.name)?;
                    self.report.topics += 1;
                    self.load_posts(id)?;
                }
                Err(e) => self.skip(key, e),
            }
        }
        Ok(end)
    }

    /// Load posts `from..end` of `topic`; returns the first absent sequence number
    fn walk_posts(&mut self, topic: TopicId, from: u64, end: u64) -> Result<u64> {
        for seq in from..end {
            let id = PostId(seq);
            let key = post_key(topic, id);
            let Some(bytes) = self.store.get(&key)? else {
                return Ok(seq);
            };

            match PostRecord::from_bytes(&bytes) {
                Ok(record) => {
                    if let Some(stored) = record.topic.filter(|t| *t != topic) {
                        tracing::warn!(
                            target: INTEGRITY_TARGET,
                            "{} names {} as its topic; keeping key-scoped {}",
                            key,
                            stored,
                            topic
                        );
                    }
                    self.index.insert_post(topic, id, record.caption)?;
                    self.report.posts += 1;
                }
                Err(e) => self.skip(key, e),
            }
        }
        Ok(end)
    }

    /// Load comments `from..end`; returns the first absent sequence number
    fn walk_comments(&mut self, from: u64, end: u64) -> Result<u64> {
        for seq in from..end {
            let id = CommentId(seq);
            let key = id.key();
            let Some(bytes) = self.store.get(&key)? else {
                return Ok(seq);
            };

            let record = match CommentRecord::from_bytes(&bytes) {
                Ok(record) => record,
                Err(e) => {
                    self.skip(key, e);
                    continue;
                }
            };

            match self.index.insert_comment(Comment::from_record(id, record)) {
                Ok(()) => self.report.comments += 1,
                Err(BoardError::NotFound(parent)) => {
                    self.skip(key, format!("orphaned: parent {} is not indexed", parent))
                }
                Err(e) => return Err(e),
            }
        }
        Ok(end)
    }

    fn skip(&mut self, key: String, reason: impl ToString) {
        let reason = reason.to_string();
        tracing::warn!(target: INTEGRITY_TARGET, "Skipping {}: {}", key, reason);
        self.report.skipped.push(SkippedEntry { key, reason });
    }

    fn halt(&mut self, scope: String, missing_key: String, expected: u64) {
        tracing::warn!(
            target: INTEGRITY_TARGET,
            "{} absent before counter {}; treating it as the end of {}",
            missing_key,
            expected,
            scope
        );
        self.report.halted.push(SequenceHalt {
            scope,
            missing_key,
            expected,
        });
    }
}
