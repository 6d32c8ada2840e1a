//! Board Module
//!
//! The synchronization engine: one context object holding the index, the
//! ledger handle, and the locks that keep them consistent.
//!
//! ## Responsibilities
//! - Allocate dense topic/post ids and global comment ids
//! - Write each new entity through to the ledger, then index it
//! - Serve reads from the index
//! - Rebuild the index from the ledger on demand

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::error::{BoardError, Result, StoreResult};
use crate::ids::{post_key, CommentId, EntityKind, KeyFamily, PostId, TopicId};
use crate::index::HierarchicalIndex;
use crate::model::{Comment, CommentRecord, Post, PostRecord, Topic, TopicRecord};
use crate::protocol::Command;
use crate::rebuild::{
    catch_up_comments, catch_up_posts, catch_up_topics, rebuild_index, RebuildReport,
    INTEGRITY_TARGET,
};
use crate::store::{LogStore, Store};

/// The board engine
///
/// ## Concurrency Model: scope locks under a rebuild gate
///
/// - **Mutations** hold `gate` shared, then one scope lock:
///   - `topic_scope` for topics
///   - the topic's entry in `post_scopes` for its posts
///   - `comment_scope` for comments
///
///   Under the scope lock the whole allocate → persist → index sequence runs,
///   so allocation order equals ledger order equals index order.
///
/// - **Seeding** holds several scopes at once, always in the order topic,
///   post, comment.
///
/// - **Rebuild** holds `gate` exclusively, so no write is in flight while
///   counters are read and the ledger is walked.
///
/// - **Reads** take only the index read lock.
pub struct Board<S: Store> {
    store: S,

    /// Materialized view of the ledger
    index: RwLock<HierarchicalIndex>,

    /// Shared by mutations, exclusive for rebuild
    gate: RwLock<()>,

    topic_scope: Mutex<()>,
    post_scopes: Mutex<HashMap<TopicId, Arc<Mutex<()>>>>,
    comment_scope: Mutex<()>,
}

// Demo board contents
const DEMO_TOPIC: &str = "Anime";
const DEMO_POST: &str = "New Macross project started";
const DEMO_COMMENTS: [(&str, &str); 2] = [("尼古拉斯赵四", "rt"), ("LRSzwei", "cy")];

impl Board<LogStore> {
    /// Open the on-disk ledger named by `config`
    ///
    /// Rebuilds the index when `config.rebuild_on_open` is set.
    pub fn open_config(config: &Config) -> Result<Self> {
        let store = LogStore::open(config)?;
        if config.rebuild_on_open {
            Self::open(store)
        } else {
            Ok(Self::new(store))
        }
    }
}

impl<S: Store> Board<S> {
    /// Wrap a store with an empty index
    pub fn new(store: S) -> Self {
        Self {
            store,
            index: RwLock::new(HierarchicalIndex::new()),
            gate: RwLock::new(()),
            topic_scope: Mutex::new(()),
            post_scopes: Mutex::new(HashMap::new()),
            comment_scope: Mutex::new(()),
        }
    }

    /// Wrap a store and rebuild the index from it
    pub fn open(store: S) -> Result<Self> {
        let board = Self::new(store);
        board.rebuild()?;
        Ok(board)
    }

    // =========================================================================
    // Mutation API
    // =========================================================================

    /// Create a topic; its id is the next dense topic number
    pub fn create_topic(&self, name: &str) -> Result<TopicId> {
        let _gate = self.gate.read();
        let _scope = self.topic_scope.lock();
        self.add_topic(name)
    }

    /// Create a post under `topic`; its id is the topic's next dense post number
    pub fn create_post(&self, topic: TopicId, caption: &str) -> Result<PostId> {
        let _gate = self.gate.read();
        let scope = self.post_scope(topic)?;
        let _scope = scope.lock();
        self.add_post(topic, caption)
    }

    /// Create a comment on `(topic, post)`; its id is the next global comment number
    pub fn create_comment(
        &self,
        topic: TopicId,
        post: PostId,
        author: &str,
        body: &str,
    ) -> Result<CommentId> {
        let _gate = self.gate.read();
        let _scope = self.comment_scope.lock();
        self.add_comment(topic, post, author, body)
    }

    // =========================================================================
    // Read Accessors (index views)
    // =========================================================================

    pub fn get_topic(&self, id: TopicId) -> Result<Topic> {
        self.index
            .read()
            .topic(id)
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    pub fn get_post(&self, topic: TopicId, id: PostId) -> Result<Post> {
        self.index
            .read()
            .post(topic, id)
            .ok_or_else(|| BoardError::NotFound(format!("{}{}", topic, id)))
    }

    pub fn get_comment(&self, id: CommentId) -> Result<Comment> {
        self.index
            .read()
            .comment(id)
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    pub fn list_topics(&self) -> Vec<Topic> {
        self.index.read().topics()
    }

    pub fn list_posts(&self, topic: TopicId) -> Result<Vec<Post>> {
        self.index
            .read()
            .posts(topic)
            .ok_or_else(|| BoardError::NotFound(topic.to_string()))
    }

    pub fn list_comments(&self, topic: TopicId, post: PostId) -> Result<Vec<Comment>> {
        self.index
            .read()
            .comments(topic, post)
            .ok_or_else(|| BoardError::NotFound(format!("{}{}", topic, post)))
    }

    /// Copy of the whole index
    pub fn snapshot(&self) -> HierarchicalIndex {
        self.index.read().clone()
    }

    // =========================================================================
    // Rebuild
    // =========================================================================

    /// Replace the index with one rebuilt from the ledger
    ///
    /// Blocks mutations for its duration. On error the current index is kept.
    pub fn rebuild(&self) -> Result<RebuildReport> {
        let _gate = self.gate.write();

        let (index, report) = rebuild_index(&self.store)?;
        *self.index.write() = index;
        Ok(report)
    }

    // =========================================================================
    // Ledger Queries (fresh store reads)
    // =========================================================================

    /// Every comment in the ledger, ascending by id
    ///
    /// Undecodable entries are logged and left out.
    pub fn ledger_comments(&self) -> Result<Vec<Comment>> {
        let mut comments = Vec::new();
        for (key, bytes) in self.store.scan_prefix(EntityKind::Comment.prefix())? {
            let Some(KeyFamily::Comment(id)) = KeyFamily::classify(&key) else {
                continue;
            };
            match CommentRecord::from_bytes(&bytes) {
                Ok(record) => comments.push(Comment::from_record(id, record)),
                Err(e) => tracing::warn!(
                    target: INTEGRITY_TARGET,
                    "Ignoring undecodable {}: {}",
                    key,
                    e
                ),
            }
        }
        // Keys sort lexically (COMMENT10 < COMMENT2)
        comments.sort_by_key(|c| c.id);
        Ok(comments)
    }

    /// One comment read straight from the ledger
    pub fn ledger_comment(&self, id: CommentId) -> Result<Comment> {
        let bytes = self
            .store
            .get(&id.key())?
            .ok_or_else(|| BoardError::NotFound(id.to_string()))?;
        Ok(Comment::from_record(id, CommentRecord::from_bytes(&bytes)?))
    }

    /// Seed the demo board on an empty ledger; returns whether it seeded
    ///
    /// Holds the topic scope from the emptiness check through the last
    /// write, so concurrent callers seed at most once.
    pub fn seed_demo(&self) -> Result<bool> {
        let _gate = self.gate.read();
        let _topics = self.topic_scope.lock();
        if !self.index.read().is_empty() || self.store.topic_count()? > 0 {
            return Ok(false);
        }

        let topic = self.add_topic(DEMO_TOPIC)?;
        let post = {
            let scope = self.post_scope(topic)?;
            let _posts = scope.lock();
            self.add_post(topic, DEMO_POST)?
        };
        let _comments = self.comment_scope.lock();
        for (author, body) in DEMO_COMMENTS {
            self.add_comment(topic, post, author, body)?;
        }

        tracing::info!("Seeded demo board under {}", topic);
        Ok(true)
    }

    // =========================================================================
    // Gateway Dispatch
    // =========================================================================

    /// Execute a gateway command, returning the JSON response body
    pub fn execute(&self, command: Command) -> Result<Vec<u8>> {
        let body = match command {
            Command::CreateTopic { name } => serde_json::to_vec(&self.create_topic(&name)?)?,
            Command::CreatePost { topic, caption } => {
                serde_json::to_vec(&self.create_post(topic, &caption)?)?
            }
            Command::CreateComment {
                topic,
                post,
                author,
                body,
            } => serde_json::to_vec(&self.create_comment(topic, post, &author, &body)?)?,
            Command::GetTopic { topic } => serde_json::to_vec(&self.get_topic(topic)?)?,
            Command::GetPost { topic, post } => serde_json::to_vec(&self.get_post(topic, post)?)?,
            Command::GetComment { comment } => serde_json::to_vec(&self.get_comment(comment)?)?,
            Command::ListTopics => serde_json::to_vec(&self.list_topics())?,
            Command::ListPosts { topic } => serde_json::to_vec(&self.list_posts(topic)?)?,
            Command::ListComments { topic, post } => {
                serde_json::to_vec(&self.list_comments(topic, post)?)?
            }
            Command::Rebuild => serde_json::to_vec(&self.rebuild()?)?,
            Command::Ping => b"PONG".to_vec(),
        };
        Ok(body)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The underlying ledger
    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    // The add_* bodies run allocate → persist → index. Callers hold the gate
    // and the matching scope lock.

    fn add_topic(&self, name: &str) -> Result<TopicId> {
        let value = TopicRecord {
            name: name.to_string(),
        }
        .to_bytes()?;
        let first = self.index.read().next_topic_seq();
        let catch_up =
            |from: u64| self.with_index(|store, index| catch_up_topics(store, index, from));

        let seq = self.persist_new(first, |seq| TopicId(seq).key(), &catch_up, &value)?;
        let id = TopicId(seq);
        self.index.write().insert_topic(id, name)?;
        self.index_past(seq, || self.store.topic_count(), &catch_up);

        tracing::debug!("Created {} ({:?})", id, name);
        Ok(id)
    }

    fn add_post(&self, topic: TopicId, caption: &str) -> Result<PostId> {
        let first = self
            .index
            .read()
            .next_post_seq(topic)
            .ok_or_else(|| BoardError::NotFound(topic.to_string()))?;
        let value = PostRecord {
            caption: caption.to_string(),
            topic: Some(topic),
        }
        .to_bytes()?;
        let catch_up =
            |from: u64| self.with_index(|store, index| catch_up_posts(store, index, topic, from));

        let seq = self.persist_new(first, |seq| post_key(topic, PostId(seq)), &catch_up, &value)?;
        let id = PostId(seq);
        self.index.write().insert_post(topic, id, caption)?;
        self.index_past(seq, || self.store.post_count(topic), &catch_up);

        tracing::debug!("Created {}{} ({:?})", topic, id, caption);
        Ok(id)
    }

    fn add_comment(
        &self,
        topic: TopicId,
        post: PostId,
        author: &str,
        body: &str,
    ) -> Result<CommentId> {
        let first = {
            let index = self.index.read();
            if !index.contains_post(topic, post) {
                return Err(BoardError::NotFound(format!("{}{}", topic, post)));
            }
            index.next_comment_seq()
        };
        let record = CommentRecord {
            author: author.to_string(),
            body: body.to_string(),
            parent_topic: topic,
            parent_post: post,
        };
        let value = record.to_bytes()?;
        let catch_up =
            |from: u64| self.with_index(|store, index| catch_up_comments(store, index, from));

        let seq = self.persist_new(first, |seq| CommentId(seq).key(), &catch_up, &value)?;
        let id = CommentId(seq);
        self.index
            .write()
            .insert_comment(Comment::from_record(id, record))?;
        self.index_past(seq, || self.store.comment_count(), &catch_up);

        tracing::debug!("Created {} on {}{}", id, topic, post);
        Ok(id)
    }

    /// Lock handle for a topic's post allocation
    fn post_scope(&self, topic: TopicId) -> Result<Arc<Mutex<()>>> {
        if !self.index.read().contains_topic(topic) {
            return Err(BoardError::NotFound(topic.to_string()));
        }
        Ok(Arc::clone(
            self.post_scopes
                .lock()
                .entry(topic)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        ))
    }

    fn with_index<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&S, &mut HierarchicalIndex) -> Result<T>,
    {
        let mut index = self.index.write();
        f(&self.store, &mut index)
    }

    /// Write `value` under the first free key of a scope
    ///
    /// Tries `first`. If that key is already taken in the ledger, the entries
    /// from `first` up to the next absent key are indexed through `catch_up`
    /// and the write is retried once at that key; a second collision is a
    /// `ConcurrentAllocationConflict`.
    fn persist_new<K, U>(&self, first: u64, key_for: K, catch_up: U, value: &[u8]) -> Result<u64>
    where
        K: Fn(u64) -> String,
        U: Fn(u64) -> Result<u64>,
    {
        let key = key_for(first);
        if self.store.put_if_absent(&key, value)? {
            return Ok(first);
        }

        let retry = catch_up(first)?;
        tracing::warn!("{} already taken in ledger, retrying as {}", key, key_for(retry));

        let key = key_for(retry);
        if self.store.put_if_absent(&key, value)? {
            return Ok(retry);
        }
        Err(BoardError::ConcurrentAllocationConflict(key))
    }

    /// Index ledger entries that follow `seq` when `seq` filled a hole
    ///
    /// The new entity is already persisted and indexed, so a failure here is
    /// logged rather than returned; the next rebuild picks the entries up.
    fn index_past<C, U>(&self, seq: u64, counter: C, catch_up: U)
    where
        C: FnOnce() -> StoreResult<u64>,
        U: Fn(u64) -> Result<u64>,
    {
        let next = seq.saturating_add(1);
        let result = counter().map_err(BoardError::from).and_then(|count| {
            if next < count {
                catch_up(next).map(|_| ())
            } else {
                Ok(())
            }
        });

        if let Err(e) = result {
            tracing::warn!(
                target: INTEGRITY_TARGET,
                "Could not index ledger entries after sequence {}: {}",
                seq,
                e
            );
        }
    }
}
