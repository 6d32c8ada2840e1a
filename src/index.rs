//! Hierarchical Index
//!
//! In-memory tree of topics → posts → comment references, plus the comment
//! bodies themselves. It is a cache of the ledger: everything in it can be
//! rebuilt by [`crate::rebuild`].
//!
//! ## Ordering
//! Topics, the posts of a topic, and the comments of a post are kept in
//! ascending id order. Inserts must arrive in that order; an insert that
//! does not extend its sequence is rejected.

use std::collections::BTreeMap;

use crate::error::{BoardError, Result};
use crate::ids::{CommentId, PostId, TopicId};
use crate::model::{Comment, Post, Topic};

#[derive(Debug, Clone, PartialEq, Eq)]
struct TopicNode {
    id: TopicId,
    name: String,
    posts: Vec<PostNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PostNode {
    id: PostId,
    caption: String,
    comments: Vec<CommentId>,
}

impl PostNode {
    fn view(&self, topic: TopicId) -> Post {
        Post {
            id: self.id,
            caption: self.caption.clone(),
            parent_topic: topic,
            comments: self.comments.clone(),
        }
    }
}

impl TopicNode {
    fn view(&self) -> Topic {
        Topic {
            id: self.id,
            name: self.name.clone(),
            posts: self.posts.iter().map(|p| p.view(self.id)).collect(),
        }
    }

    fn post(&self, id: PostId) -> Option<&PostNode> {
        self.posts
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &self.posts[i])
    }

    fn post_mut(&mut self, id: PostId) -> Option<&mut PostNode> {
        match self.posts.binary_search_by_key(&id, |p| p.id) {
            Ok(i) => Some(&mut self.posts[i]),
            Err(_) => None,
        }
    }
}

/// The materialized board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchicalIndex {
    topics: Vec<TopicNode>,
    comments: BTreeMap<CommentId, Comment>,
}

impl HierarchicalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Inserts
    // =========================================================================

    /// Append a topic with no posts
    pub fn insert_topic(&mut self, id: TopicId, name: impl Into<String>) -> Result<()> {
        if let Some(last) = self.topics.last() {
            if id <= last.id {
                return Err(BoardError::ConcurrentAllocationConflict(format!(
                    "{} does not follow {}",
                    id, last.id
                )));
            }
        }
        self.topics.push(TopicNode {
            id,
            name: name.into(),
            posts: Vec::new(),
        });
        Ok(())
    }

    /// Append a post to an existing topic
    pub fn insert_post(&mut self, topic: TopicId, id: PostId, caption: impl Into<String>) -> Result<()> {
        let node = self
            .topic_mut(topic)
            .ok_or_else(|| BoardError::NotFound(topic.to_string()))?;
        if let Some(last) = node.posts.last() {
            if id <= last.id {
                return Err(BoardError::ConcurrentAllocationConflict(format!(
                    "{}{} does not follow {}",
                    topic, id, last.id
                )));
            }
        }
        node.posts.push(PostNode {
            id,
            caption: caption.into(),
            comments: Vec::new(),
        });
        Ok(())
    }

    /// Record a comment and append its id to its parent post
    pub fn insert_comment(&mut self, comment: Comment) -> Result<()> {
        if let Some((&last, _)) = self.comments.iter().next_back() {
            if comment.id <= last {
                return Err(BoardError::ConcurrentAllocationConflict(format!(
                    "{} does not follow {}",
                    comment.id, last
                )));
            }
        }
        let post = self
            .topic_mut(comment.parent_topic)
            .and_then(|t| t.post_mut(comment.parent_post))
            .ok_or_else(|| {
                BoardError::NotFound(format!("{}{}", comment.parent_topic, comment.parent_post))
            })?;
        post.comments.push(comment.id);
        self.comments.insert(comment.id, comment);
        Ok(())
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn topic(&self, id: TopicId) -> Option<Topic> {
        self.topic_node(id).map(TopicNode::view)
    }

    pub fn post(&self, topic: TopicId, id: PostId) -> Option<Post> {
        self.topic_node(topic)?.post(id).map(|p| p.view(topic))
    }

    pub fn comment(&self, id: CommentId) -> Option<Comment> {
        self.comments.get(&id).cloned()
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.topics.iter().map(TopicNode::view).collect()
    }

    /// Posts of a topic, `None` if the topic is unknown
    pub fn posts(&self, topic: TopicId) -> Option<Vec<Post>> {
        self.topic_node(topic)
            .map(|t| t.posts.iter().map(|p| p.view(topic)).collect())
    }

    /// Comments of a post, `None` if the post is unknown
    pub fn comments(&self, topic: TopicId, post: PostId) -> Option<Vec<Comment>> {
        let node = self.topic_node(topic)?.post(post)?;
        Some(
            node.comments
                .iter()
                .filter_map(|id| self.comments.get(id).cloned())
                .collect(),
        )
    }

    pub fn contains_topic(&self, topic: TopicId) -> bool {
        self.topic_node(topic).is_some()
    }

    pub fn contains_post(&self, topic: TopicId, post: PostId) -> bool {
        self.topic_node(topic).and_then(|t| t.post(post)).is_some()
    }

    // =========================================================================
    // Allocation Cursors
    // =========================================================================

    /// Next topic sequence number: one past the highest indexed topic
    pub fn next_topic_seq(&self) -> u64 {
        self.topics.last().map(|t| t.id.seq() + 1).unwrap_or(0)
    }

    /// Next post sequence number within a topic, `None` if the topic is unknown
    pub fn next_post_seq(&self, topic: TopicId) -> Option<u64> {
        self.topic_node(topic)
            .map(|t| t.posts.last().map(|p| p.id.seq() + 1).unwrap_or(0))
    }

    /// Next global comment sequence number
    pub fn next_comment_seq(&self) -> u64 {
        self.comments
            .keys()
            .next_back()
            .map(|id| id.seq() + 1)
            .unwrap_or(0)
    }

    // =========================================================================
    // Stats
    // =========================================================================

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn post_count(&self) -> usize {
        self.topics.iter().map(|t| t.posts.len()).sum()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn topic_node(&self, id: TopicId) -> Option<&TopicNode> {
        self.topics
            .binary_search_by_key(&id, |t| t.id)
            .ok()
            .map(|i| &self.topics[i])
    }

    fn topic_mut(&mut self, id: TopicId) -> Option<&mut TopicNode> {
        match self.topics.binary_search_by_key(&id, |t| t.id) {
            Ok(i) => Some(&mut self.topics[i]),
            Err(_) => None,
        }
    }
}
